use tracing::{debug, info};
use validator::Validate;

use crate::assignments::{
    models::{Assignment, CreateAssignmentRequest},
    repository::AssignmentRepository,
};
use crate::auth::{AuthError, Identity, RoleGuard};
use crate::error::ApiError;
use crate::submissions::{models::Submission, repository::SubmissionRepository};

/// Assignment creation and teacher-side views
pub struct AssignmentService {
    assignments: AssignmentRepository,
    submissions: SubmissionRepository,
}

impl AssignmentService {
    pub fn new(assignments: AssignmentRepository, submissions: SubmissionRepository) -> Self {
        Self {
            assignments,
            submissions,
        }
    }

    /// Create an assignment owned by the calling teacher
    pub async fn create(
        &self,
        identity: &Identity,
        request: CreateAssignmentRequest,
    ) -> Result<Assignment, ApiError> {
        RoleGuard::TEACHER.check(identity)?;
        request.validate()?;

        let assignment = self
            .assignments
            .create(request.title.trim(), request.description.trim(), identity.user_id)
            .await
            .map_err(|e| match &e {
                // Signed token for an account that no longer exists
                sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                    ApiError::Auth(AuthError::InvalidToken)
                }
                _ => ApiError::DatabaseError(e),
            })?;

        info!(
            "Assignment id={} created by user id={}",
            assignment.id, identity.user_id
        );
        Ok(assignment)
    }

    pub async fn get(&self, assignment_id: i64) -> Result<Assignment, ApiError> {
        self.assignments
            .find_by_id(assignment_id)
            .await?
            .ok_or(ApiError::NotFound {
                resource: "Assignment",
                id: assignment_id,
            })
    }

    pub async fn list(&self) -> Result<Vec<Assignment>, ApiError> {
        let assignments = self.assignments.list().await?;
        debug!("Retrieved {} assignments", assignments.len());
        Ok(assignments)
    }

    /// Submissions for an assignment, visible only to the teacher who created it
    pub async fn get_submissions(
        &self,
        identity: &Identity,
        assignment_id: i64,
    ) -> Result<Vec<Submission>, ApiError> {
        RoleGuard::TEACHER.check(identity)?;

        let assignment = self.get(assignment_id).await?;
        if assignment.created_by != identity.user_id {
            return Err(ApiError::Forbidden(format!(
                "Only the creator of assignment {} can view its submissions",
                assignment_id
            )));
        }

        let submissions = self.submissions.list_for_assignment(assignment_id).await?;
        debug!(
            "Retrieved {} submissions for assignment id={}",
            submissions.len(),
            assignment_id
        );
        Ok(submissions)
    }
}
