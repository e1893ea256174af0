use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::assignments::repository::AssignmentRepository;
use crate::auth::{AuthError, Identity, Role, RoleGuard};
use crate::error::ApiError;
use crate::storage::BlobStore;
use crate::submissions::{
    models::{NewSubmission, Submission, UploadedFile},
    repository::SubmissionRepository,
};

const MAX_FILENAME_LEN: usize = 100;
const MAX_COMMENT_LEN: usize = 2000;

/// Final path component of a client-supplied filename, restricted to
/// `[A-Za-z0-9._-]`. Never empty and never `.` or `..`.
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILENAME_LEN)
        .collect();

    if cleaned.chars().all(|c| c == '.') {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Blob key for a new upload; the uuid keeps resubmissions of the same
/// filename from colliding
pub fn blob_key(assignment_id: i64, student_id: i64, filename: &str) -> String {
    format!(
        "assignments/{}/students/{}/{}-{}",
        assignment_id,
        student_id,
        Uuid::new_v4(),
        sanitize_filename(filename)
    )
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Accepts student uploads and serves them back to permitted readers
pub struct SubmissionService {
    assignments: AssignmentRepository,
    submissions: SubmissionRepository,
    blobs: Arc<dyn BlobStore>,
}

impl SubmissionService {
    pub fn new(
        assignments: AssignmentRepository,
        submissions: SubmissionRepository,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            assignments,
            submissions,
            blobs,
        }
    }

    /// Store the upload and record it against (assignment, student)
    pub async fn submit(
        &self,
        identity: &Identity,
        assignment_id: i64,
        upload: UploadedFile,
    ) -> Result<Submission, ApiError> {
        RoleGuard::STUDENT.check(identity)?;

        if upload.bytes.is_empty() {
            return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
        }
        let comment = upload
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if comment.as_ref().is_some_and(|c| c.chars().count() > MAX_COMMENT_LEN) {
            return Err(ApiError::BadRequest(format!(
                "Comment must be at most {} characters",
                MAX_COMMENT_LEN
            )));
        }

        // Check before touching storage so a missing assignment leaves no trace
        if self.assignments.find_by_id(assignment_id).await?.is_none() {
            return Err(ApiError::NotFound {
                resource: "Assignment",
                id: assignment_id,
            });
        }

        let original_filename = if upload.filename.trim().is_empty() {
            "upload".to_string()
        } else {
            upload.filename.trim().to_string()
        };
        let new = NewSubmission {
            assignment_id,
            student_id: identity.user_id,
            file_key: blob_key(assignment_id, identity.user_id, &original_filename),
            original_filename,
            comment,
            size_bytes: upload.bytes.len() as i64,
            sha256: sha256_hex(&upload.bytes),
        };

        self.blobs.put(&new.file_key, &upload.bytes).await?;

        let submission = match self.submissions.create(&new).await {
            Ok(submission) => submission,
            Err(e) => {
                if let Err(cleanup) = self.blobs.delete(&new.file_key).await {
                    error!("Failed to remove orphaned blob {}: {}", new.file_key, cleanup);
                }
                return Err(match &e {
                    sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                        ApiError::Auth(AuthError::InvalidToken)
                    }
                    _ => ApiError::DatabaseError(e),
                });
            }
        };

        info!(
            "Submission id={} stored for assignment id={} by student id={} ({} bytes)",
            submission.id, assignment_id, identity.user_id, submission.size_bytes
        );
        Ok(submission)
    }

    /// Fetch a stored file. Readable by the submitting student and by the
    /// teacher who owns the assignment.
    pub async fn download(
        &self,
        identity: &Identity,
        submission_id: i64,
    ) -> Result<(Submission, Vec<u8>), ApiError> {
        RoleGuard::ANY.check(identity)?;

        let submission = self
            .submissions
            .find_by_id(submission_id)
            .await?
            .ok_or(ApiError::NotFound {
                resource: "Submission",
                id: submission_id,
            })?;

        let permitted = match identity.role {
            Role::Student => submission.student_id == identity.user_id,
            Role::Teacher => self
                .assignments
                .find_by_id(submission.assignment_id)
                .await?
                .is_some_and(|a| a.created_by == identity.user_id),
        };
        if !permitted {
            return Err(ApiError::Forbidden(format!(
                "Not allowed to read submission {}",
                submission_id
            )));
        }

        let bytes = self.blobs.get(&submission.file_key).await?;
        debug!("Serving submission id={} ({} bytes)", submission.id, bytes.len());
        Ok((submission, bytes))
    }
}
