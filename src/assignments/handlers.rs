// HTTP handlers for assignment endpoints

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::assignments::models::{Assignment, CreateAssignmentRequest};
use crate::auth::Identity;
use crate::error::ApiError;
use crate::submissions::models::Submission;
use crate::AppState;

/// Create an assignment (teachers only)
#[utoipa::path(
    post,
    path = "/assignments/create",
    request_body = CreateAssignmentRequest,
    responses(
        (status = 201, description = "Assignment created", body = Assignment),
        (status = 400, description = "Invalid input data", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing, invalid or expired token", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller is not a teacher", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "assignments"
)]
pub async fn create_assignment_handler(
    State(state): State<AppState>,
    identity: Identity,
    payload: Result<Json<CreateAssignmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Assignment>), ApiError> {
    let Json(request) = payload?;
    let assignment = state.assignment_service.create(&identity, request).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// List all assignments
#[utoipa::path(
    get,
    path = "/assignments",
    responses(
        (status = 200, description = "All assignments, newest first", body = Vec<Assignment>),
        (status = 401, description = "Missing, invalid or expired token", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "assignments"
)]
pub async fn list_assignments_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Assignment>>, ApiError> {
    let assignments = state.assignment_service.list().await?;
    Ok(Json(assignments))
}

/// List submissions for an assignment (creating teacher only)
#[utoipa::path(
    get,
    path = "/assignments/{id}/submissions",
    params(
        ("id" = i64, Path, description = "Assignment ID")
    ),
    responses(
        (status = 200, description = "Submissions, oldest first", body = Vec<Submission>),
        (status = 401, description = "Missing, invalid or expired token", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller is not the assignment's creator", body = crate::error::ErrorResponse),
        (status = 404, description = "Assignment not found", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "assignments"
)]
pub async fn list_submissions_handler(
    State(state): State<AppState>,
    identity: Identity,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<Submission>>, ApiError> {
    let Path(assignment_id) = path?;
    let submissions = state
        .assignment_service
        .get_submissions(&identity, assignment_id)
        .await?;
    Ok(Json(submissions))
}
