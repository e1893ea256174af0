// HTTP handlers for submission endpoints

use axum::{
    extract::multipart::MultipartRejection,
    extract::rejection::PathRejection,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::auth::Identity;
use crate::error::ApiError;
use crate::submissions::models::{Submission, UploadedFile};
use crate::AppState;

/// Upload a file for an assignment (students only)
#[utoipa::path(
    post,
    path = "/assignments/{id}/submit",
    params(
        ("id" = i64, Path, description = "Assignment ID")
    ),
    request_body(content = crate::submissions::models::SubmitForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Submission stored", body = Submission),
        (status = 400, description = "Missing or empty file", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing, invalid or expired token", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller is not a student", body = crate::error::ErrorResponse),
        (status = 404, description = "Assignment not found", body = crate::error::ErrorResponse),
        (status = 413, description = "Upload exceeds the size limit", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "submissions"
)]
pub async fn submit_handler(
    State(state): State<AppState>,
    identity: Identity,
    path: Result<Path<i64>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Submission>), ApiError> {
    let Path(assignment_id) = path?;
    let mut multipart = multipart?;

    let mut file: Option<(String, Vec<u8>)> = None;
    let mut comment = None;
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                file = Some((filename, bytes.to_vec()));
            }
            "comment" => comment = Some(field.text().await?),
            other => debug!("Ignoring unexpected multipart field '{}'", other),
        }
    }

    let (filename, bytes) =
        file.ok_or_else(|| ApiError::BadRequest("Multipart field 'file' is required".to_string()))?;

    let submission = state
        .submission_service
        .submit(&identity, assignment_id, UploadedFile { filename, bytes, comment })
        .await?;

    Ok((StatusCode::CREATED, Json(submission)))
}

/// Download the file behind a submission
#[utoipa::path(
    get,
    path = "/submissions/{id}/file",
    params(
        ("id" = i64, Path, description = "Submission ID")
    ),
    responses(
        (status = 200, description = "Raw file contents as application/octet-stream"),
        (status = 401, description = "Missing, invalid or expired token", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller may not read this submission", body = crate::error::ErrorResponse),
        (status = 404, description = "Submission not found", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "submissions"
)]
pub async fn download_handler(
    State(state): State<AppState>,
    identity: Identity,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(submission_id) = path?;
    let (submission, bytes) = state
        .submission_service
        .download(&identity, submission_id)
        .await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        crate::submissions::service::sanitize_filename(&submission.original_filename)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
