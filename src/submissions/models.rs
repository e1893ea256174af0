use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A student's uploaded file for an assignment.
/// Resubmissions create new records; earlier ones are kept.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Submission {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = 1)]
    pub assignment_id: i64,
    #[schema(example = 2)]
    pub student_id: i64,
    /// Blob store key of the uploaded file
    #[schema(example = "assignments/1/students/2/0b6f5f1e-2f0c-4a4e-9a51-1d4f4c2a0c7e-report.pdf")]
    pub file_key: String,
    #[schema(example = "report.pdf")]
    pub original_filename: String,
    pub comment: Option<String>,
    #[schema(example = 52341)]
    pub size_bytes: i64,
    /// Hex-encoded SHA-256 of the file contents
    pub sha256: String,
    pub submitted_at: DateTime<Utc>,
}

/// Row to insert once the file has been stored
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub assignment_id: i64,
    pub student_id: i64,
    pub file_key: String,
    pub original_filename: String,
    pub comment: Option<String>,
    pub size_bytes: i64,
    pub sha256: String,
}

/// File received from a multipart upload
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub comment: Option<String>,
}

/// Multipart body of POST /assignments/{id}/submit (documentation only)
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct SubmitForm {
    /// The submitted file
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// Optional note for the teacher
    pub comment: Option<String>,
}
