// Error handling module for the assignment tracker API
// Provides centralized error types and HTTP response conversion

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};
use utoipa::ToSchema;

use crate::auth::AuthError;
use crate::storage::StorageError;

/// Main error type for the API
/// All handlers return `Result<T, ApiError>`
#[derive(Debug, Error)]
pub enum ApiError {
    /// Field-level validation failures (400)
    #[error("Request validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Malformed request bodies, paths or uploads (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Upload larger than the configured limit (413)
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Referenced entity absent (404)
    #[error("{resource} with id {id} not found")]
    NotFound { resource: &'static str, id: i64 },

    /// Valid identity without access to this particular resource (403)
    #[error("{0}")]
    Forbidden(String),

    /// Authentication, authorization and credential store failures
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Blob store failures (500)
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Database operation errors (500)
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// Anything else that is our fault (500)
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// JSON body of every error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error category: validation_error, unauthorized, forbidden, not_found, conflict, payload_too_large, internal_error
    #[schema(example = "forbidden")]
    pub error_kind: String,

    /// Human-readable error message
    pub message: String,

    /// Sub-kind for authentication failures (missing_token, invalid_token, expired_token, invalid_credentials)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Field-level validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,

    /// RFC 3339 timestamp of when the error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_kind: &str, message: impl Into<String>) -> Self {
        Self {
            error_kind: error_kind.to_string(),
            message: message.into(),
            reason: None,
            details: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = self.to_error_response();
        (status, Json(error_response)).into_response()
    }
}

impl ApiError {
    /// Convert to status and body, logging by severity.
    /// Internal details never reach the client.
    fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);
                let mut body = ErrorResponse::new("validation_error", "Request validation failed");
                body.details = serde_json::to_value(errors).ok();
                (StatusCode::BAD_REQUEST, body)
            }
            ApiError::BadRequest(message) => {
                debug!("Bad request: {}", message);
                (StatusCode::BAD_REQUEST, ErrorResponse::new("validation_error", message.clone()))
            }
            ApiError::PayloadTooLarge(message) => {
                debug!("Payload too large: {}", message);
                (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    ErrorResponse::new("payload_too_large", message.clone()),
                )
            }
            ApiError::NotFound { .. } => {
                debug!("{}", self);
                (StatusCode::NOT_FOUND, ErrorResponse::new("not_found", self.to_string()))
            }
            ApiError::Forbidden(message) => {
                warn!("Forbidden access attempt: {}", message);
                (StatusCode::FORBIDDEN, ErrorResponse::new("forbidden", message.clone()))
            }
            ApiError::Auth(err) => err.to_error_response(),
            ApiError::Storage(err) => {
                error!("Storage error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("internal_error", "A storage error occurred"),
                )
            }
            ApiError::DatabaseError(err) => {
                error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("internal_error", "A database error occurred"),
                )
            }
            ApiError::InternalError(message) => {
                error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("internal_error", "An internal server error occurred"),
                )
            }
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Auth(err) => err.status_code(),
            ApiError::Storage(_) | ApiError::DatabaseError(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge("Upload exceeds the configured size limit".to_string())
        } else {
            ApiError::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
        }
    }
}
