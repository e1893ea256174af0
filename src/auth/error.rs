// Authentication and authorization error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::models::Role;
use crate::error::ErrorResponse;

/// Authentication and authorization error types
#[derive(Debug, Error)]
pub enum AuthError {
    // Authentication errors
    #[error("Missing authentication token")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token has expired")]
    ExpiredToken,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Username already exists")]
    UsernameTaken,

    // Authorization errors
    /// Identity's role is not in the route's allowed set
    #[error("Insufficient permissions: requires role {}, but user has role '{actual}'", join_roles(.allowed))]
    InsufficientPermissions { allowed: Vec<Role>, actual: Role },

    // Internal failures
    #[error("Password hashing error: {0}")]
    PasswordHashError(String),
    #[error("Token generation error: {0}")]
    TokenGenerationError(String),
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(|r| format!("'{}'", r))
        .collect::<Vec<_>>()
        .join(" or ")
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::UsernameTaken => StatusCode::CONFLICT,
            AuthError::InsufficientPermissions { .. } => StatusCode::FORBIDDEN,
            AuthError::PasswordHashError(_)
            | AuthError::TokenGenerationError(_)
            | AuthError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable sub-kind for 401 responses
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            AuthError::MissingToken => Some("missing_token"),
            AuthError::InvalidToken => Some("invalid_token"),
            AuthError::ExpiredToken => Some("expired_token"),
            AuthError::InvalidCredentials => Some("invalid_credentials"),
            _ => None,
        }
    }

    /// Build the client-facing body; internal details are logged, never returned
    pub fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        let status = self.status_code();
        let body = match self {
            AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::InvalidCredentials => {
                warn!("Authentication failed: {}", self);
                let mut body = ErrorResponse::new("unauthorized", self.to_string());
                body.reason = self.reason().map(str::to_string);
                body
            }
            AuthError::UsernameTaken => {
                warn!("Signup conflict: {}", self);
                ErrorResponse::new("conflict", self.to_string())
            }
            AuthError::InsufficientPermissions { allowed, .. } => {
                warn!("Authorization failed: {}", self);
                ErrorResponse::new(
                    "forbidden",
                    format!("Insufficient permissions: requires role {}", join_roles(allowed)),
                )
            }
            AuthError::PasswordHashError(_)
            | AuthError::TokenGenerationError(_)
            | AuthError::DatabaseError(_) => {
                error!("Internal auth error: {}", self);
                ErrorResponse::new("internal_error", "Internal server error")
            }
        };
        (status, body)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, body) = self.to_error_response();
        (status, Json(body)).into_response()
    }
}
