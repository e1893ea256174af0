// Authentication middleware for protected routes

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::auth::{error::AuthError, models::Identity, token::TokenService};

/// Pull the bearer token out of the Authorization header.
///
/// The scheme is matched case-insensitively. A missing header is
/// `MissingToken`; anything present but unusable is `InvalidToken`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    let (scheme, token) = value.split_once(' ').ok_or(AuthError::InvalidToken)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidToken);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::InvalidToken);
    }
    Ok(token)
}

/// Verify the bearer token and attach the caller's [`Identity`].
///
/// Mounted with `from_fn_with_state` on every route except signup, login,
/// health and docs. On failure nothing downstream runs.
pub async fn authenticate(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let endpoint = request.uri().path().to_string();

    let identity = bearer_token(request.headers())
        .and_then(|token| tokens.verify(token))
        .map_err(|e| {
            warn!("Rejected request to {}: {}", endpoint, e);
            e
        })?;

    debug!(
        "Authenticated user_id={}, role={}, endpoint={}",
        identity.user_id, identity.role, endpoint
    );
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Handlers take `Identity` as an argument to receive the verified caller
#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .copied()
            .ok_or(AuthError::MissingToken)
    }
}
