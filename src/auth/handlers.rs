// HTTP handlers for authentication endpoints

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::auth::models::{Identity, LoginRequest, LoginResponse, SignupRequest, UserResponse};
use crate::error::ApiError;
use crate::AppState;

/// Register a new user
#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid input data", body = crate::error::ErrorResponse),
        (status = 409, description = "Username already taken", body = crate::error::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn signup_handler(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let user = state
        .auth_service
        .signup(&request.username, &request.password, request.role)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Exchange credentials for an access token
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Invalid input data", body = crate::error::ErrorResponse),
        (status = 401, description = "Bad credentials", body = crate::error::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let response = state.auth_service.login(&request.username, &request.password).await?;
    Ok(Json(response))
}

/// Current user information
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Authenticated user", body = UserResponse),
        (status = 401, description = "Missing, invalid or expired token", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn me_handler(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.auth_service.current_user(identity.user_id).await?;
    Ok(Json(user))
}
