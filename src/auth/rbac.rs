// Role-based authorization for protected routes
//
// Each route declares the roles it admits as a `RoleGuard`; one middleware
// function enforces every declaration.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::auth::{
    error::AuthError,
    models::{Identity, Role},
};

/// Pass if `identity.role` is one of `allowed`
pub fn require(identity: &Identity, allowed: &[Role]) -> Result<(), AuthError> {
    if allowed.contains(&identity.role) {
        Ok(())
    } else {
        Err(AuthError::InsufficientPermissions {
            allowed: allowed.to_vec(),
            actual: identity.role,
        })
    }
}

/// Set of roles admitted by a route
#[derive(Debug, Clone, Copy)]
pub struct RoleGuard {
    allowed: &'static [Role],
}

impl RoleGuard {
    /// Creating assignments and listing their submissions
    pub const TEACHER: Self = Self::new(&[Role::Teacher]);
    /// Submitting work
    pub const STUDENT: Self = Self::new(&[Role::Student]);
    /// Any authenticated account
    pub const ANY: Self = Self::new(&[Role::Teacher, Role::Student]);

    pub const fn new(allowed: &'static [Role]) -> Self {
        Self { allowed }
    }

    pub fn allowed(&self) -> &'static [Role] {
        self.allowed
    }

    pub fn check(&self, identity: &Identity) -> Result<(), AuthError> {
        require(identity, self.allowed)
    }
}

/// Middleware enforcing a route's [`RoleGuard`].
///
/// Must run inside `authenticate`; a request without an identity is treated
/// as unauthenticated.
///
/// ```rust,ignore
/// post(handler).route_layer(middleware::from_fn_with_state(RoleGuard::TEACHER, enforce))
/// ```
pub async fn enforce(
    State(guard): State<RoleGuard>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let identity = request
        .extensions()
        .get::<Identity>()
        .copied()
        .ok_or(AuthError::MissingToken)?;

    guard.check(&identity)?;

    debug!(
        "Authorization successful: user_id={}, role={}, endpoint={}",
        identity.user_id,
        identity.role,
        request.uri().path()
    );
    Ok(next.run(request).await)
}
