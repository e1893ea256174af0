// Authentication service - business logic layer

use std::sync::Arc;

use tracing::{debug, info};

use crate::auth::{
    error::AuthError,
    models::{LoginResponse, Role, UserResponse},
    password::PasswordService,
    repository::UserRepository,
    token::TokenService,
};

/// Authentication service coordinating signup, login and account lookup
pub struct AuthService {
    user_repo: UserRepository,
    token_service: Arc<TokenService>,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(user_repo: UserRepository, token_service: Arc<TokenService>) -> Self {
        Self {
            user_repo,
            token_service,
        }
    }

    /// Register a new user. Input is expected to be validated already.
    pub async fn signup(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<UserResponse, AuthError> {
        let password_hash = PasswordService::hash_password_blocking(password.to_string()).await?;
        let user = self.user_repo.create_user(username, &password_hash, role).await?;

        info!("Created user id={} username={} role={}", user.id, user.username, user.role);
        Ok(user.into())
    }

    /// Check credentials and issue an access token
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AuthError> {
        // Both branches pay for one Argon2 verify
        let user = match self.user_repo.find_by_username(username).await? {
            Some(user) => {
                let valid = PasswordService::verify_password_blocking(
                    password.to_string(),
                    user.password_hash.clone(),
                )
                .await?;
                if !valid {
                    debug!("Wrong password for user id={}", user.id);
                    return Err(AuthError::InvalidCredentials);
                }
                user
            }
            None => {
                PasswordService::verify_dummy_blocking(password.to_string()).await?;
                debug!("Login attempt for unknown username {}", username);
                return Err(AuthError::InvalidCredentials);
            }
        };

        let token = self.token_service.issue(user.id, user.role)?;
        info!("User id={} logged in", user.id);

        Ok(LoginResponse {
            token,
            token_type: "bearer".to_string(),
            expires_in: self.token_service.ttl_seconds(),
        })
    }

    /// Account behind a verified token. A token whose account no longer
    /// exists is treated as invalid.
    pub async fn current_user(&self, user_id: i64) -> Result<UserResponse, AuthError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .map(UserResponse::from)
            .ok_or(AuthError::InvalidToken)
    }
}
