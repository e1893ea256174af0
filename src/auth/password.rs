// Password hashing and verification service

use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::auth::error::AuthError;

const DUMMY_PASSWORD: &str = "assignment-tracker-unknown-account";

/// Password service for hashing and verification (Argon2id, random salt)
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using Argon2id with a fresh salt
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::PasswordHashError(e.to_string()))
    }

    /// Verify a password against a stored PHC hash string
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|e| AuthError::PasswordHashError(e.to_string()))?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::PasswordHashError(e.to_string())),
        }
    }

    /// Hash with the same parameters as real accounts, computed once.
    /// Logins for unknown usernames verify against it so they cost as much
    /// as a wrong password.
    pub fn dummy_hash() -> Result<&'static str, AuthError> {
        static DUMMY: OnceLock<String> = OnceLock::new();
        if let Some(hash) = DUMMY.get() {
            return Ok(hash);
        }
        let hash = Self::hash_password(DUMMY_PASSWORD)?;
        Ok(DUMMY.get_or_init(|| hash))
    }

    /// Full verify against the dummy hash; the outcome carries no meaning
    pub fn verify_dummy(password: &str) -> Result<(), AuthError> {
        Self::verify_password(password, Self::dummy_hash()?).map(|_| ())
    }

    /// Hash on the blocking pool so the reactor is not stalled
    pub async fn hash_password_blocking(password: String) -> Result<String, AuthError> {
        tokio::task::spawn_blocking(move || Self::hash_password(&password))
            .await
            .map_err(|e| AuthError::PasswordHashError(e.to_string()))?
    }

    /// Verify on the blocking pool so the reactor is not stalled
    pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool, AuthError> {
        tokio::task::spawn_blocking(move || Self::verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::PasswordHashError(e.to_string()))?
    }

    /// `verify_dummy` on the blocking pool
    pub async fn verify_dummy_blocking(password: String) -> Result<(), AuthError> {
        tokio::task::spawn_blocking(move || Self::verify_dummy(&password))
            .await
            .map_err(|e| AuthError::PasswordHashError(e.to_string()))?
    }
}
