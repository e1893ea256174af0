// JWT token issuing and verification service

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::auth::{
    error::AuthError,
    models::{Identity, Role},
};

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,  // user_id
    pub role: Role,
    pub iat: i64,  // issued at timestamp
    pub exp: i64,  // expiration timestamp
}

/// Token service for JWT operations.
///
/// Keys are derived once from the configured secret. Tokens are HS256,
/// stateless, and valid until `exp`; there is no revocation.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: i64,
}

impl TokenService {
    /// Create a new TokenService with a secret key and token lifetime
    pub fn new(secret: &str, ttl_seconds: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_seconds,
        }
    }

    /// Lifetime of issued tokens, in seconds
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Issue a signed token for `user_id` with `role`
    pub fn issue(&self, user_id: i64, role: Role) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let exp = now.checked_add(self.ttl_seconds).ok_or_else(|| {
            AuthError::TokenGenerationError(format!("ttl of {}s overflows expiry", self.ttl_seconds))
        })?;
        let claims = Claims {
            sub: user_id,
            role,
            iat: now,
            exp,
        };
        self.sign(&claims)
    }

    /// Verify a token and recover the identity it carries
    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            })?;

        Ok(Identity {
            user_id: claims.sub,
            role: claims.role,
        })
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGenerationError(e.to_string()))
    }
}
