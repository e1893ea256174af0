// Authentication module
// JWT-based authentication, role-based authorization and the credential store

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod rbac;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use handlers::{login_handler, me_handler, signup_handler};
pub use middleware::authenticate;
pub use models::{Identity, LoginRequest, LoginResponse, Role, SignupRequest, User, UserResponse};
pub use rbac::{require, RoleGuard};
pub use repository::UserRepository;
pub use service::AuthService;
pub use token::TokenService;
