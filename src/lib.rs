pub mod assignments;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod storage;
pub mod submissions;
pub mod validation;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi, ToSchema,
};
use utoipa_swagger_ui::SwaggerUi;

use assignments::{AssignmentRepository, AssignmentService};
use auth::{rbac, AuthService, RoleGuard, TokenService, UserRepository};
use config::Config;
use storage::BlobStore;
use submissions::{SubmissionRepository, SubmissionService};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        auth::handlers::signup_handler,
        auth::handlers::login_handler,
        auth::handlers::me_handler,
        assignments::handlers::create_assignment_handler,
        assignments::handlers::list_assignments_handler,
        assignments::handlers::list_submissions_handler,
        submissions::handlers::submit_handler,
        submissions::handlers::download_handler,
    ),
    components(schemas(
        HealthResponse,
        error::ErrorResponse,
        auth::Role,
        auth::SignupRequest,
        auth::LoginRequest,
        auth::LoginResponse,
        auth::UserResponse,
        assignments::Assignment,
        assignments::CreateAssignmentRequest,
        submissions::Submission,
        submissions::SubmitForm,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Signup, login and the current account"),
        (name = "assignments", description = "Assignments and their submissions"),
        (name = "submissions", description = "File uploads and downloads")
    ),
    info(
        title = "Assignment Tracker API",
        version = "1.0.0",
        description = "Teachers post assignments, students upload submissions"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub token_service: Arc<TokenService>,
    pub auth_service: Arc<AuthService>,
    pub assignment_service: Arc<AssignmentService>,
    pub submission_service: Arc<SubmissionService>,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Wire services over one pool and one blob store
    pub fn new(db: SqlitePool, config: &Config, blobs: Arc<dyn BlobStore>) -> Self {
        let token_service = Arc::new(TokenService::new(&config.jwt_secret, config.token_ttl_seconds));

        let users = UserRepository::new(db.clone());
        let assignments = AssignmentRepository::new(db.clone());
        let submissions = SubmissionRepository::new(db);

        Self {
            auth_service: Arc::new(AuthService::new(users, token_service.clone())),
            assignment_service: Arc::new(AssignmentService::new(
                assignments.clone(),
                submissions.clone(),
            )),
            submission_service: Arc::new(SubmissionService::new(assignments, submissions, blobs)),
            token_service,
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "Assignment Tracker API is running")]
    pub message: String,
}

/// Health check
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "auth"
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Assignment Tracker API is running".to_string(),
    })
}

/// Creates and configures the application router.
///
/// Every route under `protected` runs `authenticate` first, then the
/// route's own `RoleGuard`.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/me",
            get(auth::me_handler)
                .route_layer(middleware::from_fn_with_state(RoleGuard::ANY, rbac::enforce)),
        )
        .route(
            "/assignments",
            get(assignments::list_assignments_handler)
                .route_layer(middleware::from_fn_with_state(RoleGuard::ANY, rbac::enforce)),
        )
        .route(
            "/assignments/create",
            post(assignments::create_assignment_handler)
                .route_layer(middleware::from_fn_with_state(RoleGuard::TEACHER, rbac::enforce)),
        )
        .route(
            "/assignments/:id/submit",
            post(submissions::submit_handler)
                .route_layer(middleware::from_fn_with_state(RoleGuard::STUDENT, rbac::enforce))
                .layer(DefaultBodyLimit::max(state.max_upload_bytes)),
        )
        .route(
            "/assignments/:id/submissions",
            get(assignments::list_submissions_handler)
                .route_layer(middleware::from_fn_with_state(RoleGuard::TEACHER, rbac::enforce)),
        )
        .route(
            "/submissions/:id/file",
            get(submissions::download_handler)
                .route_layer(middleware::from_fn_with_state(RoleGuard::ANY, rbac::enforce)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.token_service.clone(),
            auth::authenticate,
        ));

    let public = Router::new()
        .route("/", get(health_handler))
        .route("/signup", post(auth::signup_handler))
        .route("/login", post(auth::login_handler));

    // The original frontend is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public)
        .merge(protected)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}

#[cfg(test)]
mod tests;
