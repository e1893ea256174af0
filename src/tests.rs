// End-to-end tests against the full router
// In-memory SQLite and an in-memory blob store; no external services

use super::*;
use axum::http::{header, HeaderValue, StatusCode};
use axum_test::{TestResponse, TestServer};
use serde_json::{json, Value};
use storage::MemoryBlobStore;

// ============================================================================
// Test Helpers
// ============================================================================

const SECRET: &str = "test_secret_key_for_testing_purposes";
const PASSWORD: &str = "password123";
const BOUNDARY: &str = "----assignment-tracker-boundary";
const MAX_UPLOAD_BYTES: usize = 4096;

struct TestApp {
    server: TestServer,
    pool: SqlitePool,
    blobs: Arc<MemoryBlobStore>,
    tokens: Arc<TokenService>,
}

/// Fresh database, fresh blob store, real router
async fn create_test_app() -> TestApp {
    let pool = db::create_memory_pool()
        .await
        .expect("Failed to open in-memory database");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let config = Config::from_lookup(|key| match key {
        "JWT_SECRET" => Some(SECRET.to_string()),
        "MAX_UPLOAD_BYTES" => Some(MAX_UPLOAD_BYTES.to_string()),
        _ => None,
    })
    .expect("Test config is valid");

    let blobs = Arc::new(MemoryBlobStore::new());
    let state = AppState::new(pool.clone(), &config, blobs.clone());
    let tokens = state.token_service.clone();

    TestApp {
        server: TestServer::new(create_router(state)).unwrap(),
        pool,
        blobs,
        tokens,
    }
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

async fn signup(app: &TestApp, username: &str, role: &str) -> TestResponse {
    app.server
        .post("/signup")
        .json(&json!({ "username": username, "password": PASSWORD, "role": role }))
        .await
}

async fn login(app: &TestApp, username: &str, password: &str) -> TestResponse {
    app.server
        .post("/login")
        .json(&json!({ "username": username, "password": password }))
        .await
}

/// Sign up and log in; returns (user id, token)
async fn register(app: &TestApp, username: &str, role: &str) -> (i64, String) {
    let response = signup(app, username, role).await;
    assert_eq!(response.status_code(), StatusCode::CREATED, "{}", response.text());
    let user: Value = response.json();

    let response = login(app, username, PASSWORD).await;
    assert_eq!(response.status_code(), StatusCode::OK, "{}", response.text());
    let body: Value = response.json();

    (
        user["id"].as_i64().unwrap(),
        body["token"].as_str().unwrap().to_string(),
    )
}

async fn create_assignment(app: &TestApp, token: &str, title: &str, description: &str) -> TestResponse {
    app.server
        .post("/assignments/create")
        .add_header(header::AUTHORIZATION, bearer(token))
        .json(&json!({ "title": title, "description": description }))
        .await
}

async fn create_assignment_id(app: &TestApp, token: &str, title: &str) -> i64 {
    let response = create_assignment(app, token, title, "desc").await;
    assert_eq!(response.status_code(), StatusCode::CREATED, "{}", response.text());
    let assignment: Value = response.json();
    assignment["id"].as_i64().unwrap()
}

fn multipart_body(filename: Option<&str>, contents: &[u8], comment: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(filename) = filename {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(contents);
        body.extend_from_slice(b"\r\n");
    }
    if let Some(comment) = comment {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"comment\"\r\n\r\n{}\r\n",
                BOUNDARY, comment
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

async fn submit_raw(app: &TestApp, token: &str, assignment_id: &str, body: Vec<u8>) -> TestResponse {
    app.server
        .post(&format!("/assignments/{}/submit", assignment_id))
        .add_header(header::AUTHORIZATION, bearer(token))
        .content_type(&format!("multipart/form-data; boundary={}", BOUNDARY))
        .bytes(body.into())
        .await
}

async fn submit(app: &TestApp, token: &str, assignment_id: i64, filename: &str, contents: &[u8]) -> TestResponse {
    submit_raw(
        app,
        token,
        &assignment_id.to_string(),
        multipart_body(Some(filename), contents, None),
    )
    .await
}

async fn list_submissions(app: &TestApp, token: &str, assignment_id: i64) -> TestResponse {
    app.server
        .get(&format!("/assignments/{}/submissions", assignment_id))
        .add_header(header::AUTHORIZATION, bearer(token))
        .await
}

async fn submission_count(app: &TestApp) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM submissions")
        .fetch_one(&app.pool)
        .await
        .unwrap()
}

// ============================================================================
// Health, signup and login
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app().await;

    let response = app.server.get("/").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["message"], "Assignment Tracker API is running");
}

#[tokio::test]
async fn test_signup_creates_user_without_exposing_hash() {
    let app = create_test_app().await;

    let response = signup(&app, "alice", "teacher").await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert!(body["id"].as_i64().unwrap() > 0);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["role"], "teacher");
    assert!(body.get("password_hash").is_none());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_signup_duplicate_username_conflicts() {
    let app = create_test_app().await;
    signup(&app, "alice", "teacher").await;

    let response = signup(&app, "ALICE", "student").await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error_kind"], "conflict");
}

#[tokio::test]
async fn test_signup_rejects_invalid_input() {
    let app = create_test_app().await;

    let short_password = app
        .server
        .post("/signup")
        .json(&json!({ "username": "alice", "password": "short", "role": "teacher" }))
        .await;
    assert_eq!(short_password.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = short_password.json();
    assert_eq!(body["error_kind"], "validation_error");
    assert!(body["details"].get("password").is_some());

    let unknown_role = app
        .server
        .post("/signup")
        .json(&json!({ "username": "alice", "password": PASSWORD, "role": "admin" }))
        .await;
    assert_eq!(unknown_role.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = unknown_role.json();
    assert_eq!(body["error_kind"], "validation_error");

    let malformed = app
        .server
        .post("/signup")
        .content_type("application/json")
        .text("{not json")
        .await;
    assert_eq!(malformed.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_returns_verifiable_token() {
    let app = create_test_app().await;
    let response = signup(&app, "bob", "student").await;
    let user: Value = response.json();

    let response = login(&app, "bob", PASSWORD).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["expires_in"], 1800);

    let identity = app.tokens.verify(body["token"].as_str().unwrap()).unwrap();
    assert_eq!(identity.user_id, user["id"].as_i64().unwrap());
    assert_eq!(identity.role, auth::Role::Student);
}

#[tokio::test]
async fn test_login_with_bad_credentials_is_unauthorized() {
    let app = create_test_app().await;
    signup(&app, "bob", "student").await;

    for (username, password) in [("bob", "wrong-password"), ("nobody", PASSWORD)] {
        let response = login(&app, username, password).await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["error_kind"], "unauthorized");
        assert_eq!(body["reason"], "invalid_credentials");
    }
}

#[tokio::test]
async fn test_me_returns_current_user() {
    let app = create_test_app().await;
    let (user_id, token) = register(&app, "alice", "teacher").await;

    let response = app
        .server
        .get("/me")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["id"], user_id);
    assert_eq!(body["username"], "alice");
}

// ============================================================================
// Authentication on protected routes
// ============================================================================

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/assignments/create")
        .json(&json!({ "title": "HW1", "description": "desc" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["reason"], "missing_token");

    let response = app
        .server
        .get("/assignments")
        .add_header(header::AUTHORIZATION, bearer("garbage"))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["reason"], "invalid_token");
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    use crate::auth::token::Claims;
    use jsonwebtoken::{encode, EncodingKey, Header};

    let app = create_test_app().await;
    let (user_id, _) = register(&app, "alice", "teacher").await;

    let now = chrono::Utc::now().timestamp();
    let expired = encode(
        &Header::default(),
        &Claims { sub: user_id, role: auth::Role::Teacher, iat: now - 3600, exp: now - 1800 },
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let response = create_assignment(&app, &expired, "HW1", "desc").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["reason"], "expired_token");
}

#[tokio::test]
async fn test_token_for_unknown_account_cannot_create() {
    let app = create_test_app().await;
    let token = app.tokens.issue(999, auth::Role::Teacher).unwrap();

    let response = create_assignment(&app, &token, "HW1", "desc").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Role gating and ownership
// ============================================================================

#[tokio::test]
async fn test_student_cannot_create_assignment() {
    let app = create_test_app().await;
    let (_, student) = register(&app, "bob", "student").await;

    let response = create_assignment(&app, &student, "HW1", "desc").await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["error_kind"], "forbidden");
}

#[tokio::test]
async fn test_teacher_cannot_submit() {
    let app = create_test_app().await;
    let (_, teacher) = register(&app, "alice", "teacher").await;
    let assignment_id = create_assignment_id(&app, &teacher, "HW1").await;

    let response = submit(&app, &teacher, assignment_id, "answer.txt", b"42").await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(submission_count(&app).await, 0);
}

#[tokio::test]
async fn test_other_teacher_cannot_list_submissions() {
    let app = create_test_app().await;
    let (_, alice) = register(&app, "alice", "teacher").await;
    let (_, carol) = register(&app, "carol", "teacher").await;
    let assignment_id = create_assignment_id(&app, &alice, "HW1").await;

    let response = list_submissions(&app, &carol, assignment_id).await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["error_kind"], "forbidden");
}

#[tokio::test]
async fn test_list_submissions_for_missing_assignment() {
    let app = create_test_app().await;
    let (_, alice) = register(&app, "alice", "teacher").await;

    let response = list_submissions(&app, &alice, 404).await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error_kind"], "not_found");
}

// ============================================================================
// Assignments
// ============================================================================

#[tokio::test]
async fn test_create_assignment_trims_and_records_creator() {
    let app = create_test_app().await;
    let (alice_id, alice) = register(&app, "alice", "teacher").await;

    let response = create_assignment(&app, &alice, "  HW1  ", "Linked lists\n").await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["title"], "HW1");
    assert_eq!(body["description"], "Linked lists");
    assert_eq!(body["created_by"], alice_id);
}

#[tokio::test]
async fn test_create_assignment_rejects_blank_fields() {
    let app = create_test_app().await;
    let (_, alice) = register(&app, "alice", "teacher").await;

    for (title, description) in [("", "desc"), ("   ", "desc"), ("HW1", "")] {
        let response = create_assignment(&app, &alice, title, description).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error_kind"], "validation_error");
    }
}

#[tokio::test]
async fn test_list_assignments_visible_to_students() {
    let app = create_test_app().await;
    let (_, alice) = register(&app, "alice", "teacher").await;
    let (_, bob) = register(&app, "bob", "student").await;
    create_assignment_id(&app, &alice, "HW1").await;
    create_assignment_id(&app, &alice, "HW2").await;

    let response = app
        .server
        .get("/assignments")
        .add_header(header::AUTHORIZATION, bearer(&bob))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let assignments: Vec<Value> = response.json();
    assert_eq!(assignments.len(), 2);
    assert_eq!(assignments[0]["title"], "HW2");
}

// ============================================================================
// Submissions
// ============================================================================

#[tokio::test]
async fn test_full_submission_flow() {
    let app = create_test_app().await;
    let (_, alice) = register(&app, "alice", "teacher").await;
    let assignment_id = {
        let response = create_assignment(&app, &alice, "HW1", "desc").await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        let body: Value = response.json();
        body["id"].as_i64().unwrap()
    };
    let (bob_id, bob) = register(&app, "bob", "student").await;

    let response = submit(&app, &bob, assignment_id, "answer.txt", b"my answer").await;
    assert_eq!(response.status_code(), StatusCode::CREATED, "{}", response.text());
    let submission: Value = response.json();
    let file_key = submission["file_key"].as_str().unwrap().to_string();
    assert_eq!(submission["student_id"], bob_id);
    assert_eq!(submission["assignment_id"], assignment_id);
    assert_eq!(submission["original_filename"], "answer.txt");
    assert_eq!(submission["size_bytes"], 9);
    assert!(app.blobs.contains(&file_key));

    let response = list_submissions(&app, &alice, assignment_id).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let listed: Vec<Value> = response.json();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["student_id"], bob_id);
    assert_eq!(listed[0]["file_key"], file_key.as_str());

    let response = list_submissions(&app, &bob, assignment_id).await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_submit_to_missing_assignment_creates_nothing() {
    let app = create_test_app().await;
    let (_, bob) = register(&app, "bob", "student").await;

    let response = submit(&app, &bob, 999, "answer.txt", b"my answer").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error_kind"], "not_found");
    assert_eq!(submission_count(&app).await, 0);
    assert!(app.blobs.is_empty());
}

#[tokio::test]
async fn test_resubmissions_keep_history() {
    let app = create_test_app().await;
    let (_, alice) = register(&app, "alice", "teacher").await;
    let (_, bob) = register(&app, "bob", "student").await;
    let assignment_id = create_assignment_id(&app, &alice, "HW1").await;

    let first: Value = submit(&app, &bob, assignment_id, "answer.txt", b"v1").await.json();
    let second: Value = submit(&app, &bob, assignment_id, "answer.txt", b"v2").await.json();

    assert_ne!(first["file_key"], second["file_key"]);
    let listed: Vec<Value> = list_submissions(&app, &alice, assignment_id).await.json();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["id"], first["id"]);
    assert_eq!(listed[1]["id"], second["id"]);
    assert_eq!(app.blobs.len(), 2);
}

#[tokio::test]
async fn test_submit_stores_comment_and_sanitizes_filename() {
    let app = create_test_app().await;
    let (_, alice) = register(&app, "alice", "teacher").await;
    let (_, bob) = register(&app, "bob", "student").await;
    let assignment_id = create_assignment_id(&app, &alice, "HW1").await;

    let response = submit_raw(
        &app,
        &bob,
        &assignment_id.to_string(),
        multipart_body(Some("../../etc/passwd"), b"root:x", Some("  late, sorry  ")),
    )
    .await;

    assert_eq!(response.status_code(), StatusCode::CREATED, "{}", response.text());
    let body: Value = response.json();
    assert_eq!(body["comment"], "late, sorry");
    let key = body["file_key"].as_str().unwrap();
    assert!(key.ends_with("-passwd"));
    assert!(!key.contains(".."));
}

#[tokio::test]
async fn test_submit_rejects_malformed_uploads() {
    let app = create_test_app().await;
    let (_, alice) = register(&app, "alice", "teacher").await;
    let (_, bob) = register(&app, "bob", "student").await;
    let assignment_id = create_assignment_id(&app, &alice, "HW1").await;

    let no_file = submit_raw(&app, &bob, &assignment_id.to_string(), multipart_body(None, b"", Some("hi"))).await;
    assert_eq!(no_file.status_code(), StatusCode::BAD_REQUEST);

    let empty_file = submit(&app, &bob, assignment_id, "empty.txt", b"").await;
    assert_eq!(empty_file.status_code(), StatusCode::BAD_REQUEST);

    let bad_id = submit_raw(&app, &bob, "abc", multipart_body(Some("a.txt"), b"x", None)).await;
    assert_eq!(bad_id.status_code(), StatusCode::BAD_REQUEST);

    assert_eq!(submission_count(&app).await, 0);
}

#[tokio::test]
async fn test_submit_over_size_limit_is_payload_too_large() {
    let app = create_test_app().await;
    let (_, alice) = register(&app, "alice", "teacher").await;
    let (_, bob) = register(&app, "bob", "student").await;
    let assignment_id = create_assignment_id(&app, &alice, "HW1").await;

    let response = submit(&app, &bob, assignment_id, "big.bin", &vec![b'x'; MAX_UPLOAD_BYTES * 2]).await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = response.json();
    assert_eq!(body["error_kind"], "payload_too_large");
    assert_eq!(submission_count(&app).await, 0);
    assert!(app.blobs.is_empty());
}

#[tokio::test]
async fn test_download_permissions() {
    let app = create_test_app().await;
    let (_, alice) = register(&app, "alice", "teacher").await;
    let (_, dave) = register(&app, "dave", "teacher").await;
    let (_, bob) = register(&app, "bob", "student").await;
    let (_, carol) = register(&app, "carol", "student").await;
    let assignment_id = create_assignment_id(&app, &alice, "HW1").await;

    let submission: Value = submit(&app, &bob, assignment_id, "answer.txt", b"my answer").await.json();
    let path = format!("/submissions/{}/file", submission["id"].as_i64().unwrap());

    for token in [&alice, &bob] {
        let response = app
            .server
            .get(&path)
            .add_header(header::AUTHORIZATION, bearer(token))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.text(), "my answer");
        let disposition = response.headers().get(header::CONTENT_DISPOSITION).unwrap();
        assert_eq!(disposition, "attachment; filename=\"answer.txt\"");
    }

    for token in [&dave, &carol] {
        let response = app
            .server
            .get(&path)
            .add_header(header::AUTHORIZATION, bearer(token))
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }

    let response = app
        .server
        .get("/submissions/999/file")
        .add_header(header::AUTHORIZATION, bearer(&alice))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = create_test_app().await;

    let response = app.server.get("/api-docs/openapi.json").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let doc: Value = response.json();
    assert!(doc["paths"].get("/assignments/{id}/submissions").is_some());
    assert!(doc["components"]["securitySchemes"].get("bearer_auth").is_some());
    assert!(doc["components"]["schemas"].get("ErrorResponse").is_some());
    assert!(doc["components"]["schemas"].get("SubmitForm").is_some());
    assert!(doc["paths"]["/assignments/{id}/submit"]["post"]["responses"].get("413").is_some());
}
