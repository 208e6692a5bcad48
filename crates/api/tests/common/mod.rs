//! Shared helpers for HTTP-level integration tests.
//!
//! Requests go through `tower::ServiceExt::oneshot`, so no TCP listener
//! is involved and each call consumes the router. Tests rebuild the app
//! from the pool as needed.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use sqlx::PgPool;
use tower::ServiceExt;

use peerhub_api::auth::jwt::{generate_access_token, JwtConfig};
use peerhub_api::config::ServerConfig;
use peerhub_api::router::build_app_router;
use peerhub_api::state::AppState;
use peerhub_db::models::project::{CreateProject, Project};
use peerhub_db::models::user::{User, VerifiedIdentity};
use peerhub_db::repositories::{ProjectRepo, UserRepo};

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-not-for-production".to_string(),
            expiry_days: 7,
        },
    }
}

/// Build the full application router with all middleware layers, using
/// the given database pool.
///
/// Shares `build_app_router` with `main.rs` so integration tests exercise
/// the same middleware stack (CORS, request ID, timeout, tracing, panic
/// recovery) that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

/// Create a user through the identity upsert and mint an access token
/// for them, exactly as `/auth/verify` would.
pub async fn seed_user(pool: &PgPool, subject: &str, display_name: &str) -> (User, String) {
    let identity = VerifiedIdentity {
        subject: subject.to_string(),
        email: format!("{subject}@example.com"),
        display_name: display_name.to_string(),
        photo_url: String::new(),
    };
    let user = UserRepo::upsert_identity(pool, &identity)
        .await
        .expect("user upsert should succeed");
    let token = generate_access_token(user.id, &test_config().jwt)
        .expect("token generation should succeed");
    (user, token)
}

/// Insert a project directly through the repository.
pub async fn seed_project(pool: &PgPool, author_id: i64, title: &str, tags: &[&str]) -> Project {
    let dto = CreateProject {
        title: title.to_string(),
        description: format!("Integration test project: {title}"),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        github_url: "https://github.com/example/repo".to_string(),
        live_url: String::new(),
        image_url: String::new(),
    };
    ProjectRepo::create(pool, author_id, &dto)
        .await
        .expect("project insert should succeed")
}

/// A well-formed request body for `POST /projects` and `PUT /projects/{id}`.
pub fn project_payload(title: &str) -> serde_json::Value {
    serde_json::json!({
        "title": title,
        "description": "A longer description that clears the minimum length.",
        "tags": ["rust", "web"],
        "githubUrl": "https://github.com/example/repo",
    })
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("request should succeed")
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

fn json_request_auth(
    method: &str,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

/// GET without authentication.
pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

/// GET with a Bearer token.
pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

/// POST a JSON body without authentication.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request("POST", uri, body)).await
}

/// POST a JSON body with a Bearer token.
pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request_auth("POST", uri, body, token)).await
}

/// PUT a JSON body without authentication.
pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request("PUT", uri, body)).await
}

/// PUT a JSON body with a Bearer token.
pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request_auth("PUT", uri, body, token)).await
}

/// DELETE without authentication.
pub async fn delete(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

/// DELETE with a Bearer token.
pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    use http_body_util::BodyExt;
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
