#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use handoff_api::auth::jwt::{generate_access_token, JwtConfig};
use handoff_api::config::ServerConfig;
use handoff_api::router::build_app_router;
use handoff_api::state::AppState;
use handoff_db::models::organization::CreateOrganization;
use handoff_db::models::user::CreateUser;
use handoff_db::repositories::{OrganizationRepo, UserRepo};
use handoff_events::EventBus;

const TEST_JWT_SECRET: &str = "test-secret-not-for-production";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        public_base_url: "https://app.test".to_string(),
        outbox_max_limit: 100,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router over the given pool, with the same
/// middleware stack production uses. Email delivery is disabled.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::new(EventBus::default()),
        email: None,
    };
    build_app_router(state, &config)
}

/// A signed bearer token for the given identity.
pub fn token_for(user_id: i64, email: &str, role: &str) -> String {
    generate_access_token(user_id, email, role, &test_config().jwt).unwrap()
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub token: String,
}

pub async fn seed_user(pool: &PgPool, email: &str, role: &str) -> TestUser {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            display_name: None,
        },
    )
    .await
    .unwrap();
    TestUser {
        id: user.id,
        email: user.email.clone(),
        token: token_for(user.id, &user.email, role),
    }
}

/// A vendor rep who is an active member of a fresh organization.
pub async fn seed_vendor(pool: &PgPool, email: &str, org_name: &str) -> (TestUser, i64) {
    let rep = seed_user(pool, email, "vendor").await;
    let org = OrganizationRepo::create(
        pool,
        &CreateOrganization {
            name: org_name.to_string(),
        },
    )
    .await
    .unwrap();
    OrganizationRepo::add_member(pool, org.id, rep.id).await.unwrap();
    (rep, org.id)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str, token: Option<&str>) -> Response {
    send(app, Method::GET, uri, token, None).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response {
    send(app, Method::POST, uri, token, Some(body)).await
}

pub async fn put_json(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response {
    send(app, Method::PUT, uri, token, Some(body)).await
}

pub async fn delete(app: Router, uri: &str, token: Option<&str>) -> Response {
    send(app, Method::DELETE, uri, token, None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert a status and return the parsed body.
pub async fn expect_status(response: Response, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}
