#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::Value;
use std::{
    fs,
    path::PathBuf,
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

use waypost::auth::{FixedWindowThrottle, TokenCodec};
use waypost::config::AuthConfig;
use waypost::db::NavStore;
use waypost::middleware::auth::AuthRuntime;
use waypost::router::{WaypostState, waypost_router};

pub const TEST_USER: &str = "admin";
pub const TEST_PASSWORD: &str = "correct-horse-battery-staple";
pub const TEST_SECRET: &str = "integration-test-secret";

/// One isolated instance on a temp-file database; the file is removed
/// when the handle drops.
pub struct TestApp {
    pub router: Router,
    db_path: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.db_path);
    }
}

pub fn auth_disabled() -> AuthConfig {
    AuthConfig::default()
}

pub fn auth_enabled() -> AuthConfig {
    AuthConfig {
        enabled: true,
        username: TEST_USER.to_string(),
        // minimum cost keeps the suite fast
        password_hash: bcrypt::hash(TEST_PASSWORD, 4).expect("hash test password"),
        secret: TEST_SECRET.to_string(),
        required_for_read: false,
    }
}

pub async fn spawn_app(auth_cfg: AuthConfig) -> TestApp {
    spawn_app_with(auth_cfg, 5).await
}

pub async fn spawn_app_with(auth_cfg: AuthConfig, max_attempts: u32) -> TestApp {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut db_path = std::env::temp_dir();
    db_path.push(format!(
        "waypost-test-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));

    let database_url = format!("sqlite:{}", db_path.display());
    let store = NavStore::connect(&database_url)
        .await
        .expect("connect test database");

    let throttle = Arc::new(FixedWindowThrottle::new(
        max_attempts,
        Duration::from_secs(900),
    ));
    let state = WaypostState::new(store, AuthRuntime::new(&auth_cfg, true), throttle);
    TestApp {
        router: waypost_router(state),
        db_path,
    }
}

/// A token minted with the same secret the app runs with, bypassing
/// the login endpoint.
pub fn mint_token() -> String {
    TokenCodec::new(TEST_SECRET)
        .sign(TEST_USER, 3600)
        .expect("sign test token")
}

pub fn expired_token() -> String {
    TokenCodec::new(TEST_SECRET)
        .sign(TEST_USER, -10)
        .expect("sign test token")
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    build_request("GET", uri, token, None)
}

pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    build_request("DELETE", uri, token, None)
}

pub fn post_json(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    build_request("POST", uri, token, Some(body.to_string()))
}

pub fn put_json(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    build_request("PUT", uri, token, Some(body.to_string()))
}

fn build_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<String>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    builder
        .body(body.map(Body::from).unwrap_or_else(Body::empty))
        .expect("failed to build request")
}

/// Fire one request and hand back the raw response, for tests that
/// inspect headers.
pub async fn send_raw(app: &Router, request: Request<Body>) -> axum::response::Response {
    app.clone().oneshot(request).await.expect("request failed")
}

/// Fire one request and decode the JSON body (Null when empty).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = send_raw(app, request).await;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Create a group through the API; returns its id.
pub async fn create_group(app: &Router, token: Option<&str>, body: Value) -> i64 {
    let (status, json) = send(app, post_json("/api/groups", token, &body)).await;
    assert_eq!(status, StatusCode::OK, "create group failed: {json}");
    json["id"].as_i64().expect("group id")
}

/// Create a site through the API; returns its id.
pub async fn create_site(app: &Router, token: Option<&str>, body: Value) -> i64 {
    let (status, json) = send(app, post_json("/api/sites", token, &body)).await;
    assert_eq!(status, StatusCode::OK, "create site failed: {json}");
    json["id"].as_i64().expect("site id")
}
