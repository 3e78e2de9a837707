//! Shared helpers for integration tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use gatekeeper::{create_app, AppConfig, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Build a test app backed by in-memory SQLite with seeded default roles
pub async fn test_app() -> (Router, AppState) {
    let config = AppConfig {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "integration-test-secret".to_string(),
        ..AppConfig::default()
    };
    let state = AppState::new(config).await.unwrap();
    (create_app(state.clone()), state)
}

/// Build a request with optional JSON body and bearer token
pub fn request(method: &str, uri: &str, body: Option<Value>, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    if let Some(body) = body {
        builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap()
    } else {
        builder.body(Body::empty()).unwrap()
    }
}

/// Read a response body as JSON
pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register a user and return the full auth response
pub async fn register(app: &Router, username: &str, email: &str, role_name: Option<&str>) -> Value {
    let mut body = json!({
        "username": username,
        "email": email,
        "password": "pw1234",
    });
    if let Some(role) = role_name {
        body["role_name"] = json!(role);
    }

    let response = app
        .clone()
        .oneshot(request("POST", "/api/auth/register", Some(body), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

/// Register a user and return just the issued token
pub async fn register_for_token(
    app: &Router,
    username: &str,
    email: &str,
    role_name: Option<&str>,
) -> String {
    register(app, username, email, role_name).await["token"]
        .as_str()
        .unwrap()
        .to_string()
}
