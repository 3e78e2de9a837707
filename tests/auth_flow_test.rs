//! Registration and login flows over the HTTP surface

mod common;

use axum::http::StatusCode;
use common::{body_json, register, request, test_app};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn register_issues_token_bound_to_resolved_role() {
    let (app, state) = test_app().await;

    let response = register(&app, "alice", "a@x.com", None).await;

    assert_eq!(response["user"]["username"], "alice");
    assert_eq!(response["user"]["role"], "User");
    assert_eq!(response["token_type"], "Bearer");
    assert!(response["user"].get("password_hash").is_none());

    // The token's embedded role id must match the role resolved at
    // registration time.
    let claims = state
        .codec
        .verify(response["token"].as_str().unwrap())
        .unwrap();
    let user_role = state.roles.find_by_name("User").await.unwrap().unwrap();
    assert_eq!(claims.role, user_role.id);
    assert_eq!(claims.sub, response["user"]["id"].as_str().unwrap());
}

#[tokio::test]
async fn duplicate_username_or_email_is_conflict() {
    let (app, _state) = test_app().await;
    register(&app, "alice", "a@x.com", None).await;

    // Same username, different email
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/register",
            Some(json!({ "username": "alice", "email": "b@x.com", "password": "pw1234" })),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["message"], "User already exists");

    // Same email, different username
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/register",
            Some(json!({ "username": "bob", "email": "a@x.com", "password": "pw1234" })),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn register_with_unknown_role_is_rejected() {
    let (app, _state) = test_app().await;

    let response = app
        .oneshot(request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "username": "alice",
                "email": "a@x.com",
                "password": "pw1234",
                "role_name": "SuperUser",
            })),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Invalid role specified");
}

#[tokio::test]
async fn login_succeeds_with_correct_credentials() {
    let (app, _state) = test_app().await;
    register(&app, "alice", "a@x.com", None).await;

    let response = app
        .oneshot(request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "a@x.com", "password": "pw1234" })),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn login_failures_share_one_message() {
    let (app, _state) = test_app().await;
    register(&app, "alice", "a@x.com", None).await;

    let unknown_email = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "nobody@x.com", "password": "pw1234" })),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    let unknown_body = body_json(unknown_email).await;

    let wrong_password = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "a@x.com", "password": "wrong!" })),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let wrong_body = body_json(wrong_password).await;

    // Identical message for both failure modes, preventing enumeration
    assert_eq!(unknown_body["message"], wrong_body["message"]);
}

#[tokio::test]
async fn logout_requires_a_token() {
    let (app, _state) = test_app().await;
    let token = common::register_for_token(&app, "alice", "a@x.com", None).await;

    let response = app
        .clone()
        .oneshot(request("POST", "/api/auth/logout", None, Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "Logged out successfully"
    );

    let response = app
        .oneshot(request("POST", "/api/auth/logout", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn short_password_is_a_validation_error() {
    let (app, _state) = test_app().await;

    let response = app
        .oneshot(request(
            "POST",
            "/api/auth/register",
            Some(json!({ "username": "alice", "email": "a@x.com", "password": "pw" })),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
