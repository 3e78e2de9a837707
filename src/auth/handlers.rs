//! Authentication handlers for registration, login, and logout

use super::service::{AuthResponse, LoginRequest, RegisterRequest};
use super::AuthContext;
use crate::error::ApiResult;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use tracing::info;

/// Register a new user account and issue a token
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    info!("Registration attempt: {}", request.username);
    let response = state.auth.register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Authenticate with email and password and issue a token
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    info!("Login attempt: {}", request.email);
    let response = state.auth.login(request).await?;
    Ok(Json(response))
}

/// Stateless logout; clients discard the token after calling this
pub async fn logout(ctx: AuthContext) -> Json<Value> {
    info!("User logout: {}", ctx.user.username);
    Json(json!({ "message": "Logged out successfully" }))
}
