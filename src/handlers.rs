//! Request handlers for user and role administration

use crate::auth::AuthContext;
use crate::error::ApiResult;
use crate::models::UserInfo;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

/// Service description for the root route
pub async fn service_info() -> Json<Value> {
    Json(json!({
        "name": "gatekeeper",
        "message": "Role-based access control API",
        "endpoints": {
            "auth": ["POST /api/auth/register", "POST /api/auth/login", "POST /api/auth/logout"],
            "users": ["GET /api/users", "GET /api/users/profile", "PUT /api/users/profile", "PATCH /api/users/{id}/status"],
            "roles": ["POST /api/roles", "PUT /api/roles/{id}"],
        }
    }))
}

/// Liveness/readiness probe
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// List all users with resolved role names (Admin and Moderator only)
pub async fn list_users(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> ApiResult<Json<Vec<UserInfo>>> {
    debug!("User list requested by: {}", ctx.user.username);
    let users = state.users.list().await?;
    Ok(Json(users))
}

/// Current user's profile, from the per-request authorization context
pub async fn get_profile(ctx: AuthContext) -> Json<Value> {
    Json(json!({
        "user": ctx.user,
        "permissions": ctx.role.permissions,
    }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

/// Update the current user's profile; absent fields keep current values
pub async fn update_profile(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserInfo>> {
    let updated = state
        .users
        .update_profile(&ctx.user.id, request.username, request.email)
        .await?;

    info!("Profile updated: {}", updated.username);
    Ok(Json(updated.to_info(&ctx.role.name)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub is_active: bool,
}

/// Activate or deactivate a user account (Admin only)
pub async fn update_user_status(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Value>> {
    let user = state.users.update_status(&id, request.is_active).await?;

    info!(
        "User {} {} by {}",
        user.username,
        if user.is_active { "activated" } else { "deactivated" },
        ctx.user.username
    );
    Ok(Json(json!({
        "message": format!(
            "User {} successfully",
            if user.is_active { "activated" } else { "deactivated" }
        ),
        "user": {
            "id": user.id,
            "username": user.username,
            "email": user.email,
            "is_active": user.is_active,
        }
    })))
}

#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    pub permissions: Vec<String>,
}

/// Create a new role (Admin only)
pub async fn create_role(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(request): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let role = state.roles.create(&request.name, request.permissions).await?;

    info!("Role '{}' created by {}", role.name, ctx.user.username);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Role created successfully", "role": role })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub permissions: Option<Vec<String>>,
}

/// Update an existing role; only provided fields change (Admin only)
pub async fn update_role(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<String>,
    Json(request): Json<UpdateRoleRequest>,
) -> ApiResult<Json<Value>> {
    let role = state
        .roles
        .update(&id, request.name, request.permissions)
        .await?;

    info!("Role '{}' updated by {}", role.name, ctx.user.username);
    Ok(Json(json!({ "message": "Role updated successfully", "role": role })))
}
