//! Authentication and authorization

pub mod handlers;
pub mod jwt;
pub mod service;

use crate::error::ApiError;
use crate::models::{Role, UserInfo};
use axum::{extract::FromRequestParts, http::request::Parts};

/// Per-request authorization context attached by the middleware after a
/// request is admitted. Holds the resolved user (hash stripped) and its
/// current role.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: UserInfo,
    pub role: Role,
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Not authorized".to_string()))
    }
}
