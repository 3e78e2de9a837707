//! Authorization middleware
//!
//! Each protected route declares a RoutePolicy at router build time; the
//! policy is passed to the middleware as layer state rather than captured
//! as ambient globals. A request is admitted iff its bearer token verifies,
//! the embedded user still exists and is active, and the user's current
//! role name is in the route's allowed set.

use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

/// Ordered set of role names allowed through a route
#[derive(Debug, Clone, Default)]
pub struct RoutePolicy {
    allowed: Vec<String>,
}

impl RoutePolicy {
    /// Allow only the given role names
    pub fn allow(roles: &[&str]) -> Self {
        Self {
            allowed: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    /// Allow any authenticated role
    pub fn any_authenticated() -> Self {
        Self::default()
    }

    /// Whether a role name is in the allowed set
    pub fn permits(&self, role_name: &str) -> bool {
        self.allowed.is_empty() || self.allowed.iter().any(|r| r == role_name)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}

/// Authorization gate for protected routes.
///
/// Decision pipeline: bearer extraction, token verification, user lookup,
/// active check, role re-resolution, allowed-set check. The role comes from
/// the store at request time, not from the token, so role changes take
/// effect without re-login.
pub async fn authorize(
    State((state, policy)): State<(AppState, RoutePolicy)>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| ApiError::Unauthorized("Not authorized, no token".to_string()))?;

    let claims = state.codec.verify(token)?;

    let user = state
        .users
        .find_by_id(&claims.sub)
        .await?
        .ok_or_else(|| {
            warn!("Valid token for missing user: {}", claims.sub);
            ApiError::Unauthorized("Not authorized, user not found".to_string())
        })?;

    if !user.is_active {
        warn!("Deactivated user rejected: {}", user.username);
        return Err(ApiError::Unauthorized(
            "Account is deactivated".to_string(),
        ));
    }

    let role = state
        .roles
        .find_by_id(&user.role_id)
        .await?
        .ok_or_else(|| {
            warn!("User {} references missing role {}", user.id, user.role_id);
            ApiError::Unauthorized("Not authorized, role not found".to_string())
        })?;

    if !policy.permits(&role.name) {
        debug!(
            "Role '{}' not in allowed set for user: {}",
            role.name, user.username
        );
        return Err(ApiError::Forbidden(
            "Access denied. Insufficient permissions.".to_string(),
        ));
    }

    let context = AuthContext {
        user: user.to_info(&role.name),
        role,
    };
    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}
