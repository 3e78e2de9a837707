//! API error taxonomy shared by stores, services, and handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::error;

/// Whether internal error detail is included in response bodies.
/// Set once at startup from configuration.
static DEV_MODE: AtomicBool = AtomicBool::new(false);

/// Enable or disable development-mode error bodies
pub fn set_dev_mode(enabled: bool) {
    DEV_MODE.store(enabled, Ordering::Relaxed);
}

fn dev_mode() -> bool {
    DEV_MODE.load(Ordering::Relaxed)
}

/// Errors surfaced as HTTP responses
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Conflict(String),

    #[error("Invalid role specified")]
    InvalidRole,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InvalidRole | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ApiError::Conflict(_) => "conflict",
            ApiError::InvalidRole => "invalid_role",
            ApiError::Validation(_) => "validation",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal detail stays in the logs; clients get a generic message
        // unless development mode is enabled.
        let message = match &self {
            ApiError::Internal(detail) => {
                error!("Internal error: {}", detail);
                if dev_mode() {
                    detail.clone()
                } else {
                    "Something went wrong".to_string()
                }
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "message": message,
            "error": self.error_code(),
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return ApiError::Conflict("Duplicate value for unique field".to_string());
            }
        }
        ApiError::Internal(format!("Database error: {}", e))
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
