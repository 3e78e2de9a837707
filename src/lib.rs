//! Gatekeeper
//!
//! Role-based access control service: user registration and login with JWT
//! issuance, and per-route authorization gated by role.

pub mod auth;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod state;
pub mod store;

// Re-export main types
pub use error::{ApiError, ApiResult};
pub use server::Server;
pub use state::AppState;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    routing::get,
    Router,
};
use models::{default_role_seeds, RoleSeed};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    Router::new()
        .route("/", get(handlers::service_info))
        .nest("/api", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Configuration for the service
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable development mode (verbose error bodies)
    pub dev_mode: bool,
    /// Database URL
    pub database_url: String,
    /// Token signing secret
    pub jwt_secret: String,
    /// Token lifetime in seconds
    pub token_ttl_secs: i64,
    /// Default roles seeded into an empty role store
    pub role_seeds: Vec<RoleSeed>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            dev_mode: false,
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "gatekeeper-dev-secret-change-in-production".to_string(),
            token_ttl_secs: 3600,
            role_seeds: default_role_seeds(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let role_seeds = match std::env::var("GATEKEEPER_ROLE_SEEDS") {
            Ok(raw) => match serde_json::from_str::<Vec<RoleSeed>>(&raw) {
                Ok(seeds) if !seeds.is_empty() => seeds,
                Ok(_) => defaults.role_seeds.clone(),
                Err(e) => {
                    warn!("Ignoring malformed GATEKEEPER_ROLE_SEEDS: {}", e);
                    defaults.role_seeds.clone()
                }
            },
            Err(_) => defaults.role_seeds.clone(),
        };

        Self {
            host: std::env::var("GATEKEEPER_HOST").unwrap_or(defaults.host),
            port: std::env::var("GATEKEEPER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            dev_mode: std::env::var("GATEKEEPER_DEV_MODE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            jwt_secret: std::env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            token_ttl_secs: std::env::var("JWT_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.token_ttl_secs),
            role_seeds,
        }
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Initialize logging for the service
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gatekeeper=debug,tower_http=debug,axum=debug".into()),
        )
        .init();
}
