//! Application state shared across handlers and middleware

use crate::auth::jwt::TokenCodec;
use crate::auth::service::AuthService;
use crate::db::Database;
use crate::store::{RoleStore, UserStore};
use crate::AppConfig;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: Database,
    pub roles: RoleStore,
    pub users: UserStore,
    pub codec: TokenCodec,
    pub auth: AuthService,
}

impl AppState {
    /// Connect the database, build the stores, and seed default roles.
    ///
    /// Seeding happens here, before the listener binds, so authorization-
    /// dependent traffic never races an unseeded role store.
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        crate::error::set_dev_mode(config.dev_mode);

        let db = Database::connect(&config.database_url).await?;

        let roles = RoleStore::new(db.pool().clone());
        let users = UserStore::new(db.pool().clone());
        let codec = TokenCodec::new(config.jwt_secret.as_bytes(), config.token_ttl_secs);
        let auth = AuthService::new(users.clone(), roles.clone(), codec.clone());

        roles
            .seed_defaults(&config.role_seeds)
            .await
            .map_err(|e| anyhow::anyhow!("Role seeding failed: {}", e))?;

        info!("Application state initialized");
        Ok(Self {
            config,
            db,
            roles,
            users,
            codec,
            auth,
        })
    }
}
