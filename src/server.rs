//! HTTP server wiring

use crate::{create_app, AppConfig, AppState};
use axum::serve;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Main server: owns the configuration and the shared state
pub struct Server {
    config: AppConfig,
    state: AppState,
}

impl Server {
    /// Create a new server; connects the database and seeds default roles
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let state = AppState::new(config.clone()).await?;
        Ok(Self { config, state })
    }

    /// Start the server and block until shutdown
    pub async fn start(self) -> anyhow::Result<()> {
        let address = self.config.address();

        info!("🚀 Starting gatekeeper");
        info!("📍 Server address: http://{}", address);
        info!("🔧 Development mode: {}", self.config.dev_mode);

        let app = create_app(self.state);

        let listener = TcpListener::bind(&address).await?;
        info!("✅ Server listening on http://{}", address);

        if let Err(e) = serve(listener, app).await {
            error!("❌ Server error: {}", e);
            return Err(e.into());
        }

        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Builder for Server
pub struct ServerBuilder {
    config: AppConfig,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::from_env(),
        }
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn dev_mode(mut self, dev_mode: bool) -> Self {
        self.config.dev_mode = dev_mode;
        self
    }

    pub fn database_url<S: Into<String>>(mut self, database_url: S) -> Self {
        self.config.database_url = database_url.into();
        self
    }

    pub async fn build(self) -> anyhow::Result<Server> {
        Server::new(self.config).await
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
