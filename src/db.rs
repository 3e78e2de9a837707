//! Database connection bootstrap
//!
//! The pool is built once at startup and handed to each store constructor;
//! there is no process-wide connection singleton.

use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tracing::{debug, info};

/// Shared database handle
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database and create tables if they do not exist
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        info!("Connecting to database: {}", database_url);

        let pool = if database_url.contains(":memory:") {
            // A pooled in-memory SQLite database gets a fresh database per
            // connection; pin the pool to one connection so DDL is visible
            // to every acquire.
            SqlitePoolOptions::new()
                .max_connections(1)
                .connect(database_url)
                .await
                .context("Failed to connect to in-memory database")?
        } else {
            let db_path = database_url.strip_prefix("sqlite:").unwrap_or(database_url);

            if let Some(parent) = std::path::Path::new(db_path).parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)
                        .context("Failed to create database directory")?;
                }
            }

            let options = SqliteConnectOptions::new()
                .filename(db_path)
                .create_if_missing(true);

            SqlitePoolOptions::new()
                .connect_with(options)
                .await
                .context("Failed to connect to database")?
        };

        info!("Database connection established");

        Self::create_tables(&pool).await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create_tables(pool: &SqlitePool) -> anyhow::Result<()> {
        debug!("Creating roles table");
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS roles (
                id TEXT PRIMARY KEY,
                name TEXT UNIQUE NOT NULL,
                permissions TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await
        .context("Failed to create roles table")?;

        debug!("Creating users table");
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role_id TEXT NOT NULL REFERENCES roles(id),
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await
        .context("Failed to create users table")?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_username ON users(username)")
            .execute(pool)
            .await
            .context("Failed to create username index")?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)")
            .execute(pool)
            .await
            .context("Failed to create email index")?;

        info!("Database tables ready");
        Ok(())
    }
}
