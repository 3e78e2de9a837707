//! Database-backed role storage

use crate::error::{ApiError, ApiResult};
use crate::models::{Role, RoleSeed};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Row shape for the roles table
#[derive(Debug, sqlx::FromRow)]
struct RoleRecord {
    id: String,
    name: String,
    permissions: String, // JSON array
    created_at: String,  // RFC 3339
    updated_at: String,
}

impl RoleRecord {
    fn into_role(self) -> ApiResult<Role> {
        let permissions: Vec<String> = serde_json::from_str(&self.permissions)
            .map_err(|e| ApiError::Internal(format!("Corrupt permissions column: {}", e)))?;

        let created_at: DateTime<Utc> = self
            .created_at
            .parse()
            .map_err(|e| ApiError::Internal(format!("Corrupt created_at column: {}", e)))?;
        let updated_at: DateTime<Utc> = self
            .updated_at
            .parse()
            .map_err(|e| ApiError::Internal(format!("Corrupt updated_at column: {}", e)))?;

        Ok(Role {
            id: self.id,
            name: self.name,
            permissions,
            created_at,
            updated_at,
        })
    }
}

/// Store for role definitions
#[derive(Debug, Clone)]
pub struct RoleStore {
    pool: SqlitePool,
}

impl RoleStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a role by its unique name
    pub async fn find_by_name(&self, name: &str) -> ApiResult<Option<Role>> {
        let record =
            sqlx::query_as::<_, RoleRecord>("SELECT * FROM roles WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        record.map(RoleRecord::into_role).transpose()
    }

    /// Find a role by id
    pub async fn find_by_id(&self, id: &str) -> ApiResult<Option<Role>> {
        let record = sqlx::query_as::<_, RoleRecord>("SELECT * FROM roles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        record.map(RoleRecord::into_role).transpose()
    }

    /// List all roles
    pub async fn list(&self) -> ApiResult<Vec<Role>> {
        let records =
            sqlx::query_as::<_, RoleRecord>("SELECT * FROM roles ORDER BY created_at")
                .fetch_all(&self.pool)
                .await?;

        records.into_iter().map(RoleRecord::into_role).collect()
    }

    /// Create a new role; fails with Conflict if the name is taken
    pub async fn create(&self, name: &str, permissions: Vec<String>) -> ApiResult<Role> {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("Role name is required".to_string()));
        }
        let permissions = normalize_permissions(permissions)?;

        let now = Utc::now();
        let role = Role {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            permissions,
            created_at: now,
            updated_at: now,
        };

        let permissions_json = serde_json::to_string(&role.permissions)
            .map_err(|e| ApiError::Internal(format!("Failed to encode permissions: {}", e)))?;

        sqlx::query(
            "INSERT INTO roles (id, name, permissions, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&role.id)
        .bind(&role.name)
        .bind(&permissions_json)
        .bind(role.created_at.to_rfc3339())
        .bind(role.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => ApiError::Conflict("Role already exists".to_string()),
            other => other,
        })?;

        debug!("Created role: {}", role.name);
        Ok(role)
    }

    /// Partial update; only provided fields change
    pub async fn update(
        &self,
        id: &str,
        name: Option<String>,
        permissions: Option<Vec<String>>,
    ) -> ApiResult<Role> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Role not found".to_string()))?;

        let name = name.unwrap_or(existing.name);
        let permissions = match permissions {
            Some(p) => normalize_permissions(p)?,
            None => existing.permissions,
        };
        let updated_at = Utc::now();

        let permissions_json = serde_json::to_string(&permissions)
            .map_err(|e| ApiError::Internal(format!("Failed to encode permissions: {}", e)))?;

        sqlx::query("UPDATE roles SET name = ?, permissions = ?, updated_at = ? WHERE id = ?")
            .bind(&name)
            .bind(&permissions_json)
            .bind(updated_at.to_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match ApiError::from(e) {
                ApiError::Conflict(_) => ApiError::Conflict("Role already exists".to_string()),
                other => other,
            })?;

        debug!("Updated role: {}", name);
        Ok(Role {
            id: existing.id,
            name,
            permissions,
            created_at: existing.created_at,
            updated_at,
        })
    }

    /// Seed default roles if the store is empty.
    ///
    /// Idempotent: a non-empty store is left untouched. A Conflict raced in
    /// by a concurrent seeder is ignored so double-seeding is a no-op.
    pub async fn seed_defaults(&self, seeds: &[RoleSeed]) -> ApiResult<()> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM roles")
            .fetch_one(&self.pool)
            .await?;

        if count > 0 {
            debug!("Role store already seeded ({} roles)", count);
            return Ok(());
        }

        for seed in seeds {
            match self.create(&seed.name, seed.permissions.clone()).await {
                Ok(_) => {}
                Err(ApiError::Conflict(_)) => {
                    debug!("Role '{}' seeded by another instance", seed.name);
                }
                Err(e) => {
                    error!("Role seeding failed for '{}': {}", seed.name, e);
                    return Err(e);
                }
            }
        }

        info!("Seeded {} default roles", seeds.len());
        Ok(())
    }
}

/// Reject empty permission tags and drop duplicates, preserving order
fn normalize_permissions(permissions: Vec<String>) -> ApiResult<Vec<String>> {
    let mut seen = Vec::with_capacity(permissions.len());
    for p in permissions {
        if p.trim().is_empty() {
            return Err(ApiError::Validation(
                "Permission tags must be non-empty".to_string(),
            ));
        }
        if !seen.contains(&p) {
            seen.push(p);
        }
    }
    Ok(seen)
}
