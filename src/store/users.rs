//! Database-backed user credential storage

use crate::error::{ApiError, ApiResult};
use crate::models::{User, UserInfo};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

/// Row shape for the users table
#[derive(Debug, sqlx::FromRow)]
struct UserRecord {
    id: String,
    username: String,
    email: String,
    password_hash: String,
    role_id: String,
    is_active: bool,
    created_at: String, // RFC 3339
    updated_at: String,
}

impl UserRecord {
    fn into_user(self) -> ApiResult<User> {
        let created_at: DateTime<Utc> = self
            .created_at
            .parse()
            .map_err(|e| ApiError::Internal(format!("Corrupt created_at column: {}", e)))?;
        let updated_at: DateTime<Utc> = self
            .updated_at
            .parse()
            .map_err(|e| ApiError::Internal(format!("Corrupt updated_at column: {}", e)))?;

        Ok(User {
            id: self.id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            role_id: self.role_id,
            is_active: self.is_active,
            created_at,
            updated_at,
        })
    }
}

/// Store for user records
#[derive(Debug, Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a user by either email or username, whichever matches first
    pub async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> ApiResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT * FROM users WHERE email = ? OR username = ?",
        )
        .bind(email)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        record.map(UserRecord::into_user).transpose()
    }

    /// Find a user by email (login path)
    pub async fn find_by_email(&self, email: &str) -> ApiResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        record.map(UserRecord::into_user).transpose()
    }

    /// Find a user by id
    pub async fn find_by_id(&self, id: &str) -> ApiResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        record.map(UserRecord::into_user).transpose()
    }

    /// List all users with resolved role names, hashes stripped
    pub async fn list(&self) -> ApiResult<Vec<UserInfo>> {
        #[derive(sqlx::FromRow)]
        struct ListRow {
            id: String,
            username: String,
            email: String,
            role: String,
            is_active: bool,
            created_at: String,
        }

        let rows = sqlx::query_as::<_, ListRow>(
            r#"
            SELECT u.id, u.username, u.email, r.name AS role, u.is_active, u.created_at
            FROM users u
            JOIN roles r ON r.id = u.role_id
            ORDER BY u.created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let created_at: DateTime<Utc> = row
                    .created_at
                    .parse()
                    .map_err(|e| ApiError::Internal(format!("Corrupt created_at column: {}", e)))?;
                Ok(UserInfo {
                    id: row.id,
                    username: row.username,
                    email: row.email,
                    role: row.role,
                    is_active: row.is_active,
                    created_at,
                })
            })
            .collect()
    }

    /// Create a new user; fails with Conflict if username or email is taken
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        role_id: &str,
    ) -> ApiResult<User> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role_id: role_id.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, role_id, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role_id)
        .bind(user.is_active)
        .bind(user.created_at.to_rfc3339())
        .bind(user.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => ApiError::Conflict("User already exists".to_string()),
            other => other,
        })?;

        debug!("Created user: {}", user.username);
        Ok(user)
    }

    /// Partial profile update; absent or empty fields keep their current values
    pub async fn update_profile(
        &self,
        id: &str,
        username: Option<String>,
        email: Option<String>,
    ) -> ApiResult<User> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        let username = username
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| existing.username.clone());
        let email = email
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| existing.email.clone());
        let updated_at = Utc::now();

        sqlx::query("UPDATE users SET username = ?, email = ?, updated_at = ? WHERE id = ?")
            .bind(&username)
            .bind(&email)
            .bind(updated_at.to_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match ApiError::from(e) {
                ApiError::Conflict(_) => ApiError::Conflict("User already exists".to_string()),
                other => other,
            })?;

        Ok(User {
            username,
            email,
            updated_at,
            ..existing
        })
    }

    /// Toggle the active flag; fails with NotFound if the id does not resolve
    pub async fn update_status(&self, id: &str, is_active: bool) -> ApiResult<User> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        let updated_at = Utc::now();
        sqlx::query("UPDATE users SET is_active = ?, updated_at = ? WHERE id = ?")
            .bind(is_active)
            .bind(updated_at.to_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(
            "User {} {}",
            existing.username,
            if is_active { "activated" } else { "deactivated" }
        );
        Ok(User {
            is_active,
            updated_at,
            ..existing
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::store::RoleStore;

    async fn test_stores() -> (UserStore, RoleStore) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        (
            UserStore::new(db.pool().clone()),
            RoleStore::new(db.pool().clone()),
        )
    }

    async fn seeded_role_id(roles: &RoleStore) -> String {
        roles
            .create("User", vec!["read:profile".to_string()])
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn create_and_lookup_user() {
        let (users, roles) = test_stores().await;
        let role_id = seeded_role_id(&roles).await;

        let created = users
            .create("alice", "a@x.com", "hash", &role_id)
            .await
            .unwrap();
        assert!(created.is_active);

        let by_email = users
            .find_by_email_or_username("a@x.com", "nobody")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, created.id);

        let by_username = users
            .find_by_email_or_username("none@x.com", "alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_username.id, created.id);

        assert!(users
            .find_by_email_or_username("none@x.com", "nobody")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn duplicate_username_or_email_is_conflict() {
        let (users, roles) = test_stores().await;
        let role_id = seeded_role_id(&roles).await;

        users
            .create("alice", "a@x.com", "hash", &role_id)
            .await
            .unwrap();

        let err = users
            .create("alice", "other@x.com", "hash", &role_id)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));

        let err = users
            .create("bob", "a@x.com", "hash", &role_id)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn profile_update_is_partial() {
        let (users, roles) = test_stores().await;
        let role_id = seeded_role_id(&roles).await;
        let user = users
            .create("alice", "a@x.com", "hash", &role_id)
            .await
            .unwrap();

        let updated = users
            .update_profile(&user.id, Some("alice2".to_string()), None)
            .await
            .unwrap();
        assert_eq!(updated.username, "alice2");
        assert_eq!(updated.email, "a@x.com");
    }

    #[tokio::test]
    async fn profile_update_treats_empty_fields_as_absent() {
        let (users, roles) = test_stores().await;
        let role_id = seeded_role_id(&roles).await;
        let user = users
            .create("alice", "a@x.com", "hash", &role_id)
            .await
            .unwrap();

        let updated = users
            .update_profile(&user.id, Some("".to_string()), Some("  ".to_string()))
            .await
            .unwrap();
        assert_eq!(updated.username, "alice");
        assert_eq!(updated.email, "a@x.com");
    }

    #[tokio::test]
    async fn status_toggle_and_missing_user() {
        let (users, roles) = test_stores().await;
        let role_id = seeded_role_id(&roles).await;
        let user = users
            .create("alice", "a@x.com", "hash", &role_id)
            .await
            .unwrap();

        let deactivated = users.update_status(&user.id, false).await.unwrap();
        assert!(!deactivated.is_active);

        let err = users.update_status("missing", true).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_resolves_role_names() {
        let (users, roles) = test_stores().await;
        let role_id = seeded_role_id(&roles).await;
        users
            .create("alice", "a@x.com", "hash", &role_id)
            .await
            .unwrap();

        let listed = users.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].role, "User");
    }
}
