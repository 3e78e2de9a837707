//! Domain models for roles and users

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named bundle of permission strings shared by many users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    /// Free-form capability tags, e.g. "read:profile"
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Internal user record including the password hash
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    /// References a Role by id; roles are shared, never embedded
    pub role_id: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Public projection with the password hash stripped
    pub fn to_info(&self, role_name: &str) -> UserInfo {
        UserInfo {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            role: role_name.to_string(),
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

/// User information safe to return to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub email: String,
    /// Resolved role name
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Seed definition for a default role, carried as configuration data
/// so the default set can be extended without code change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleSeed {
    pub name: String,
    pub permissions: Vec<String>,
}

/// The stock three-role hierarchy seeded into an empty role store
pub fn default_role_seeds() -> Vec<RoleSeed> {
    vec![
        RoleSeed {
            name: "User".to_string(),
            permissions: vec!["read:profile".to_string(), "update:profile".to_string()],
        },
        RoleSeed {
            name: "Moderator".to_string(),
            permissions: vec![
                "read:profile".to_string(),
                "update:profile".to_string(),
                "manage:users".to_string(),
            ],
        },
        RoleSeed {
            name: "Admin".to_string(),
            permissions: vec![
                "read:profile".to_string(),
                "update:profile".to_string(),
                "manage:users".to_string(),
                "manage:roles".to_string(),
                "full:access".to_string(),
            ],
        },
    ]
}
