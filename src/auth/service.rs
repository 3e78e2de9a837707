//! Authentication service: registration, login, and token issuance

use super::jwt::TokenCodec;
use crate::error::{ApiError, ApiResult};
use crate::models::UserInfo;
use crate::store::{RoleStore, UserStore};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Role bound to a registration when none is requested
pub const DEFAULT_ROLE: &str = "User";

/// Uniform login failure; never reveals whether the email is registered
const BAD_CREDENTIALS: &str = "Invalid email or password";

/// User registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Optional role name; defaults to "User"
    pub role_name: Option<String>,
}

/// User login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration/login response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserInfo,
    pub token: String,
    pub token_type: String,
}

/// Registers and authenticates users, issuing tokens via the codec
#[derive(Clone)]
pub struct AuthService {
    users: UserStore,
    roles: RoleStore,
    codec: TokenCodec,
}

impl AuthService {
    pub fn new(users: UserStore, roles: RoleStore, codec: TokenCodec) -> Self {
        Self {
            users,
            roles,
            codec,
        }
    }

    /// Register a new user bound to a role and issue a token
    pub async fn register(&self, request: RegisterRequest) -> ApiResult<AuthResponse> {
        if request.username.trim().is_empty()
            || request.email.trim().is_empty()
            || request.password.is_empty()
        {
            return Err(ApiError::Validation(
                "Username, email and password are required".to_string(),
            ));
        }
        if request.password.len() < 6 {
            return Err(ApiError::Validation(
                "Password must be at least 6 characters".to_string(),
            ));
        }

        if self
            .users
            .find_by_email_or_username(&request.email, &request.username)
            .await?
            .is_some()
        {
            debug!("Registration rejected, user exists: {}", request.username);
            return Err(ApiError::Conflict("User already exists".to_string()));
        }

        let role_name = request.role_name.as_deref().unwrap_or(DEFAULT_ROLE);
        let role = self
            .roles
            .find_by_name(role_name)
            .await?
            .ok_or(ApiError::InvalidRole)?;

        let password_hash = hash_password(&request.password)?;
        let user = self
            .users
            .create(&request.username, &request.email, &password_hash, &role.id)
            .await?;

        let token = self.codec.issue(&user.id, &role.id)?;

        info!("Registered new user: {}", user.username);
        Ok(AuthResponse {
            user: user.to_info(&role.name),
            token,
            token_type: "Bearer".to_string(),
        })
    }

    /// Authenticate by email and password and issue a token
    pub async fn login(&self, request: LoginRequest) -> ApiResult<AuthResponse> {
        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| ApiError::Unauthorized(BAD_CREDENTIALS.to_string()))?;

        if !verify_password(&request.password, &user.password_hash) {
            warn!("Invalid password for user: {}", user.username);
            return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }

        let role = self
            .roles
            .find_by_id(&user.role_id)
            .await?
            .ok_or_else(|| {
                ApiError::Internal(format!("Role {} not found for user {}", user.role_id, user.id))
            })?;

        let token = self.codec.issue(&user.id, &role.id)?;

        debug!("User logged in: {}", user.username);
        Ok(AuthResponse {
            user: user.to_info(&role.name),
            token,
            token_type: "Bearer".to_string(),
        })
    }
}

/// Hash a password using Argon2 with a fresh random salt
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))
}

/// One-way comparison of a plaintext password against a stored hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
