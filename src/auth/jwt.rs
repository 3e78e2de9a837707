//! Token codec: stateless signing and verification of bearer tokens
//!
//! Verification is stateless by design; the trade-off is that a token
//! cannot be revoked mid-lifetime.

use crate::error::ApiError;
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Claims embedded in an issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id
    pub sub: String,
    /// Role id bound at issuance; re-resolved from the store per request
    pub role: String,
    /// Issued at (unix timestamp)
    pub iat: i64,
    /// Expiration (unix timestamp)
    pub exp: i64,
}

/// Token verification failures
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,
    #[error("Invalid token signature")]
    InvalidSignature,
    #[error("Token has expired")]
    Expired,
    #[error("Token creation failed")]
    Creation,
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Creation => ApiError::Internal("Token creation failed".to_string()),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

/// Signs and verifies bearer tokens with an HMAC secret from configuration
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiration is exact; no clock leeway.
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::seconds(ttl_secs),
            validation,
        }
    }

    /// Issue a signed token for the given user and role identities
    pub fn issue(&self, user_id: &str, role_id: &str) -> Result<String, TokenError> {
        self.issue_with_ttl(user_id, role_id, self.ttl)
    }

    /// Issue a token with an explicit lifetime
    pub fn issue_with_ttl(
        &self,
        user_id: &str,
        role_id: &str,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role: role_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|e| {
            debug!("Failed to encode token: {}", e);
            TokenError::Creation
        })
    }

    /// Verify a token and return its claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Token verification failed: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                    _ => TokenError::Malformed,
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(b"test-secret", 3600)
    }

    #[test]
    fn issue_and_verify_roundtrip() {
        let codec = codec();
        let token = codec.issue("user-1", "role-1").unwrap();

        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.role, "role-1");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_fails_with_expired() {
        let codec = codec();
        let token = codec
            .issue_with_ttl("user-1", "role-1", Duration::seconds(-1))
            .unwrap();

        assert_eq!(codec.verify(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn token_valid_just_before_expiry() {
        let codec = codec();
        let token = codec
            .issue_with_ttl("user-1", "role-1", Duration::seconds(5))
            .unwrap();

        assert!(codec.verify(&token).is_ok());
    }

    #[test]
    fn wrong_secret_fails_with_invalid_signature() {
        let token = codec().issue("user-1", "role-1").unwrap();
        let other = TokenCodec::new(b"other-secret", 3600);

        assert_eq!(
            other.verify(&token).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn garbage_fails_with_malformed() {
        let codec = codec();
        assert_eq!(
            codec.verify("not-a-token").unwrap_err(),
            TokenError::Malformed
        );
    }
}
