//! Token issuing and verification
//!
//! Tokens are HS256 JWTs carrying the user id and admin flag. They have no
//! expiry; a token stops working only when it is revoked.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use thoughtlog_core::AuthConfig;
use uuid::Uuid;

/// Claims embedded in every token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    #[serde(rename = "_id")]
    pub id: String,
    /// Admin flag at the time of login
    pub admin: bool,
    /// Issued at (Unix epoch)
    pub iat: u64,
    /// Unique token id, so two logins in the same second never share a token
    pub jti: String,
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode JWT: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid token")]
    InvalidToken,

    #[error("System time error: {0}")]
    SystemTimeError(#[from] std::time::SystemTimeError),
}

#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC secret
    pub secret: String,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig").field("secret", &"***").finish()
    }
}

impl From<&AuthConfig> for JwtConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            secret: config.token_secret.clone(),
        }
    }
}

/// Issue a token for `user_id`
pub fn issue_token(config: &JwtConfig, user_id: Uuid, admin: bool) -> Result<String, JwtError> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

    let claims = Claims {
        id: user_id.to_string(),
        admin,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify signature and payload shape, returning the claims
///
/// Revocation is checked separately against the store.
pub fn verify_token(config: &JwtConfig, token: &str) -> Result<Claims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map_err(|_| JwtError::InvalidToken)?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
        }
    }

    #[test]
    fn test_issue_and_verify_token() {
        let config = config("test-secret");
        let user_id = Uuid::new_v4();

        let token = issue_token(&config, user_id, true).unwrap();
        let claims = verify_token(&config, &token).unwrap();

        assert_eq!(claims.id, user_id.to_string());
        assert!(claims.admin);
    }

    #[test]
    fn test_tokens_are_unique() {
        let config = config("test-secret");
        let user_id = Uuid::new_v4();

        let first = issue_token(&config, user_id, false).unwrap();
        let second = issue_token(&config, user_id, false).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(&config("secret1"), Uuid::new_v4(), false).unwrap();
        let result = verify_token(&config("secret2"), &token);
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_garbage_rejected() {
        let result = verify_token(&config("test-secret"), "invalid.token.here");
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_claims_carry_no_expiry() {
        let config = config("test-secret");
        let token = issue_token(&config, Uuid::new_v4(), false).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        let raw = decode::<serde_json::Value>(
            &token,
            &DecodingKey::from_secret(config.secret.as_bytes()),
            &validation,
        )
        .unwrap();

        assert!(raw.claims.get("exp").is_none());
        assert!(raw.claims.get("_id").is_some());
    }

    #[test]
    fn test_debug_hides_secret() {
        let printed = format!("{:?}", config("super-secret"));
        assert!(!printed.contains("super-secret"));
    }
}
