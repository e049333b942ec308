//! Request authentication
//!
//! Handlers take an [`Identity`] (any logged-in user) or an
//! [`AdminIdentity`] argument. Extraction reads the `auth-token` header,
//! rejects revoked tokens, verifies the signature and hands the decoded
//! identity to the handler.

use crate::audit::{audit_log, extract_ip_address, extract_user_agent, AuditEvent};
use crate::auth::jwt::verify_token;
use crate::error::AppError;
use crate::state::AppState;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use std::sync::Arc;
use thiserror::Error;
use thoughtlog_core::StoreError;
use uuid::Uuid;

/// Header carrying the token
pub const TOKEN_HEADER: &str = "auth-token";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No token provided")]
    MissingToken,

    #[error("Token has been revoked")]
    RevokedToken,

    #[error("Token failed verification")]
    InvalidToken,

    #[error("Admin privileges required")]
    NotAdmin,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Client-facing message
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingToken | AuthError::RevokedToken => "Access Denied.",
            AuthError::InvalidToken => "Invalid Token.",
            AuthError::NotAdmin => "Unauthorized access.",
            AuthError::Store(_) => crate::error::INTERNAL_ERROR,
        }
    }
}

/// Verified caller
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub admin: bool,
    /// Raw token, kept so it can be revoked
    pub token: String,
}

/// Caller verified as an admin
#[derive(Debug, Clone)]
pub struct AdminIdentity(pub Identity);

/// Resolve the caller from request headers
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Identity, AuthError> {
    let token = headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;

    if state.store.is_token_revoked(token).await? {
        return Err(AuthError::RevokedToken);
    }

    let claims = verify_token(&state.jwt, token).map_err(|_| AuthError::InvalidToken)?;
    let user_id = Uuid::parse_str(&claims.id).map_err(|_| AuthError::InvalidToken)?;

    Ok(Identity {
        user_id,
        admin: claims.admin,
        token: token.to_string(),
    })
}

/// Admin gate over an already verified identity
pub fn require_admin(identity: &Identity) -> Result<(), AuthError> {
    if identity.admin {
        Ok(())
    } else {
        Err(AuthError::NotAdmin)
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match authenticate(state, &parts.headers).await {
            Ok(identity) => Ok(identity),
            Err(AuthError::Store(e)) => Err(e.into()),
            Err(err) => {
                audit_log(&AuditEvent::InvalidToken {
                    reason: err.to_string(),
                    ip_address: extract_ip_address(&parts.headers),
                    user_agent: extract_user_agent(&parts.headers),
                });
                Err(err.into())
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let identity = Identity::from_request_parts(parts, state).await?;

        if let Err(err) = require_admin(&identity) {
            audit_log(&AuditEvent::AccessDenied {
                user_id: identity.user_id,
                resource: parts.uri.path().to_string(),
                ip_address: extract_ip_address(&parts.headers),
            });
            return Err(err.into());
        }

        Ok(AdminIdentity(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::issue_token;
    use axum::http::HeaderValue;
    use thoughtlog_core::AppConfig;
    use thoughtlog_store::MemoryStore;

    fn state() -> AppState {
        AppState::new(AppConfig::default(), Arc::new(MemoryStore::new())).unwrap()
    }

    fn headers_with(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, HeaderValue::from_str(token).unwrap());
        headers
    }

    #[test]
    fn test_require_admin() {
        let mut identity = Identity {
            user_id: Uuid::new_v4(),
            admin: false,
            token: "t".to_string(),
        };
        assert!(matches!(require_admin(&identity), Err(AuthError::NotAdmin)));

        identity.admin = true;
        assert!(require_admin(&identity).is_ok());
    }

    #[test]
    fn test_messages() {
        assert_eq!(AuthError::MissingToken.message(), "Access Denied.");
        assert_eq!(AuthError::RevokedToken.message(), "Access Denied.");
        assert_eq!(AuthError::InvalidToken.message(), "Invalid Token.");
        assert_eq!(AuthError::NotAdmin.message(), "Unauthorized access.");
    }

    #[tokio::test]
    async fn test_missing_header() {
        let state = state();
        let result = authenticate(&state, &HeaderMap::new()).await;
        assert!(matches!(result, Err(AuthError::MissingToken)));
    }

    #[tokio::test]
    async fn test_valid_token() {
        let state = state();
        let user_id = Uuid::new_v4();
        let token = issue_token(&state.jwt, user_id, true).unwrap();

        let identity = authenticate(&state, &headers_with(&token)).await.unwrap();
        assert_eq!(identity.user_id, user_id);
        assert!(identity.admin);
        assert_eq!(identity.token, token);
    }

    #[tokio::test]
    async fn test_revoked_token_checked_before_signature() {
        let state = state();
        state.store.revoke_token("garbage").await.unwrap();

        let result = authenticate(&state, &headers_with("garbage")).await;
        assert!(matches!(result, Err(AuthError::RevokedToken)));

        let result = authenticate(&state, &headers_with("other-garbage")).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }
}
