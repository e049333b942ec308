//! Security audit logging
//!
//! Account and token events are logged at INFO level under the `audit`
//! target so they can be filtered and routed apart from request logs.
//!
//! ```ignore
//! use thoughtlog_api::audit::{audit_log, AuditEvent};
//!
//! audit_log(&AuditEvent::LoginSuccess {
//!     user_id: user.id,
//!     email: user.email.clone(),
//!     ip_address: extract_ip_address(&headers),
//!     user_agent: extract_user_agent(&headers),
//! });
//! ```

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Security-relevant account events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    RegistrationSuccess {
        user_id: Uuid,
        email: String,
        ip_address: Option<String>,
    },

    RegistrationFailure {
        email: String,
        reason: String,
        ip_address: Option<String>,
    },

    LoginSuccess {
        user_id: Uuid,
        email: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    LoginFailure {
        email: String,
        reason: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Password changed; the presenting token has been revoked
    PasswordChange {
        user_id: Uuid,
        ip_address: Option<String>,
    },

    /// Email changed; the presenting token has been revoked
    EmailChange {
        user_id: Uuid,
        new_email: String,
        ip_address: Option<String>,
    },

    /// Token missing, revoked, or failing verification
    InvalidToken {
        reason: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Non-admin on an admin-only route
    AccessDenied {
        user_id: Uuid,
        resource: String,
        ip_address: Option<String>,
    },

    UserDeleted {
        user_id: Uuid,
        deleted_by: Uuid,
    },
}

impl AuditEvent {
    fn summary(&self) -> &'static str {
        match self {
            AuditEvent::RegistrationSuccess { .. } => "Registration successful",
            AuditEvent::RegistrationFailure { .. } => "Registration failed",
            AuditEvent::LoginSuccess { .. } => "Login successful",
            AuditEvent::LoginFailure { .. } => "Login failed",
            AuditEvent::PasswordChange { .. } => "Password changed",
            AuditEvent::EmailChange { .. } => "Email changed",
            AuditEvent::InvalidToken { .. } => "Token rejected",
            AuditEvent::AccessDenied { .. } => "Access denied",
            AuditEvent::UserDeleted { .. } => "User deleted",
        }
    }

    fn user_id(&self) -> Option<Uuid> {
        match self {
            AuditEvent::RegistrationSuccess { user_id, .. }
            | AuditEvent::LoginSuccess { user_id, .. }
            | AuditEvent::PasswordChange { user_id, .. }
            | AuditEvent::EmailChange { user_id, .. }
            | AuditEvent::AccessDenied { user_id, .. }
            | AuditEvent::UserDeleted { user_id, .. } => Some(*user_id),
            AuditEvent::RegistrationFailure { .. }
            | AuditEvent::LoginFailure { .. }
            | AuditEvent::InvalidToken { .. } => None,
        }
    }
}

/// Log an audit event with the full event as a JSON field
pub fn audit_log(event: &AuditEvent) {
    let event_json = serde_json::to_string(event)
        .unwrap_or_else(|e| format!("{{\"error\":\"Failed to serialize audit event: {e}\"}}"));

    info!(
        target: "audit",
        event = %event_json,
        user_id = ?event.user_id(),
        "{}",
        event.summary()
    );
}

/// Client IP from proxy headers
///
/// Checks X-Forwarded-For (first hop) then X-Real-IP.
pub fn extract_ip_address(headers: &axum::http::HeaderMap) -> Option<String> {
    if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first_ip) = xff.split(',').next() {
            return Some(first_ip.trim().to_string());
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

pub fn extract_user_agent(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|ua| ua.to_str().ok())
        .map(|s| s.to_string())
}
