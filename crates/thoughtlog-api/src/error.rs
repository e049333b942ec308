//! API error handling
//!
//! Every failure leaves the server as `{"message": "..."}` with one of the
//! statuses 400, 401, 403, 404, 409 or 500.

use crate::auth::{AuthError, JwtError, PasswordError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thoughtlog_core::StoreError;
use utoipa::ToSchema;

pub const EMAIL_EXISTS: &str = "Email already exists.";
pub const INVALID_CREDENTIALS: &str = "Invalid email or password.";
pub const USER_NOT_FOUND: &str = "User not found.";
pub const THOUGHT_NOT_FOUND: &str = "Thought not found.";
pub const THOUGHTS_NOT_FOUND: &str = "Thoughts not found.";
pub const INTERNAL_ERROR: &str = "Internal server error.";

/// Body of every error and acknowledgement response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    /// Human-readable message
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized(&'static str),
    Forbidden(&'static str),
    NotFound(&'static str),
    Conflict(&'static str),
    /// Detail is logged, never returned
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::BadRequest(msg) => msg,
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg.to_string(),
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                INTERNAL_ERROR.to_string()
            }
        };

        (status, Json(MessageResponse { message })).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(_) => AppError::Conflict(EMAIL_EXISTS),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Store(e) => e.into(),
            other => AppError::Unauthorized(other.message()),
        }
    }
}

impl From<JwtError> for AppError {
    fn from(err: JwtError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::Internal(err.to_string())
    }
}
