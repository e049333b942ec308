//! Request handlers

pub mod auth;
pub mod health;
pub mod profiles;
pub mod thoughts;
pub mod users;

use crate::error::AppError;
use uuid::Uuid;

/// Parse a path id; anything that is not a UUID cannot name a document
pub(crate) fn parse_id(raw: &str, not_found: &'static str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(not_found))
}
