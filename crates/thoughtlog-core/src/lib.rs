//! Thoughtlog Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout Thoughtlog:
//! - Journal models (users, thoughts, reasons)
//! - Public projections of those models
//! - Store error types
//! - The `JournalStore` trait implemented by persistence backends
//! - Configuration management

pub mod config;
pub mod models;

pub use config::{
    AppConfig, AuthConfig, ConfigError, DatabaseConfig, LoggingConfig, ServerConfig, StoreBackend,
};
pub use models::{
    NewReason, NewThought, NewUser, PublicProfile, Reason, Thought, ThoughtUpdate, User,
    UserProfile, UserSummary,
};

use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised by journal store implementations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Email already exists: {0}")]
    DuplicateEmail(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

// ============================================================================
// Traits
// ============================================================================

/// Persistence operations behind the HTTP handlers
///
/// Lookups that can miss return `Ok(None)` (or `false`) rather than an
/// error, so callers can tell "not found" apart from a store failure.
/// Thought operations are always scoped to the owning user.
#[async_trait::async_trait]
pub trait JournalStore: Send + Sync {
    /// Check that the backend is reachable
    async fn ping(&self) -> StoreResult<()>;

    /// Backend name for logging
    fn name(&self) -> &str;

    /// Release connections; the store must not be used afterwards
    async fn close(&self) {}

    // ---- users ----

    /// Insert a user; fails with `DuplicateEmail` if the email is taken
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Delete a user, returning the removed record
    async fn delete_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn update_user_name(&self, id: Uuid, name: &str) -> StoreResult<Option<User>>;

    async fn update_user_password(&self, id: Uuid, password_hash: &str)
        -> StoreResult<Option<User>>;

    /// Change a user's email; fails with `DuplicateEmail` on collision
    async fn update_user_email(&self, id: Uuid, email: &str) -> StoreResult<Option<User>>;

    async fn set_user_admin(&self, id: Uuid, admin: bool) -> StoreResult<Option<User>>;

    // ---- thoughts ----

    async fn create_thought(&self, thought: NewThought) -> StoreResult<Thought>;

    /// All thoughts owned by `user_id`, oldest first
    async fn list_thoughts(&self, user_id: Uuid) -> StoreResult<Vec<Thought>>;

    async fn find_thought(&self, user_id: Uuid, thought_id: Uuid) -> StoreResult<Option<Thought>>;

    async fn update_thought(
        &self,
        user_id: Uuid,
        thought_id: Uuid,
        update: ThoughtUpdate,
    ) -> StoreResult<Option<Thought>>;

    async fn delete_thought(&self, user_id: Uuid, thought_id: Uuid)
        -> StoreResult<Option<Thought>>;

    /// Delete every thought owned by `user_id`, returning how many were removed
    async fn delete_thoughts_for_user(&self, user_id: Uuid) -> StoreResult<u64>;

    /// Append a reason; `None` when the thought does not exist for this user
    async fn add_reason(
        &self,
        user_id: Uuid,
        thought_id: Uuid,
        reason: NewReason,
    ) -> StoreResult<Option<Reason>>;

    /// Remove one reason; returns whether the owning thought matched
    async fn remove_reason(
        &self,
        user_id: Uuid,
        thought_id: Uuid,
        reason_id: Uuid,
    ) -> StoreResult<bool>;

    /// Remove all reasons; returns whether the owning thought matched
    async fn clear_reasons(&self, user_id: Uuid, thought_id: Uuid) -> StoreResult<bool>;

    // ---- revoked tokens ----

    /// Add a raw token string to the deny-list (idempotent)
    async fn revoke_token(&self, token: &str) -> StoreResult<()>;

    async fn is_token_revoked(&self, token: &str) -> StoreResult<bool>;

    async fn count_revoked_tokens(&self) -> StoreResult<u64>;
}

// ============================================================================
// Tests
// ============================================================================
