//! Thoughtlog stores
//!
//! Implementations of [`JournalStore`]:
//! - [`PgStore`]: PostgreSQL via SQLx, reasons embedded as JSONB
//! - [`MemoryStore`]: in-process maps, for tests and local development

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use std::sync::Arc;
use thoughtlog_core::{DatabaseConfig, JournalStore, StoreBackend, StoreResult};

/// Open the configured store and prepare its schema
pub async fn connect(config: &DatabaseConfig) -> StoreResult<Arc<dyn JournalStore>> {
    match config.backend {
        StoreBackend::Postgres => {
            let store = PgStore::connect(&config.url, config.max_connections).await?;
            store.migrate().await?;
            tracing::info!(max_connections = config.max_connections, "Connected to PostgreSQL");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
