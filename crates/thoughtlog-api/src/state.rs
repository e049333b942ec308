//! Application state shared across handlers

use crate::auth::{JwtConfig, PasswordConfig};
use crate::middleware::Metrics;
use std::sync::Arc;
use std::time::Instant;
use thoughtlog_core::{AppConfig, JournalStore};

pub struct AppState {
    pub config: AppConfig,
    /// Journal store, opened at startup and closed on shutdown
    pub store: Arc<dyn JournalStore>,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
    pub metrics: Metrics,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn JournalStore>) -> Result<Self, prometheus::Error> {
        Ok(Self {
            jwt: JwtConfig::from(&config.auth),
            password: PasswordConfig::from(&config.auth),
            metrics: Metrics::new()?,
            start_time: Instant::now(),
            config,
            store,
        })
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
