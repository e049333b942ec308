//! Thoughtlog API Server

use anyhow::Context;
use std::sync::Arc;
use thoughtlog_api::{create_router, state::AppState};
use thoughtlog_core::{AppConfig, LoggingConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenv::dotenv();

    let config = AppConfig::from_env().context("invalid configuration")?;
    init_tracing(&config.logging);

    if config.uses_dev_secret() {
        tracing::warn!("TOKEN_SECRET not set; using the development secret");
    }

    let store = thoughtlog_store::connect(&config.database)
        .await
        .context("failed to open journal store")?;
    tracing::info!(backend = store.name(), "Journal store ready");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, store.clone())?);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Thoughtlog API listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "thoughtlog_api={level},thoughtlog_store={level},tower_http=info",
            level = logging.level
        )
        .into()
    });

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
