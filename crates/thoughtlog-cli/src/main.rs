//! Thoughtlog CLI - operator commands
//!
//! Usage:
//!   thoughtlog migrate
//!   thoughtlog admin grant <email>
//!   thoughtlog admin revoke <email>
//!   thoughtlog users
//!   thoughtlog revoked-count

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use thoughtlog_core::{AppConfig, JournalStore, StoreBackend};
use thoughtlog_store::PgStore;

#[derive(Parser)]
#[command(name = "thoughtlog")]
#[command(about = "Thoughtlog operator CLI")]
#[command(version)]
struct Cli {
    /// Store connection string (overrides DB_CONNECT)
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema if it does not exist
    Migrate,
    /// Grant or revoke the admin flag
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// List registered users
    Users,
    /// Number of revoked tokens
    RevokedCount,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Make a user an admin
    Grant { email: String },
    /// Remove a user's admin flag
    Revoke { email: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }

    match cli.command {
        Commands::Migrate => {
            if config.database.backend != StoreBackend::Postgres {
                bail!("migrate only applies to the postgres backend");
            }
            let store = PgStore::connect(&config.database.url, 1).await?;
            store.migrate().await?;
            store.close().await;
            println!("Schema is up to date");
        }
        Commands::Admin { action } => {
            let store = thoughtlog_store::connect(&config.database).await?;
            let (email, admin) = match action {
                AdminAction::Grant { email } => (email, true),
                AdminAction::Revoke { email } => (email, false),
            };
            let result = set_admin(&store, &email, admin).await;
            store.close().await;
            result?;

            let verb = if admin { "granted to" } else { "revoked from" };
            println!("Admin {verb} {email}; existing tokens keep their old flag until re-login");
        }
        Commands::Users => {
            let store = thoughtlog_store::connect(&config.database).await?;
            let users = store.list_users().await;
            store.close().await;
            let users = users?;

            if cli.json {
                let summaries: Vec<_> = users.iter().map(|u| u.to_summary()).collect();
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                for user in &users {
                    let marker = if user.admin { " [admin]" } else { "" };
                    println!("{}  {:<30} {}{}", user.id, user.email, user.name, marker);
                }
                println!("{} user(s)", users.len());
            }
        }
        Commands::RevokedCount => {
            let store = thoughtlog_store::connect(&config.database).await?;
            let count = store.count_revoked_tokens().await;
            store.close().await;
            let count = count?;

            if cli.json {
                println!("{}", serde_json::json!({ "revoked_tokens": count }));
            } else {
                println!("{count} revoked token(s)");
            }
        }
    }

    Ok(())
}

async fn set_admin(store: &Arc<dyn JournalStore>, email: &str, admin: bool) -> anyhow::Result<()> {
    let Some(user) = store.find_user_by_email(email).await? else {
        bail!("no user with email {email}");
    };

    store
        .set_user_admin(user.id, admin)
        .await?
        .context("user disappeared while updating")?;

    tracing::info!(user_id = %user.id, admin, "Updated admin flag");
    Ok(())
}
