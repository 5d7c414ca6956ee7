use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use forum_api::auth::PasswordHasher;
use forum_api::config::{self, AppConfig};
use forum_api::database::{seed, DatabaseManager, ForumStore, MemoryStore, PgStore};
use forum_api::{is_production, router, AppState};

#[derive(Parser)]
#[command(name = "forum-api")]
#[command(about = "Forum HTTP API server")]
#[command(version)]
struct Args {
    /// Serve from a process-local store instead of Postgres. Data is lost on exit.
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, PORT, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "forum_api=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = config::config();
    info!("Starting forum API in {:?} mode", config.environment);

    let store = open_store(config, args.in_memory).await?;

    if config.seed_default_topics {
        let added = seed::seed_default_topics(store.as_ref())
            .await
            .context("failed to seed default topics")?;
        info!(added, "Default topics seeded");
    }

    let passwords = PasswordHasher::new(config.security.bcrypt_cost).context("invalid bcrypt cost")?;
    let app = router(AppState::new(store, passwords), config);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Forum API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn open_store(config: &AppConfig, in_memory: bool) -> anyhow::Result<Arc<dyn ForumStore>> {
    if in_memory {
        if is_production!() {
            warn!("In-memory store selected in production; nothing will be persisted");
        }
        info!("Using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::migrate(&pool).await?;
    Ok(Arc::new(PgStore::new(pool)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting graceful shutdown"),
        _ = terminate => info!("Received terminate signal, starting graceful shutdown"),
    }
}
