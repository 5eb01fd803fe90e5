// ============================
// crates/backend-bin/src/main.rs
// ============================
//! Tokio / Axum entry-point for the account server.
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use accountd_backend::{
    config::Settings,
    create_router,
    storage::{AccountStore, FlatFileStorage, MemoryStorage},
    AppState,
};
use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// User-account REST service
#[derive(Debug, Parser)]
#[command(name = "accountd", version, about)]
struct Cli {
    /// Config file (defaults to ./accountd.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind address
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Override the data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Keep accounts in memory only; nothing is written to disk
    #[arg(long)]
    ephemeral: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    if let Some(bind) = cli.bind {
        settings.bind_addr = bind;
    }
    if let Some(dir) = &cli.data_dir {
        settings.data_dir = dir.clone();
    }
    settings.validate()?;

    init_tracing(&settings.log_level, cli.json_logs);

    if cli.ephemeral {
        tracing::warn!("running with an in-memory store; accounts are lost on exit");
        serve(MemoryStorage::new(), settings).await
    } else {
        let storage = FlatFileStorage::new(&settings.data_dir).with_context(|| {
            format!("failed to open store in {}", settings.data_dir.display())
        })?;
        serve(storage, settings).await
    }
}

fn init_tracing(default_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{default_level},tower_http=debug"))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn serve<S: AccountStore>(storage: S, settings: Settings) -> anyhow::Result<()> {
    let addr = settings.bind_addr;
    let state = Arc::new(AppState::new(storage, &settings)?);
    let app = create_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
