//! # Kasir API Server
//!
//! ```text
//! kasir-api --config kasir.toml --port 9000
//! ```
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. KasirConfig::load (file → .env → KASIR_* env) then CLI flags       │
//! │  2. tracing subscriber (RUST_LOG or logging.level)                     │
//! │  3. Kasir::open: SQLite pool, migrations, bootstrap admin              │
//! │  4. axum::serve until Ctrl+C / SIGTERM                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};

use kasir_api::{router, AppState};
use kasir_service::{init_tracing, Kasir, KasirConfig};

#[derive(Debug, Parser)]
#[command(name = "kasir-api", about = "Kasir HTTP/JSON API server")]
struct Args {
    /// Config file path
    #[arg(long, env = "KASIR_CONFIG")]
    config: Option<PathBuf>,

    /// Database file (overrides config)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Bind host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides config)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = KasirConfig::load(args.config).context("loading configuration")?;
    if let Some(db) = args.db {
        config.database.path = db;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    init_tracing(&config.logging.level);
    info!("Starting Kasir API server...");

    let kasir = Kasir::open(&config).await.context("opening database")?;
    let app = router(AppState::new(kasir.clone()));

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    kasir.db().close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(%e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(%e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
