//! # Kasir Terminal
//!
//! ```text
//! kasir --config kasir.toml
//! kasir --db ./kasir.db --log-level info
//! ```
//!
//! Logs go to stderr at `warn` unless `--log-level` or `RUST_LOG` says
//! otherwise, so the menus on stdout stay readable.

mod app;
mod console;
mod menus;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use kasir_service::{init_tracing, Kasir, KasirConfig};

use crate::app::App;
use crate::console::{Console, InputClosed};

#[derive(Debug, Parser)]
#[command(name = "kasir", about = "Kasir point-of-sale terminal")]
struct Args {
    /// Config file path
    #[arg(long, env = "KASIR_CONFIG")]
    config: Option<PathBuf>,

    /// Database file (overrides config)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = KasirConfig::load(args.config).context("loading configuration")?;
    if let Some(db) = args.db {
        config.database.path = db;
    }

    init_tracing(&args.log_level);

    let kasir = Kasir::open(&config).await.context("opening database")?;
    let mut app = App::new(
        kasir.clone(),
        Console::stdio(),
        config.business.receipts_dir.clone(),
        config.business.exports_dir.clone(),
    );

    let result = app.run().await;
    kasir.db().close().await;

    match result {
        Err(e) if e.downcast_ref::<InputClosed>().is_some() => {
            info!("Input closed, exiting");
            Ok(())
        }
        other => other,
    }
}
