//! # Connection Pool
//!
//! One `SqlitePool` per process, shared by every repository.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  KasirConfig.database ──► DbConfig ──► Database::new                    │
//! │                                            │                            │
//! │                     ┌──────────────────────┼────────────────────┐       │
//! │                     ▼                      ▼                    ▼       │
//! │              create parent dir     open pool (WAL,      run migrations  │
//! │              for the .db file      busy_timeout, FKs)   (optional)      │
//! │                                                                         │
//! │  API: each request borrows a connection for its queries.                │
//! │  CLI: one operator, so the pool rarely holds more than one.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! WAL lets report reads run while a sale is being written. Concurrent
//! writers queue on SQLite's lock for up to `busy_timeout` instead of failing
//! straight away with `SQLITE_BUSY`.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::product::ProductRepository;
use crate::repository::transaction::TransactionRepository;
use crate::repository::user::UserRepository;
use crate::repository::warehouse::WarehouseRepository;

/// Where the data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    /// Private in-memory database, gone when the pool closes.
    Memory,
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub location: DbLocation,
    pub max_connections: u32,
    /// How long `acquire` waits for a free connection.
    pub acquire_timeout: Duration,
    /// How long a write waits on SQLite's lock.
    pub busy_timeout: Duration,
    pub run_migrations: bool,
}

impl DbConfig {
    /// A file-backed database. The file and its directory are created on
    /// first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            location: DbLocation::File(path.into()),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// A fresh in-memory database for tests.
    ///
    /// Limited to one connection: every new SQLite connection to `:memory:`
    /// would see its own empty database.
    pub fn in_memory() -> Self {
        DbConfig {
            location: DbLocation::Memory,
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let base = match &self.location {
            DbLocation::File(path) => {
                ensure_parent_dir(path)?;
                SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
            }
            DbLocation::Memory => SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
                .journal_mode(SqliteJournalMode::Memory),
        };

        Ok(base
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(self.busy_timeout))
    }
}

fn ensure_parent_dir(path: &Path) -> DbResult<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir)
            .map_err(|e| DbError::ConnectionFailed(format!("{}: {}", dir.display(), e))),
        _ => Ok(()),
    }
}

/// Handle to the pool. Clones share it.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(location = ?config.location, "Opening database");

        let mut options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout);
        if config.location == DbLocation::Memory {
            // The database vanishes with its last connection.
            options = options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = options
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
        debug!(max_connections = config.max_connections, "Pool ready");

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }
        Ok(db)
    }

    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn warehouses(&self) -> WarehouseRepository {
        WarehouseRepository::new(self.pool.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn transactions(&self) -> TransactionRepository {
        TransactionRepository::new(self.pool.clone())
    }

    /// Waits for in-flight queries, then closes every connection. Later
    /// queries fail with `ConnectionFailed`.
    pub async fn close(&self) {
        info!("Closing database");
        self.pool.close().await;
    }

    /// True when a trivial query succeeds.
    pub async fn health_check(&self) -> bool {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }
}
