//! # kasir-db
//!
//! SQLite storage for warehouses, products, users and posted transactions.
//! Everything above this crate talks to the database through the four
//! repositories handed out by [`Database`].
//!
//! ```text
//! kasir-service
//!      │  db.products() / db.transactions() / ...
//!      ▼
//! Database ── SqlitePool (WAL, foreign keys on)
//!      │
//!      ├── WarehouseRepository    warehouses + usage check before delete
//!      ├── ProductRepository      paging, search, stock summary, import
//!      ├── UserRepository         accounts and password hashes
//!      └── TransactionRepository  atomic post with guarded stock decrement
//!
//! migrations/sqlite/*.sql  embedded at compile time, applied on open
//! ```
//!
//! Rows come back as `kasir_core` types, so nothing outside this crate
//! depends on sqlx.
//!
//! ```rust,ignore
//! use kasir_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("data/kasir.db")).await?;
//! let products = db.products().list_all(None).await?;
//! db.close().await;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use migrations::MigrationStatus;
pub use pool::{Database, DbConfig, DbLocation};

pub use repository::product::ProductRepository;
pub use repository::transaction::{NewTransaction, TransactionRepository};
pub use repository::user::{NewUserRow, UserCredentials, UserRepository};
pub use repository::warehouse::WarehouseRepository;
