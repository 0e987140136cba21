//! # kasir-service: Shared Service Layer
//!
//! Every business rule lives here once. The HTTP API and the terminal menus
//! both hold a [`Kasir`] and call its services with an explicit
//! [`Session`].
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   kasir-cli (menus)                kasir-api (axum)                     │
//! │        │                                  │                             │
//! │        └────────────────┬─────────────────┘                             │
//! │                         ▼                                               │
//! │  ┌───────────────────────────────────────────────────────────────────┐  │
//! │  │              ★ kasir-service (THIS CRATE) ★                       │  │
//! │  │                                                                   │  │
//! │  │   Kasir ──► auth()  products()  warehouses()  users()             │  │
//! │  │             transactions()  reports()                             │  │
//! │  │                                                                   │  │
//! │  │   KasirConfig  ──► Kasir::open(&config)                           │  │
//! │  └───────────────────────────────┬───────────────────────────────────┘  │
//! │                                  ▼                                      │
//! │                   kasir-db (Database, repositories)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use kasir_service::{Kasir, KasirConfig};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = KasirConfig::load(None)?;
//! let kasir = Kasir::open(&config).await?;
//!
//! let session = kasir.auth().authenticate("admin", "admin123").await?;
//! let report = kasir.reports().daily(&session, None).await?;
//! println!("{} sales today", report.summary.transaction_count);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod products;
pub mod reports;
pub mod session;
pub mod transactions;
pub mod users;
pub mod warehouses;

use std::sync::Arc;

use chrono::FixedOffset;
use tracing::{info, warn};

use kasir_db::Database;

pub use auth::{AuthService, Passwords};
pub use config::{init_tracing, ConfigError, KasirConfig};
pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use products::ProductService;
pub use reports::ReportService;
pub use session::Session;
pub use transactions::{Receipt, TransactionService};
pub use users::UserService;
pub use warehouses::WarehouseService;

/// Entry point to every service.
///
/// Cheap to clone: the database pool and hasher are shared.
#[derive(Debug, Clone)]
pub struct Kasir {
    db: Database,
    offset: FixedOffset,
    passwords: Arc<Passwords>,
}

impl Kasir {
    pub fn new(db: Database, offset: FixedOffset, passwords: Arc<Passwords>) -> Self {
        Kasir {
            db,
            offset,
            passwords,
        }
    }

    /// Opens the configured database, runs migrations and creates the
    /// bootstrap admin if the users table is empty.
    pub async fn open(config: &KasirConfig) -> anyhow::Result<Self> {
        let offset = config.offset()?;
        let db = Database::new(config.db_config()).await?;
        let kasir = Kasir::new(db, offset, Arc::new(Passwords::new()?));

        match (
            &config.bootstrap.admin_username,
            &config.bootstrap.admin_password,
        ) {
            (Some(username), Some(password)) => {
                if let Some(admin) = kasir.auth().ensure_bootstrap_admin(username, password).await? {
                    info!(username = %admin.username, "Created first admin account");
                }
            }
            _ => {
                if kasir.db.users().count().await? == 0 {
                    warn!(
                        "No users exist and no bootstrap admin is configured; \
                         set KASIR_ADMIN_USERNAME and KASIR_ADMIN_PASSWORD"
                    );
                }
            }
        }

        info!(utc_offset = %offset, "Kasir ready");
        Ok(kasir)
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.db.clone(), self.passwords.clone())
    }

    pub fn products(&self) -> ProductService {
        ProductService::new(self.db.clone())
    }

    pub fn warehouses(&self) -> WarehouseService {
        WarehouseService::new(self.db.clone())
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.db.clone(), self.passwords.clone())
    }

    pub fn transactions(&self) -> TransactionService {
        TransactionService::new(self.db.clone(), self.offset)
    }

    pub fn reports(&self) -> ReportService {
        ReportService::new(self.db.clone(), self.offset)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use kasir_core::{Money, NewProduct, Role, Warehouse, WarehouseInput};
    use kasir_db::DbConfig;

    /// In-memory Kasir with an `admin`/`admin123` account.
    pub async fn kasir_with_admin() -> (Kasir, Session) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let offset = FixedOffset::east_opt(7 * 3600).unwrap();
        let kasir = Kasir::new(db, offset, Arc::new(Passwords::low_cost().unwrap()));

        kasir
            .auth()
            .ensure_bootstrap_admin("admin", "admin123")
            .await
            .unwrap();
        let session = kasir.auth().authenticate("admin", "admin123").await.unwrap();
        (kasir, session)
    }

    /// A staff session that exists only in memory.
    pub fn staff_session(warehouse_id: Option<i64>) -> Session {
        Session {
            user_id: 999,
            username: "kasir1".to_string(),
            role: Role::Staff,
            warehouse_id,
        }
    }

    pub async fn new_warehouse(kasir: &Kasir, admin: &Session, name: &str) -> Warehouse {
        kasir
            .warehouses()
            .create(
                admin,
                WarehouseInput {
                    name: name.to_string(),
                    address: String::new(),
                },
            )
            .await
            .unwrap()
    }

    /// Sells at Rp 10.000, costs Rp 6.000.
    pub fn new_product(name: &str, warehouse_id: i64, stock: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            purchase_price: Money::from_rupiah(6_000),
            selling_price: Money::from_rupiah(10_000),
            stock,
            warehouse_id,
        }
    }
}
