//! # Schema Migrations
//!
//! The SQL files under `migrations/sqlite/` are compiled into the binary and
//! applied when a `Database` opens. sqlx records each one with its checksum
//! in `_sqlx_migrations`, so reopening an up-to-date file is a no-op.
//!
//! ```text
//! migrations/sqlite/
//! ├── 0001_initial_schema.sql        warehouses, products, users,
//! │                                   transactions, transaction_items
//! └── 0002_product_name_folded.sql   Unicode-lowercased name for search
//! ```
//!
//! New schema changes go in a new `NNNN_description.sql`. Applied files are
//! never edited; sqlx refuses to start when a checksum changes.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Tables the application expects after migrating.
pub const TABLES: &[&str] = &[
    "warehouses",
    "products",
    "users",
    "transactions",
    "transaction_items",
];

/// Embedded versus applied migrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationStatus {
    pub embedded: usize,
    pub applied: usize,
    /// Highest applied version, if any.
    pub latest: Option<i64>,
}

impl MigrationStatus {
    pub fn is_current(&self) -> bool {
        self.applied >= self.embedded
    }
}

/// Applies every pending migration in version order.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    let before = migration_status(pool).await?;
    debug!(
        embedded = before.embedded,
        applied = before.applied,
        "Checking schema"
    );

    MIGRATOR.run(pool).await?;

    if !before.is_current() {
        info!(
            pending = before.embedded - before.applied,
            "Schema migrations applied"
        );
    }
    Ok(())
}

/// Reads `_sqlx_migrations`. A database that was never migrated reports zero
/// applied.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<MigrationStatus> {
    let row: Option<(i64, Option<i64>)> = sqlx::query_as(
        "SELECT COUNT(*), MAX(version) FROM _sqlx_migrations WHERE success = 1",
    )
    .fetch_optional(pool)
    .await
    .unwrap_or(None);

    let (applied, latest) = row.unwrap_or((0, None));
    Ok(MigrationStatus {
        embedded: MIGRATOR.migrations.len(),
        applied: usize::try_from(applied).unwrap_or(0),
        latest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_schema_is_current_after_open() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let status = migration_status(db.pool()).await.unwrap();
        assert!(status.is_current());
        assert_eq!(status.latest, Some(2));

        for table in TABLES {
            let found: Option<(String,)> =
                sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
                    .bind(table)
                    .fetch_optional(db.pool())
                    .await
                    .unwrap();
            assert!(found.is_some(), "missing table {table}");
        }
    }

    #[tokio::test]
    async fn test_running_twice_is_harmless() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        run_migrations(db.pool()).await.unwrap();
        assert!(migration_status(db.pool()).await.unwrap().is_current());
    }

    #[tokio::test]
    async fn test_unmigrated_database_reports_zero() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();
        let status = migration_status(db.pool()).await.unwrap();
        assert_eq!(status.applied, 0);
        assert!(!status.is_current());
    }
}
