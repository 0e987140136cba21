//! # Warehouse Repository
//!
//! Database operations for warehouses.
//!
//! ## Delete Guard
//! Products and users point at warehouses without a foreign key. The DELETE
//! itself carries the "nothing references it" condition, so a product
//! inserted concurrently can never be left pointing at a removed warehouse.
//!
//! ```text
//! DELETE ... WHERE id = ?1 AND NOT EXISTS (products) AND NOT EXISTS (users)
//!      │
//!      ├── 1 row  ──► Ok(None)
//!      └── 0 rows ──► no such id?  NotFound
//!                     otherwise    Ok(Some(usage))  (what blocked it)
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use kasir_core::{Warehouse, WarehouseInput, WarehouseUsage};

/// Repository for warehouse database operations.
#[derive(Debug, Clone)]
pub struct WarehouseRepository {
    pool: SqlitePool,
}

impl WarehouseRepository {
    /// Creates a new WarehouseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        WarehouseRepository { pool }
    }

    /// Lists all warehouses ordered by id.
    pub async fn list(&self) -> DbResult<Vec<Warehouse>> {
        let warehouses = sqlx::query_as::<_, Warehouse>(
            "SELECT id, name, address, created_at FROM warehouses ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(warehouses)
    }

    /// Gets a warehouse by ID.
    pub async fn get(&self, id: i64) -> DbResult<Option<Warehouse>> {
        let warehouse = sqlx::query_as::<_, Warehouse>(
            "SELECT id, name, address, created_at FROM warehouses WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(warehouse)
    }

    /// Inserts a warehouse and returns it with its assigned id.
    pub async fn insert(&self, input: &WarehouseInput) -> DbResult<Warehouse> {
        let now = Utc::now();
        debug!(name = %input.name, "Inserting warehouse");

        let result = sqlx::query(
            "INSERT INTO warehouses (name, address, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(&input.name)
        .bind(&input.address)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Warehouse {
            id: result.last_insert_rowid(),
            name: input.name.clone(),
            address: input.address.clone(),
            created_at: now,
        })
    }

    /// Updates name and address.
    pub async fn update(&self, id: i64, input: &WarehouseInput) -> DbResult<()> {
        debug!(id, name = %input.name, "Updating warehouse");

        let result = sqlx::query("UPDATE warehouses SET name = ?2, address = ?3 WHERE id = ?1")
            .bind(id)
            .bind(&input.name)
            .bind(&input.address)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Warehouse", id));
        }

        Ok(())
    }

    /// Reports which users and how many products reference the warehouse.
    pub async fn usage(&self, id: i64) -> DbResult<WarehouseUsage> {
        let usernames: Vec<String> = sqlx::query_scalar(
            "SELECT username FROM users WHERE warehouse_id = ?1 ORDER BY username",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let product_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE warehouse_id = ?1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(WarehouseUsage {
            usernames,
            product_count,
        })
    }

    /// Deletes the warehouse if no product or user references it.
    ///
    /// Returns `Some(usage)` when references blocked the delete; nothing is
    /// changed then.
    pub async fn delete(&self, id: i64) -> DbResult<Option<WarehouseUsage>> {
        debug!(id, "Deleting warehouse");

        let result = sqlx::query(
            r#"
            DELETE FROM warehouses
            WHERE id = ?1
              AND NOT EXISTS (SELECT 1 FROM products WHERE warehouse_id = ?1)
              AND NOT EXISTS (SELECT 1 FROM users WHERE warehouse_id = ?1)
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(None);
        }
        if self.get(id).await?.is_none() {
            return Err(DbError::not_found("Warehouse", id));
        }
        Ok(Some(self.usage(id).await?))
    }

    /// Counts warehouses.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM warehouses")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use kasir_core::{Money, NewProduct, WarehouseInput};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn input(name: &str) -> WarehouseInput {
        WarehouseInput {
            name: name.to_string(),
            address: "Jl. Pasar Baru 1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_get_update() {
        let db = db().await;
        let repo = db.warehouses();

        let created = repo.insert(&input("Gudang Utama")).await.unwrap();
        assert!(created.id > 0);

        repo.update(created.id, &input("Gudang Pusat")).await.unwrap();
        let fetched = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Gudang Pusat");
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let db = db().await;
        let err = db.warehouses().update(99, &input("X")).await.unwrap_err();
        assert!(matches!(err, crate::DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_usage_reports_products() {
        let db = db().await;
        let w = db.warehouses().insert(&input("Gudang A")).await.unwrap();

        assert!(!db.warehouses().usage(w.id).await.unwrap().is_blocking());

        db.products()
            .insert(&NewProduct {
                name: "Sabun".to_string(),
                purchase_price: Money::from_rupiah(2_000),
                selling_price: Money::from_rupiah(3_000),
                stock: 4,
                warehouse_id: w.id,
            })
            .await
            .unwrap();

        let usage = db.warehouses().usage(w.id).await.unwrap();
        assert_eq!(usage.product_count, 1);
        assert!(usage.is_blocking());
    }

    #[tokio::test]
    async fn test_delete() {
        let db = db().await;
        let w = db.warehouses().insert(&input("Gudang B")).await.unwrap();

        assert_eq!(db.warehouses().delete(w.id).await.unwrap(), None);
        assert!(db.warehouses().get(w.id).await.unwrap().is_none());
        assert!(matches!(
            db.warehouses().delete(w.id).await,
            Err(crate::DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_refuses_referenced_warehouse() {
        let db = db().await;
        let w = db.warehouses().insert(&input("Gudang C")).await.unwrap();
        db.products()
            .insert(&NewProduct {
                name: "Gula".to_string(),
                purchase_price: Money::from_rupiah(12_000),
                selling_price: Money::from_rupiah(15_000),
                stock: 2,
                warehouse_id: w.id,
            })
            .await
            .unwrap();

        let blocked = db.warehouses().delete(w.id).await.unwrap();
        assert_eq!(blocked.map(|u| u.product_count), Some(1));
        assert!(db.warehouses().get(w.id).await.unwrap().is_some());
    }
}
