//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Paged listing with name search and warehouse filter
//! - CRUD operations
//! - Per-warehouse stock summary
//! - Bulk import in one transaction
//!
//! ## Paged Listing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  list_page(search, warehouse, offset, limit)                            │
//! │  count(search, warehouse)                                               │
//! │                                                                         │
//! │  Both build their WHERE clause from the same `filter_clause()`, so     │
//! │  total_items always describes exactly the rows the pages walk over.    │
//! │                                                                         │
//! │  WHERE (?1 IS NULL OR name_folded LIKE ?1 ESCAPE '\')                  │
//! │    AND (?2 IS NULL OR warehouse_id = ?2)                               │
//! │  ORDER BY id                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use kasir_core::{ImportOutcome, NewProduct, Product, ProductRecord, ProductUpdate, WarehouseStock};

const PRODUCT_COLUMNS: &str =
    "id, name, purchase_price, selling_price, stock, warehouse_id, created_at";

/// Shared filter for `list_page` and `count`.
const FILTER_CLAUSE: &str = "(?1 IS NULL OR name_folded LIKE ?1 ESCAPE '\\') \
     AND (?2 IS NULL OR warehouse_id = ?2)";

/// Search key stored in `name_folded`. Search terms are folded the same
/// way, so matching is case-insensitive beyond ASCII.
fn fold(name: &str) -> String {
    name.to_lowercase()
}

/// Turns a search term into a case-insensitive substring LIKE pattern.
fn like_pattern(search: Option<&str>) -> Option<String> {
    search.map(|s| {
        let escaped = fold(s)
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{}%", escaped)
    })
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let rows = repo.list_page(Some("kopi"), Some(1), 0, 10).await?;
/// let total = repo.count(Some("kopi"), Some(1)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// One page of products matching the filter, ordered by id.
    pub async fn list_page(
        &self,
        search: Option<&str>,
        warehouse_id: Option<i64>,
        offset: i64,
        limit: i64,
    ) -> DbResult<Vec<Product>> {
        debug!(?search, ?warehouse_id, offset, limit, "Listing products");

        let sql = format!(
            "SELECT {} FROM products WHERE {} ORDER BY id LIMIT ?3 OFFSET ?4",
            PRODUCT_COLUMNS, FILTER_CLAUSE
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(like_pattern(search))
            .bind(warehouse_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Number of products matching the filter.
    pub async fn count(&self, search: Option<&str>, warehouse_id: Option<i64>) -> DbResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM products WHERE {}", FILTER_CLAUSE);

        let count: i64 = sqlx::query_scalar(&sql)
            .bind(like_pattern(search))
            .bind(warehouse_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// All products, optionally limited to one warehouse.
    pub async fn list_all(&self, warehouse_id: Option<i64>) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE (?1 IS NULL OR warehouse_id = ?1) ORDER BY id",
            PRODUCT_COLUMNS
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(warehouse_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Gets a product by ID.
    pub async fn get(&self, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets several products at once. Missing ids are simply absent from the
    /// result.
    pub async fn get_many(&self, ids: &[i64]) -> DbResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM products WHERE id IN (",
            PRODUCT_COLUMNS
        ));
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY id");

        let products = builder
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Inserts a product and returns it with its assigned id.
    pub async fn insert(&self, input: &NewProduct) -> DbResult<Product> {
        let now = Utc::now();
        debug!(name = %input.name, warehouse_id = input.warehouse_id, "Inserting product");

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                name, purchase_price, selling_price, stock, warehouse_id, created_at,
                name_folded
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&input.name)
        .bind(input.purchase_price)
        .bind(input.selling_price)
        .bind(input.stock)
        .bind(input.warehouse_id)
        .bind(now)
        .bind(fold(&input.name))
        .execute(&self.pool)
        .await?;

        Ok(Product {
            id: result.last_insert_rowid(),
            name: input.name.clone(),
            purchase_price: input.purchase_price,
            selling_price: input.selling_price,
            stock: input.stock,
            warehouse_id: input.warehouse_id,
            created_at: now,
        })
    }

    /// Updates name, prices and stock. The warehouse is left as is.
    pub async fn update(&self, id: i64, input: &ProductUpdate) -> DbResult<()> {
        debug!(id, name = %input.name, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                purchase_price = ?3,
                selling_price = ?4,
                stock = ?5,
                name_folded = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.purchase_price)
        .bind(input.selling_price)
        .bind(input.stock)
        .bind(fold(&input.name))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Deletes a product. Past transaction items keep their snapshot.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Product count, total stock and stock value per warehouse. Warehouses
    /// with no products appear with zeros.
    pub async fn stock_by_warehouse(&self) -> DbResult<Vec<WarehouseStock>> {
        let rows = sqlx::query_as::<_, WarehouseStock>(
            r#"
            SELECT
                w.id AS warehouse_id,
                w.name AS warehouse_name,
                COUNT(p.id) AS product_count,
                COALESCE(SUM(p.stock), 0) AS total_stock,
                COALESCE(SUM(p.selling_price * p.stock), 0) AS stock_value
            FROM warehouses w
            LEFT JOIN products p ON p.warehouse_id = w.id
            GROUP BY w.id, w.name
            ORDER BY w.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Applies import records in one transaction.
    ///
    /// Records with an id update that product (including its warehouse);
    /// records without one are inserted. If any update misses, nothing is
    /// written.
    pub async fn import(&self, records: &[ProductRecord]) -> DbResult<ImportOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let mut outcome = ImportOutcome::default();
        let now = Utc::now();

        for record in records {
            match record.id {
                Some(id) => {
                    let result = sqlx::query(
                        r#"
                        UPDATE products SET
                            name = ?2,
                            purchase_price = ?3,
                            selling_price = ?4,
                            stock = ?5,
                            warehouse_id = ?6,
                            name_folded = ?7
                        WHERE id = ?1
                        "#,
                    )
                    .bind(id)
                    .bind(&record.name)
                    .bind(record.purchase_price)
                    .bind(record.selling_price)
                    .bind(record.stock)
                    .bind(record.warehouse_id)
                    .bind(fold(&record.name))
                    .execute(&mut *tx)
                    .await?;

                    if result.rows_affected() == 0 {
                        return Err(DbError::not_found("Product", id));
                    }
                    outcome.updated += 1;
                }
                None => {
                    sqlx::query(
                        r#"
                        INSERT INTO products (
                            name, purchase_price, selling_price, stock, warehouse_id,
                            created_at, name_folded
                        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                        "#,
                    )
                    .bind(&record.name)
                    .bind(record.purchase_price)
                    .bind(record.selling_price)
                    .bind(record.stock)
                    .bind(record.warehouse_id)
                    .bind(now)
                    .bind(fold(&record.name))
                    .execute(&mut *tx)
                    .await?;
                    outcome.created += 1;
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(
            created = outcome.created,
            updated = outcome.updated,
            "Products imported"
        );
        Ok(outcome)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use kasir_core::{Money, WarehouseInput};

    async fn setup() -> (Database, i64, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let a = db
            .warehouses()
            .insert(&WarehouseInput {
                name: "Gudang A".to_string(),
                address: String::new(),
            })
            .await
            .unwrap();
        let b = db
            .warehouses()
            .insert(&WarehouseInput {
                name: "Gudang B".to_string(),
                address: String::new(),
            })
            .await
            .unwrap();
        (db, a.id, b.id)
    }

    fn new_product(name: &str, selling: i64, stock: i64, warehouse_id: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            purchase_price: Money::from_rupiah(selling / 2),
            selling_price: Money::from_rupiah(selling),
            stock,
            warehouse_id,
        }
    }

    #[tokio::test]
    async fn test_insert_update_delete() {
        let (db, a, _) = setup().await;
        let repo = db.products();

        let p = repo.insert(&new_product("Kopi", 5_000, 10, a)).await.unwrap();
        repo.update(
            p.id,
            &ProductUpdate {
                name: "Kopi Susu".to_string(),
                purchase_price: Money::from_rupiah(3_000),
                selling_price: Money::from_rupiah(6_000),
                stock: 8,
            },
        )
        .await
        .unwrap();

        let fetched = repo.get(p.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Kopi Susu");
        assert_eq!(fetched.stock, 8);
        assert_eq!(fetched.warehouse_id, a);

        repo.delete(p.id).await.unwrap();
        assert!(repo.get(p.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(p.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_negative_stock_rejected_by_schema() {
        let (db, a, _) = setup().await;
        let err = db
            .products()
            .insert(&new_product("Rusak", 1_000, -1, a))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
    }

    #[tokio::test]
    async fn test_pages_cover_filtered_set_exactly() {
        let (db, a, b) = setup().await;
        let repo = db.products();

        for i in 0..7 {
            repo.insert(&new_product(&format!("Kopi {}", i), 1_000, 1, a))
                .await
                .unwrap();
            repo.insert(&new_product(&format!("Teh {}", i), 1_000, 1, a))
                .await
                .unwrap();
        }
        repo.insert(&new_product("KOPI Gudang B", 1_000, 1, b))
            .await
            .unwrap();

        let total = repo.count(Some("kopi"), Some(a)).await.unwrap();
        assert_eq!(total, 7);

        let limit = 3;
        let mut seen = Vec::new();
        let mut offset = 0;
        while offset < total {
            let page = repo
                .list_page(Some("kopi"), Some(a), offset, limit)
                .await
                .unwrap();
            seen.extend(page.into_iter().map(|p| p.id));
            offset += limit;
        }

        let all: Vec<i64> = repo
            .list_all(Some(a))
            .await
            .unwrap()
            .into_iter()
            .filter(|p| p.name.to_lowercase().contains("kopi"))
            .map(|p| p.id)
            .collect();
        assert_eq!(seen, all);

        // Case-insensitive and unscoped.
        assert_eq!(repo.count(Some("KoPi"), None).await.unwrap(), 8);
        assert_eq!(repo.count(None, None).await.unwrap(), 15);
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let (db, a, _) = setup().await;
        let repo = db.products();
        repo.insert(&new_product("Diskon 50%", 1_000, 1, a)).await.unwrap();
        repo.insert(&new_product("Diskon 500", 1_000, 1, a)).await.unwrap();

        assert_eq!(repo.count(Some("50%"), None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_search_folds_case_beyond_ascii() {
        let (db, a, _) = setup().await;
        let repo = db.products();
        let p = repo.insert(&new_product("Éclair Cokelat", 8_000, 3, a)).await.unwrap();

        assert_eq!(repo.count(Some("éclair"), None).await.unwrap(), 1);
        assert_eq!(repo.count(Some("ÉCLAIR"), None).await.unwrap(), 1);

        repo.update(
            p.id,
            &ProductUpdate {
                name: "Crème Brûlée".to_string(),
                purchase_price: Money::from_rupiah(4_000),
                selling_price: Money::from_rupiah(8_000),
                stock: 3,
            },
        )
        .await
        .unwrap();
        assert_eq!(repo.count(Some("CRÈME"), None).await.unwrap(), 1);
        assert_eq!(repo.count(Some("éclair"), None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_many() {
        let (db, a, _) = setup().await;
        let repo = db.products();
        let p1 = repo.insert(&new_product("A", 1_000, 1, a)).await.unwrap();
        let p2 = repo.insert(&new_product("B", 1_000, 1, a)).await.unwrap();

        let found = repo.get_many(&[p2.id, p1.id, 999]).await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(repo.get_many(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stock_by_warehouse() {
        let (db, a, b) = setup().await;
        let repo = db.products();
        repo.insert(&new_product("A", 10_000, 3, a)).await.unwrap();
        repo.insert(&new_product("B", 2_000, 5, a)).await.unwrap();

        let rows = repo.stock_by_warehouse().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].warehouse_id, a);
        assert_eq!(rows[0].product_count, 2);
        assert_eq!(rows[0].total_stock, 8);
        assert_eq!(rows[0].stock_value.rupiah(), 40_000);
        assert_eq!(rows[1].warehouse_id, b);
        assert_eq!(rows[1].product_count, 0);
        assert_eq!(rows[1].stock_value.rupiah(), 0);
    }

    #[tokio::test]
    async fn test_import_is_all_or_nothing() {
        let (db, a, b) = setup().await;
        let repo = db.products();
        let existing = repo.insert(&new_product("Lama", 1_000, 1, a)).await.unwrap();

        let mut record = ProductRecord::from(&existing);
        record.stock = 50;
        record.warehouse_id = b;
        let fresh = ProductRecord {
            id: None,
            name: "Baru".to_string(),
            purchase_price: Money::from_rupiah(500),
            selling_price: Money::from_rupiah(900),
            stock: 2,
            warehouse_id: a,
        };

        let outcome = repo.import(&[record, fresh.clone()]).await.unwrap();
        assert_eq!(outcome, ImportOutcome { created: 1, updated: 1 });
        let moved = repo.get(existing.id).await.unwrap().unwrap();
        assert_eq!(moved.stock, 50);
        assert_eq!(moved.warehouse_id, b);

        let missing = ProductRecord {
            id: Some(999),
            ..fresh.clone()
        };
        assert!(repo.import(&[fresh, missing]).await.is_err());
        assert_eq!(repo.count(None, None).await.unwrap(), 2);
    }
}
