//! # Transaction Repository
//!
//! Writes sales atomically and reads them back for reports.
//!
//! ## Posting Unit of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     post(NewTransaction)                                │
//! │                                                                         │
//! │  BEGIN                                                                 │
//! │    │                                                                    │
//! │    ├── INSERT INTO transactions (...)            → header id           │
//! │    │                                                                    │
//! │    ├── for each planned item:                                          │
//! │    │     INSERT INTO transaction_items (...)     snapshot of product   │
//! │    │                                                                    │
//! │    ├── for each planned item:                                          │
//! │    │     UPDATE products SET stock = stock - q                          │
//! │    │     WHERE id = ? AND stock >= q                                   │
//! │    │       │                                                            │
//! │    │       └── 0 rows? ──► StockConflict ──► ROLLBACK (tx dropped)     │
//! │    │                                                                    │
//! │  COMMIT                                                                │
//! │                                                                         │
//! │  Any error before COMMIT leaves no header, no items, no stock change.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use kasir_core::{DailySummary, PostingPlan, Transaction, TransactionItem};

const TRANSACTION_COLUMNS: &str =
    "id, user_id, warehouse_id, total, profit, payment, change_due, created_at";

const ITEM_COLUMNS: &str = "id, transaction_id, product_id, product_name, quantity, \
     purchase_price, selling_price, subtotal, profit";

/// A sale ready to be written.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub plan: PostingPlan,
}

/// Repository for transaction database operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Posts a sale in one database transaction and returns it with items.
    ///
    /// ## Errors
    /// - `StockConflict` if any guarded decrement matched no row
    /// - `TransactionFailed` if the transaction could not begin or commit
    ///
    /// In every error case nothing is written.
    pub async fn post(&self, new: &NewTransaction) -> DbResult<Transaction> {
        let plan = &new.plan;
        debug!(
            user_id = new.user_id,
            warehouse_id = plan.warehouse_id,
            items = plan.items.len(),
            "Posting transaction"
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let header = sqlx::query(
            r#"
            INSERT INTO transactions (
                user_id, warehouse_id, total, profit, payment, change_due, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(new.user_id)
        .bind(plan.warehouse_id)
        .bind(plan.total)
        .bind(plan.profit)
        .bind(plan.payment)
        .bind(plan.change)
        .bind(new.created_at)
        .execute(&mut *tx)
        .await?;

        let transaction_id = header.last_insert_rowid();
        let mut items = Vec::with_capacity(plan.items.len());

        for item in &plan.items {
            let result = sqlx::query(
                r#"
                INSERT INTO transaction_items (
                    transaction_id, product_id, product_name, quantity,
                    purchase_price, selling_price, subtotal, profit
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(transaction_id)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.purchase_price)
            .bind(item.selling_price)
            .bind(item.subtotal)
            .bind(item.profit)
            .execute(&mut *tx)
            .await?;

            items.push(TransactionItem {
                id: result.last_insert_rowid(),
                transaction_id,
                product_id: item.product_id,
                product_name: item.product_name.clone(),
                quantity: item.quantity,
                purchase_price: item.purchase_price,
                selling_price: item.selling_price,
                subtotal: item.subtotal,
                profit: item.profit,
            });
        }

        for item in &plan.items {
            let result = sqlx::query(
                "UPDATE products SET stock = stock - ?2 WHERE id = ?1 AND stock >= ?2",
            )
            .bind(item.product_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                warn!(
                    product_id = item.product_id,
                    requested = item.quantity,
                    "Guarded stock decrement failed, rolling back"
                );
                return Err(DbError::StockConflict {
                    product_id: item.product_id,
                    requested: item.quantity,
                });
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            transaction_id,
            total = plan.total.rupiah(),
            "Transaction posted"
        );

        Ok(Transaction {
            id: transaction_id,
            user_id: new.user_id,
            warehouse_id: plan.warehouse_id,
            total: plan.total,
            profit: plan.profit,
            payment: plan.payment,
            change: plan.change,
            created_at: new.created_at,
            items,
        })
    }

    /// Gets a transaction with its items.
    pub async fn get(&self, id: i64) -> DbResult<Option<Transaction>> {
        let sql = format!(
            "SELECT {} FROM transactions WHERE id = ?1",
            TRANSACTION_COLUMNS
        );
        let header = sqlx::query_as::<_, Transaction>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match header {
            Some(mut trx) => {
                trx.items = self.items(id).await?;
                Ok(Some(trx))
            }
            None => Ok(None),
        }
    }

    /// Line items of one transaction, in insertion order.
    pub async fn items(&self, transaction_id: i64) -> DbResult<Vec<TransactionItem>> {
        let sql = format!(
            "SELECT {} FROM transaction_items WHERE transaction_id = ?1 ORDER BY id",
            ITEM_COLUMNS
        );
        let items = sqlx::query_as::<_, TransactionItem>(&sql)
            .bind(transaction_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    /// Transactions created in `[start, end)`, newest first, with items.
    pub async fn list_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        warehouse_id: Option<i64>,
    ) -> DbResult<Vec<Transaction>> {
        let sql = format!(
            r#"
            SELECT {} FROM transactions
            WHERE created_at >= ?1 AND created_at < ?2
              AND (?3 IS NULL OR warehouse_id = ?3)
            ORDER BY created_at DESC, id DESC
            "#,
            TRANSACTION_COLUMNS
        );
        let mut transactions = sqlx::query_as::<_, Transaction>(&sql)
            .bind(start)
            .bind(end)
            .bind(warehouse_id)
            .fetch_all(&self.pool)
            .await?;

        if transactions.is_empty() {
            return Ok(transactions);
        }

        let item_sql = format!(
            r#"
            SELECT {} FROM transaction_items
            WHERE transaction_id IN (
                SELECT id FROM transactions
                WHERE created_at >= ?1 AND created_at < ?2
                  AND (?3 IS NULL OR warehouse_id = ?3)
            )
            ORDER BY id
            "#,
            ITEM_COLUMNS
        );
        let items = sqlx::query_as::<_, TransactionItem>(&item_sql)
            .bind(start)
            .bind(end)
            .bind(warehouse_id)
            .fetch_all(&self.pool)
            .await?;

        for item in items {
            if let Some(trx) = transactions
                .iter_mut()
                .find(|t| t.id == item.transaction_id)
            {
                trx.items.push(item);
            }
        }

        Ok(transactions)
    }

    /// Sales total, profit total and count for `[start, end)`.
    pub async fn daily_totals(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        warehouse_id: Option<i64>,
    ) -> DbResult<DailySummary> {
        let summary = sqlx::query_as::<_, DailySummary>(
            r#"
            SELECT
                COALESCE(SUM(total), 0) AS total_sales,
                COALESCE(SUM(profit), 0) AS total_profit,
                COUNT(*) AS transaction_count
            FROM transactions
            WHERE created_at >= ?1 AND created_at < ?2
              AND (?3 IS NULL OR warehouse_id = ?3)
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(warehouse_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
