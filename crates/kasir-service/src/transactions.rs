//! # Transaction Service
//!
//! Posting sales and reading them back.
//!
//! ## Post Flow
//! ```text
//! post(session, SaleRequest)
//!      │
//!      ├── 1. get_many(product ids)         missing id ──► NotFound
//!      │                                     (nothing written yet)
//!      ├── 2. PostingPlan::build(lines, payment, session.warehouse_scope())
//!      │         empty cart / short payment ──► Validation
//!      │         other warehouse           ──► Forbidden
//!      │         stock snapshot too low    ──► Conflict
//!      │
//!      └── 3. TransactionRepository::post   (one database transaction)
//!                guarded decrement misses  ──► Conflict, full rollback
//! ```

use std::collections::HashMap;

use chrono::{FixedOffset, Utc};
use serde::Serialize;
use tracing::info;

use kasir_core::{CoreError, PostingPlan, ReceiptView, ReportDate, SaleLine, SaleRequest, Transaction};
use kasir_db::{Database, NewTransaction};

use crate::error::{ServiceError, ServiceResult};
use crate::session::Session;

/// Rendered receipt text and the file name to save it under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub file_name: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct TransactionService {
    db: Database,
    offset: FixedOffset,
}

impl TransactionService {
    pub fn new(db: Database, offset: FixedOffset) -> Self {
        TransactionService { db, offset }
    }

    /// Posts a sale for the acting user.
    pub async fn post(&self, session: &Session, request: SaleRequest) -> ServiceResult<Transaction> {
        if request.items.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let mut ids: Vec<i64> = request.items.iter().map(|i| i.product_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let products: HashMap<i64, _> = self
            .db
            .products()
            .get_many(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let lines = request
            .items
            .iter()
            .map(|item| {
                products
                    .get(&item.product_id)
                    .map(|product| SaleLine {
                        product: product.clone(),
                        quantity: item.quantity,
                    })
                    .ok_or_else(|| ServiceError::not_found("Product", item.product_id))
            })
            .collect::<ServiceResult<Vec<_>>>()?;

        let plan = PostingPlan::build(&lines, request.payment, session.warehouse_scope())?;

        let transaction = self
            .db
            .transactions()
            .post(&NewTransaction {
                user_id: session.user_id,
                created_at: Utc::now(),
                plan,
            })
            .await?;

        info!(
            transaction = %transaction.number(),
            user_id = session.user_id,
            total = %transaction.total,
            "Sale posted"
        );
        Ok(transaction)
    }

    /// Today's transactions in the caller's warehouse scope, newest first.
    pub async fn list_today(&self, session: &Session) -> ServiceResult<Vec<Transaction>> {
        let window = ReportDate::today(self.offset, Utc::now()).window(self.offset);
        Ok(self
            .db
            .transactions()
            .list_between(window.start, window.end, session.warehouse_scope())
            .await?)
    }

    pub async fn get(&self, session: &Session, id: i64) -> ServiceResult<Transaction> {
        let transaction = self
            .db
            .transactions()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Transaction", id))?;

        match session.warehouse_scope() {
            Some(scope) if scope != transaction.warehouse_id => {
                Err(ServiceError::not_found("Transaction", id))
            }
            _ => Ok(transaction),
        }
    }

    /// Renders the receipt with the cashier's and warehouse's names.
    pub async fn receipt(
        &self,
        session: &Session,
        transaction: &Transaction,
    ) -> ServiceResult<Receipt> {
        let cashier = if transaction.user_id == session.user_id {
            session.username.clone()
        } else {
            self.db
                .users()
                .get(transaction.user_id)
                .await?
                .map(|u| u.username)
                .unwrap_or_else(|| "-".to_string())
        };

        let warehouse = self.db.warehouses().get(transaction.warehouse_id).await?;

        let view = ReceiptView {
            transaction,
            cashier: &cashier,
            warehouse_name: warehouse.as_ref().map(|w| w.name.as_str()),
            offset: self.offset,
        };

        Ok(Receipt {
            file_name: view.file_name(),
            text: view.render(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::{kasir_with_admin, new_product, new_warehouse, staff_session};
    use kasir_core::{Money, SaleRequestItem};

    fn sale(items: &[(i64, i64)], payment: i64) -> SaleRequest {
        SaleRequest {
            items: items
                .iter()
                .map(|&(product_id, quantity)| SaleRequestItem {
                    product_id,
                    quantity,
                })
                .collect(),
            payment: Money::from_rupiah(payment),
        }
    }

    #[tokio::test]
    async fn test_post_reduces_stock() {
        let (kasir, admin) = kasir_with_admin().await;
        let w = new_warehouse(&kasir, &admin, "Gudang").await;
        let a = kasir
            .products()
            .create(&admin, new_product("Beras", w.id, 5))
            .await
            .unwrap();

        let trx = kasir
            .transactions()
            .post(&admin, sale(&[(a.id, 2)], 20_000))
            .await
            .unwrap();

        assert_eq!(trx.total, Money::from_rupiah(20_000));
        assert_eq!(trx.profit, Money::from_rupiah(8_000));
        assert_eq!(trx.change, Money::zero());
        assert_eq!(trx.warehouse_id, w.id);
        assert_eq!(trx.items.len(), 1);

        let after = kasir.products().get(&admin, a.id).await.unwrap();
        assert_eq!(after.stock, 3);

        let today = kasir.transactions().list_today(&admin).await.unwrap();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].id, trx.id);
    }

    #[tokio::test]
    async fn test_over_sell_changes_nothing() {
        let (kasir, admin) = kasir_with_admin().await;
        let w = new_warehouse(&kasir, &admin, "Gudang").await;
        let a = kasir
            .products()
            .create(&admin, new_product("Beras", w.id, 5))
            .await
            .unwrap();
        let b = kasir
            .products()
            .create(&admin, new_product("Gula", w.id, 1))
            .await
            .unwrap();

        let err = kasir
            .transactions()
            .post(&admin, sale(&[(a.id, 2), (b.id, 2)], 100_000))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        assert_eq!(kasir.products().get(&admin, a.id).await.unwrap().stock, 5);
        assert_eq!(kasir.products().get(&admin, b.id).await.unwrap().stock, 1);
        assert!(kasir.transactions().list_today(&admin).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejections_before_writing() {
        let (kasir, admin) = kasir_with_admin().await;
        let w = new_warehouse(&kasir, &admin, "Gudang").await;
        let other = new_warehouse(&kasir, &admin, "Cabang").await;
        let a = kasir
            .products()
            .create(&admin, new_product("Beras", w.id, 5))
            .await
            .unwrap();

        let err = kasir
            .transactions()
            .post(&admin, sale(&[(a.id, 1), (999, 1)], 50_000))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = kasir
            .transactions()
            .post(&admin, sale(&[], 0))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = kasir
            .transactions()
            .post(&admin, sale(&[(a.id, 1)], 5_000))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = kasir
            .transactions()
            .post(&staff_session(Some(other.id)), sale(&[(a.id, 1)], 10_000))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        assert_eq!(kasir.products().get(&admin, a.id).await.unwrap().stock, 5);
    }

    #[tokio::test]
    async fn test_receipt() {
        let (kasir, admin) = kasir_with_admin().await;
        let w = new_warehouse(&kasir, &admin, "Toko Depan").await;
        let a = kasir
            .products()
            .create(&admin, new_product("Beras", w.id, 5))
            .await
            .unwrap();
        let trx = kasir
            .transactions()
            .post(&admin, sale(&[(a.id, 2)], 50_000))
            .await
            .unwrap();

        let receipt = kasir.transactions().receipt(&admin, &trx).await.unwrap();
        assert!(receipt.text.contains(&trx.number()));
        assert!(receipt.text.contains("Cashier      : admin"));
        assert!(receipt.text.contains("Warehouse    : Toko Depan"));
        assert!(receipt.text.contains("2 x Rp 10.000 = Rp 20.000"));
        assert!(receipt.file_name.starts_with(&format!("receipt_{}_", trx.number())));

        let fetched = kasir.transactions().get(&admin, trx.id).await.unwrap();
        assert_eq!(fetched.id, trx.id);
        assert_eq!(fetched.items, trx.items);
    }
}
