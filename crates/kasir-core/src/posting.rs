//! # Posting
//!
//! Pure arithmetic for posting a sale: line subtotals and profit, totals,
//! change, and which warehouse the sale is attributed to.
//!
//! ## Posting Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  SaleRequest ──► resolve products ──► PostingPlan::build (THIS MODULE) │
//! │  (service)        (service + db)       │                                │
//! │                                        ├── subtotal = selling × qty     │
//! │                                        ├── profit = (selling-cost)× qty │
//! │                                        ├── total, profit, change        │
//! │                                        └── attributed warehouse         │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                          TransactionRepository::post (one unit of work) │
//! │                          header ─► items ─► guarded stock decrements    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;
use crate::validation::{validate_payment, validate_quantity};

/// A resolved sale line: the current product row and the requested quantity.
#[derive(Debug, Clone)]
pub struct SaleLine {
    pub product: Product,
    pub quantity: i64,
}

/// A line item ready to be written, with the product snapshot taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedItem {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub purchase_price: Money,
    pub selling_price: Money,
    pub subtotal: Money,
    pub profit: Money,
}

impl PlannedItem {
    fn from_line(line: &SaleLine) -> CoreResult<Self> {
        let p = &line.product;
        let subtotal = p
            .selling_price
            .checked_multiply(line.quantity)
            .ok_or(CoreError::AmountTooLarge)?;
        let profit = p
            .unit_profit()
            .checked_multiply(line.quantity)
            .ok_or(CoreError::AmountTooLarge)?;
        Ok(PlannedItem {
            product_id: p.id,
            product_name: p.name.clone(),
            quantity: line.quantity,
            purchase_price: p.purchase_price,
            selling_price: p.selling_price,
            subtotal,
            profit,
        })
    }
}

fn checked_total(mut amounts: impl Iterator<Item = Money>) -> CoreResult<Money> {
    amounts.try_fold(Money::zero(), |acc, m| {
        acc.checked_add(m).ok_or(CoreError::AmountTooLarge)
    })
}

/// Everything needed to write a transaction, computed up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingPlan {
    pub warehouse_id: i64,
    pub total: Money,
    pub profit: Money,
    pub payment: Money,
    pub change: Money,
    pub items: Vec<PlannedItem>,
}

impl PostingPlan {
    /// Builds a plan from resolved lines.
    ///
    /// `scoped_warehouse` is the acting user's warehouse, if any. When set,
    /// every product must belong to it and the sale is attributed to it.
    /// Otherwise the sale goes to the first line's warehouse.
    ///
    /// The stock check here runs against the snapshot in `lines`. It catches
    /// obvious over-sells early; the guarded decrement at write time is what
    /// actually protects stock.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::Utc;
    /// use kasir_core::{Money, PostingPlan, Product, SaleLine};
    ///
    /// let product = Product {
    ///     id: 1,
    ///     name: "Beras 5kg".to_string(),
    ///     purchase_price: Money::from_rupiah(6_000),
    ///     selling_price: Money::from_rupiah(10_000),
    ///     stock: 5,
    ///     warehouse_id: 1,
    ///     created_at: Utc::now(),
    /// };
    /// let lines = vec![SaleLine { product, quantity: 2 }];
    ///
    /// let plan = PostingPlan::build(&lines, Money::from_rupiah(20_000), None).unwrap();
    /// assert_eq!(plan.total.rupiah(), 20_000);
    /// assert_eq!(plan.profit.rupiah(), 8_000);
    /// assert_eq!(plan.change.rupiah(), 0);
    /// ```
    pub fn build(
        lines: &[SaleLine],
        payment: Money,
        scoped_warehouse: Option<i64>,
    ) -> CoreResult<PostingPlan> {
        let first = lines.first().ok_or(CoreError::EmptyCart)?;
        validate_payment(payment)?;

        let mut requested: HashMap<i64, i64> = HashMap::new();
        for line in lines {
            validate_quantity(line.quantity)?;

            if let Some(warehouse_id) = scoped_warehouse {
                if line.product.warehouse_id != warehouse_id {
                    return Err(CoreError::WrongWarehouse {
                        product: line.product.name.clone(),
                        warehouse_id,
                    });
                }
            }

            let wanted = requested.entry(line.product.id).or_insert(0);
            *wanted += line.quantity;
            if *wanted > line.product.stock {
                return Err(CoreError::InsufficientStock {
                    product: line.product.name.clone(),
                    available: line.product.stock,
                    requested: *wanted,
                });
            }
        }

        let items = lines
            .iter()
            .map(PlannedItem::from_line)
            .collect::<CoreResult<Vec<_>>>()?;
        let total = checked_total(items.iter().map(|i| i.subtotal))?;
        let profit = checked_total(items.iter().map(|i| i.profit))?;

        if payment < total {
            return Err(CoreError::InsufficientPayment { total, payment });
        }

        Ok(PostingPlan {
            warehouse_id: scoped_warehouse.unwrap_or(first.product.warehouse_id),
            total,
            profit,
            payment,
            change: payment - total,
            items,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: i64, selling: i64, purchase: i64, stock: i64, warehouse_id: i64) -> Product {
        Product {
            id,
            name: format!("Produk {}", id),
            purchase_price: Money::from_rupiah(purchase),
            selling_price: Money::from_rupiah(selling),
            stock,
            warehouse_id,
            created_at: Utc::now(),
        }
    }

    fn line(product: Product, quantity: i64) -> SaleLine {
        SaleLine { product, quantity }
    }

    #[test]
    fn test_single_line_example() {
        let lines = vec![line(product(1, 10_000, 6_000, 5, 1), 2)];
        let plan = PostingPlan::build(&lines, Money::from_rupiah(20_000), None).unwrap();

        assert_eq!(plan.total.rupiah(), 20_000);
        assert_eq!(plan.profit.rupiah(), 8_000);
        assert_eq!(plan.change.rupiah(), 0);
        assert_eq!(plan.warehouse_id, 1);
        assert_eq!(plan.items[0].subtotal.rupiah(), 20_000);
        assert_eq!(plan.items[0].profit.rupiah(), 8_000);
    }

    #[test]
    fn test_totals_across_lines() {
        let lines = vec![
            line(product(1, 10_000, 6_000, 5, 2), 1),
            line(product(2, 3_500, 3_000, 10, 3), 4),
        ];
        let plan = PostingPlan::build(&lines, Money::from_rupiah(50_000), None).unwrap();

        assert_eq!(plan.total.rupiah(), 24_000);
        assert_eq!(plan.profit.rupiah(), 4_000 + 2_000);
        assert_eq!(plan.change.rupiah(), 26_000);
        // First line decides when the user is unscoped.
        assert_eq!(plan.warehouse_id, 2);
    }

    #[test]
    fn test_scoped_warehouse_wins() {
        let lines = vec![line(product(1, 1_000, 500, 5, 4), 1)];
        let plan = PostingPlan::build(&lines, Money::from_rupiah(1_000), Some(4)).unwrap();
        assert_eq!(plan.warehouse_id, 4);
    }

    #[test]
    fn test_scoped_user_cannot_sell_other_warehouse() {
        let lines = vec![line(product(1, 1_000, 500, 5, 2), 1)];
        let err = PostingPlan::build(&lines, Money::from_rupiah(1_000), Some(4)).unwrap_err();
        assert!(matches!(err, CoreError::WrongWarehouse { warehouse_id: 4, .. }));
    }

    #[test]
    fn test_rejects_empty_cart() {
        let err = PostingPlan::build(&[], Money::from_rupiah(1_000), None).unwrap_err();
        assert!(matches!(err, CoreError::EmptyCart));
    }

    #[test]
    fn test_rejects_short_payment() {
        let lines = vec![line(product(1, 10_000, 6_000, 5, 1), 2)];
        let err = PostingPlan::build(&lines, Money::from_rupiah(19_999), None).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientPayment { .. }));
    }

    #[test]
    fn test_repeated_product_summed_against_stock() {
        let p = product(1, 1_000, 500, 5, 1);
        let lines = vec![line(p.clone(), 3), line(p, 3)];
        let err = PostingPlan::build(&lines, Money::from_rupiah(10_000), None).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 5,
                requested: 6,
                ..
            }
        ));
    }

    #[test]
    fn test_overflowing_subtotal_is_rejected() {
        let lines = vec![line(product(1, i64::MAX, 0, 5, 1), 2)];
        let err = PostingPlan::build(&lines, Money::zero(), None).unwrap_err();
        assert!(matches!(err, CoreError::AmountTooLarge));
    }

    #[test]
    fn test_overflowing_total_is_rejected() {
        let half = i64::MAX / 2 + 1;
        let lines = vec![
            line(product(1, half, 0, 5, 1), 1),
            line(product(2, half, 0, 5, 1), 1),
        ];
        let err = PostingPlan::build(&lines, Money::zero(), None).unwrap_err();
        assert!(matches!(err, CoreError::AmountTooLarge));
    }
}
