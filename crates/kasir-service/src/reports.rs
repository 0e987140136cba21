//! # Report Service
//!
//! Daily sales reports.
//!
//! ## Day Window
//! ```text
//! date 17-08-2025, offset +07:00
//!
//!   local   17-08 00:00:00 ─────────────────────► 18-08 00:00:00
//!   UTC     16-08 17:00:00 ─────────────────────► 17-08 17:00:00
//!           start (inclusive)                      end (exclusive)
//! ```
//!
//! The summary comes from one aggregate query over the window. The fetched
//! list must fold to the same numbers.

use chrono::{FixedOffset, Utc};
use tracing::debug;

use kasir_core::{DailyReport, DailySummary, ReportDate};
use kasir_db::Database;

use crate::error::ServiceResult;
use crate::session::Session;

#[derive(Debug, Clone)]
pub struct ReportService {
    db: Database,
    offset: FixedOffset,
}

impl ReportService {
    pub fn new(db: Database, offset: FixedOffset) -> Self {
        ReportService { db, offset }
    }

    /// The business date today.
    pub fn today(&self) -> ReportDate {
        ReportDate::today(self.offset, Utc::now())
    }

    /// Report for `date` (default today), limited to the caller's warehouse
    /// when they are scoped.
    pub async fn daily(
        &self,
        session: &Session,
        date: Option<ReportDate>,
    ) -> ServiceResult<DailyReport> {
        let date = date.unwrap_or_else(|| self.today());
        let window = date.window(self.offset);
        let scope = session.warehouse_scope();
        debug!(%date, ?scope, "Building daily report");

        let repo = self.db.transactions();
        let transactions = repo.list_between(window.start, window.end, scope).await?;
        let summary = repo.daily_totals(window.start, window.end, scope).await?;

        debug_assert_eq!(summary, DailySummary::from_transactions(&transactions));

        Ok(DailyReport {
            date: date.to_string(),
            summary,
            transactions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{kasir_with_admin, new_product, new_warehouse, staff_session};
    use chrono::Duration;
    use kasir_core::{Money, SaleRequest, SaleRequestItem};

    #[tokio::test]
    async fn test_daily_report() {
        let (kasir, admin) = kasir_with_admin().await;
        let a = new_warehouse(&kasir, &admin, "A").await;
        let b = new_warehouse(&kasir, &admin, "B").await;
        let in_a = kasir
            .products()
            .create(&admin, new_product("Teh", a.id, 10))
            .await
            .unwrap();
        let in_b = kasir
            .products()
            .create(&admin, new_product("Kopi", b.id, 10))
            .await
            .unwrap();

        for (product_id, quantity) in [(in_a.id, 1), (in_a.id, 2), (in_b.id, 3)] {
            kasir
                .transactions()
                .post(
                    &admin,
                    SaleRequest {
                        items: vec![SaleRequestItem {
                            product_id,
                            quantity,
                        }],
                        payment: Money::from_rupiah(100_000),
                    },
                )
                .await
                .unwrap();
        }

        let report = kasir.reports().daily(&admin, None).await.unwrap();
        assert_eq!(report.summary.transaction_count, 3);
        assert_eq!(report.summary.total_sales, Money::from_rupiah(60_000));
        assert_eq!(report.summary.total_profit, Money::from_rupiah(24_000));
        assert_eq!(report.date, kasir.reports().today().to_string());
        assert_eq!(
            report.summary,
            DailySummary::from_transactions(&report.transactions)
        );

        // Newest first.
        assert!(report.transactions[0].id > report.transactions[2].id);

        let scoped = kasir
            .reports()
            .daily(&staff_session(Some(a.id)), None)
            .await
            .unwrap();
        assert_eq!(scoped.summary.transaction_count, 2);
        assert_eq!(scoped.summary.total_sales, Money::from_rupiah(30_000));
    }

    #[tokio::test]
    async fn test_other_days_are_empty() {
        let (kasir, admin) = kasir_with_admin().await;
        let yesterday = ReportDate::new(kasir.reports().today().date() - Duration::days(1));

        let report = kasir.reports().daily(&admin, Some(yesterday)).await.unwrap();
        assert_eq!(report.summary, DailySummary::default());
        assert!(report.transactions.is_empty());
    }
}
