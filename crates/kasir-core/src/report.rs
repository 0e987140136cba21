//! # Reports
//!
//! Day windows for the daily sales report, the summary fold, and the
//! per-warehouse stock summary.
//!
//! ## Day Window
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Report for 17-08-2025 at UTC+07:00                                     │
//! │                                                                         │
//! │  local   17-08-2025 00:00:00  ───────────►  18-08-2025 00:00:00         │
//! │  UTC     16-08-2025 17:00:00  ───────────►  17-08-2025 17:00:00         │
//! │                                                                         │
//! │  A transaction is in the report iff  start <= created_at < end          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Transaction;
use crate::REPORT_DATE_FORMAT;

// =============================================================================
// Report Date
// =============================================================================

/// A calendar date in the business time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReportDate(NaiveDate);

impl ReportDate {
    pub fn new(date: NaiveDate) -> Self {
        ReportDate(date)
    }

    /// Parses `DD-MM-YYYY`.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        NaiveDate::parse_from_str(input.trim(), REPORT_DATE_FORMAT)
            .map(ReportDate)
            .map_err(|_| ValidationError::InvalidFormat {
                field: "date".to_string(),
                reason: "Invalid date format DD-MM-YYYY".to_string(),
            })
    }

    /// The date `now` falls on in the given time zone.
    pub fn today(offset: FixedOffset, now: DateTime<Utc>) -> Self {
        ReportDate(now.with_timezone(&offset).date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The UTC instants bounding this date in the given time zone.
    pub fn window(&self, offset: FixedOffset) -> DayWindow {
        let local_midnight = self.0.and_time(NaiveTime::MIN);
        let start = (local_midnight - Duration::seconds(i64::from(offset.local_minus_utc())))
            .and_utc();
        DayWindow {
            start,
            end: start + Duration::hours(24),
        }
    }
}

impl fmt::Display for ReportDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(REPORT_DATE_FORMAT))
    }
}

/// Half-open UTC range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

// =============================================================================
// Daily Summary
// =============================================================================

/// Totals for one day of sales.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DailySummary {
    pub total_sales: Money,
    pub total_profit: Money,
    pub transaction_count: i64,
}

impl DailySummary {
    /// Folds already-fetched transactions into a summary.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        transactions
            .iter()
            .fold(DailySummary::default(), |mut acc, t| {
                acc.total_sales += t.total;
                acc.total_profit += t.profit;
                acc.transaction_count += 1;
                acc
            })
    }
}

/// The daily report returned to both adapters.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyReport {
    /// `DD-MM-YYYY`
    pub date: String,
    pub summary: DailySummary,
    pub transactions: Vec<Transaction>,
}

// =============================================================================
// Stock Summary
// =============================================================================

/// Stock held by one warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct WarehouseStock {
    pub warehouse_id: i64,
    pub warehouse_name: String,
    pub product_count: i64,
    pub total_stock: i64,
    /// Σ selling_price × stock
    pub stock_value: Money,
}

/// Stock across all warehouses with a grand total row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockSummary {
    pub warehouses: Vec<WarehouseStock>,
    pub total_products: i64,
    pub total_stock: i64,
    pub total_value: Money,
}

impl StockSummary {
    pub fn from_rows(warehouses: Vec<WarehouseStock>) -> Self {
        let total_products = warehouses.iter().map(|w| w.product_count).sum();
        let total_stock = warehouses.iter().map(|w| w.total_stock).sum();
        let total_value = warehouses.iter().map(|w| w.stock_value).sum();
        StockSummary {
            warehouses,
            total_products,
            total_stock,
            total_value,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
