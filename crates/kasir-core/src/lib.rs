//! # kasir-core: Pure Business Logic for Kasir
//!
//! This crate is the **heart** of Kasir. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Kasir Architecture                             │
//! │                                                                         │
//! │  ┌──────────────────────────┐      ┌──────────────────────────┐        │
//! │  │  kasir-cli (menus)       │      │  kasir-api (HTTP/JSON)   │        │
//! │  └────────────┬─────────────┘      └────────────┬─────────────┘        │
//! │               └───────────────┬─────────────────┘                      │
//! │                               ▼                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          kasir-service (session, auth, business rules)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kasir-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │  cart   │ │ posting │ │ report  │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kasir-db (Database Layer)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Warehouse, User, Transaction)
//! - [`money`] - Integer rupiah amounts (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Input rules
//! - [`cart`] - Transient cart held during an interactive sale
//! - [`posting`] - Totals, profit, change and warehouse attribution for a sale
//! - [`pagination`] - Page/limit math for product listings
//! - [`report`] - Daily report windows and summaries, stock summaries
//! - [`receipt`] - Receipt text
//!
//! ## Example Usage
//!
//! ```rust
//! use kasir_core::money::Money;
//!
//! let price = Money::from_rupiah(10_000);
//! let line = price.multiply_quantity(3);
//!
//! assert_eq!(line.to_string(), "Rp 30.000");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod pagination;
pub mod posting;
pub mod receipt;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use kasir_core::Money` instead of
// `use kasir_core::money::Money`

pub use cart::{Cart, CartLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pagination::{Page, PageMeta, PageRequest, MAX_PAGE};
pub use posting::{PlannedItem, PostingPlan, SaleLine};
pub use receipt::ReceiptView;
pub use report::{DailyReport, DailySummary, DayWindow, ReportDate, StockSummary, WarehouseStock};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct products allowed in a single cart.
///
/// ## Business Reason
/// Keeps a single sale to a size a cashier can reasonably review.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single item in a sale.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest unit price a product may carry, in rupiah (Rp 10 miliar).
pub const MAX_PRICE: i64 = 10_000_000_000;

/// Largest payment accepted for one sale, in rupiah.
pub const MAX_PAYMENT: i64 = 1_000_000_000_000_000;

/// Largest stock level a product may carry.
pub const MAX_STOCK: i64 = 1_000_000;

/// Default page size for product listings.
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Largest page size a caller may request.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Date format used for reports, both on the wire and in the menus.
pub const REPORT_DATE_FORMAT: &str = "%d-%m-%Y";
