//! # Domain Errors
//!
//! Rule violations caught in memory, before a query runs. Storage failures
//! live in `kasir_db::DbError`; both are folded into `ServiceError` one layer
//! up.
//!
//! ```text
//! user input ──► ValidationError ─┐
//!                                 ├──► CoreError ──► ServiceError
//! cart / payment rules ───────────┘
//! ```

use thiserror::Error;

use crate::money::Money;

/// A sale or catalogue rule was broken.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// `available` already excludes what the cart holds for the product.
    ///
    /// ```text
    /// stock 10, cart holds 7, add 5  ──►  available 3, requested 5
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    #[error("Cart is empty")]
    EmptyCart,

    #[error("A cart holds at most {max} different products")]
    CartTooLarge { max: usize },

    #[error("Quantity {requested} is above the limit of {max} per line")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// 1-based line number shown in the cart listing.
    #[error("Cart has no line {0}")]
    NoSuchLine(usize),

    /// A line subtotal or the sale total does not fit in an `i64` rupiah
    /// amount.
    #[error("Sale amount is too large")]
    AmountTooLarge,

    #[error("Payment {payment} is less than total {total}")]
    InsufficientPayment { total: Money, payment: Money },

    /// A staff member bound to one warehouse picked stock from another.
    #[error("Product {product} is not available in warehouse {warehouse_id}")]
    WrongWarehouse { product: String, warehouse_id: i64 },

    #[error("{0}")]
    Validation(#[from] ValidationError),
}

/// A single field failed its check. `field` is the name the operator sees.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} needs at least {min} characters")]
    TooShort { field: String, min: usize },

    #[error("{field} allows at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be greater than zero")]
    MustBePositive { field: String },

    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Unparseable date, amount or similar.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

pub type CoreResult<T> = Result<T, CoreError>;
