//! # Validation Module
//!
//! Input validation utilities for Kasir.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Adapter (HTTP body / menu prompt)                            │
//! │  └── Type validation (deserialization, integer parsing)                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Service (Rust)                                               │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0)                                                │
//! │  ├── UNIQUE (username)                                                 │
//! │  └── Guarded stock decrement                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_ITEM_QUANTITY, MAX_PAYMENT, MAX_PRICE, MAX_STOCK};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Shortest accepted password.
pub const MIN_PASSWORD_LENGTH: usize = 6;

// =============================================================================
// String Validators
// =============================================================================

fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use kasir_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Indomie Goreng").is_ok());
/// assert!(validate_product_name("").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_text("name", name, 200)
}

/// Validates a warehouse name (1..=100 characters).
pub fn validate_warehouse_name(name: &str) -> ValidationResult<()> {
    validate_text("name", name, 100)
}

/// Validates a warehouse address. Empty is allowed.
pub fn validate_address(address: &str) -> ValidationResult<()> {
    if address.trim().chars().count() > 255 {
        return Err(ValidationError::TooLong {
            field: "address".to_string(),
            max: 255,
        });
    }
    Ok(())
}

/// Validates a username.
///
/// ## Rules
/// - 3 to 50 characters
/// - Letters, digits, `_`, `.` and `-` only
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }

    if username.len() < 3 {
        return Err(ValidationError::TooShort {
            field: "username".to_string(),
            min: 3,
        });
    }

    if username.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: 50,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only letters, numbers, '_', '.' and '-'".to_string(),
        });
    }

    Ok(())
}

/// Validates a new password. Only length is enforced.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (no filter)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query, or `None` when there is nothing to filter on.
pub fn validate_search_query(query: &str) -> ValidationResult<Option<String>> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: 100,
        });
    }

    Ok(if query.is_empty() {
        None
    } else {
        Some(query.to_string())
    })
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Cart: Add Item                                                         │
/// │                                                                         │
/// │  Cashier enters quantity: 5                                            │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       ├── qty > 999? → Error: "quantity must be between 1 and 999"     │
/// │       └── OK → stock check against the cart                            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price. Zero is allowed (free items), negative is not, and
/// nothing above [`MAX_PRICE`].
///
/// ## Example
/// ```rust
/// use kasir_core::money::Money;
/// use kasir_core::validation::validate_price;
///
/// assert!(validate_price("selling_price", Money::from_rupiah(0)).is_ok());
/// assert!(validate_price("selling_price", Money::from_rupiah(-100)).is_err());
/// assert!(validate_price("selling_price", Money::from_rupiah(i64::MAX)).is_err());
/// ```
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    not_negative_up_to(field, price.rupiah(), MAX_PRICE)
}

/// Validates a stock level.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    not_negative_up_to("stock", stock, MAX_STOCK)
}

/// Validates a payment amount. A zero payment is allowed for free sales.
pub fn validate_payment(payment: Money) -> ValidationResult<()> {
    not_negative_up_to("payment", payment.rupiah(), MAX_PAYMENT)
}

fn not_negative_up_to(field: &str, value: i64, max: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    if value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
