//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A day of sales summed as f64 drifts, and profit = selling - purchase  │
//! │  inherits the drift of both sides.                                     │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Rupiah                                           │
//! │    The rupiah has no minor unit in practice, so one i64 unit = Rp 1.   │
//! │    Sums and products are exact.                                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kasir_core::money::Money;
//!
//! let price = Money::from_rupiah(12_500);
//! let doubled = price * 2;
//! let total = price + Money::from_rupiah(500);
//!
//! assert_eq!(doubled.rupiah(), 25_000);
//! assert_eq!(total.to_string(), "Rp 13.000");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in whole rupiah.
///
/// ## Design Decisions
/// - **i64 (signed)**: profit can be negative when selling below cost
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Transparent serde/sqlx**: stored and sent as a bare integer
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.selling_price ──┬──► line subtotal ──► Transaction.total      │
/// │  Product.purchase_price ─┴──► line profit   ──► Transaction.profit     │
/// │                                                                         │
/// │  payment - total ──► Transaction.change                                │
/// │                                                                         │
/// │  Displayed as "Rp 1.250.000" in menus and receipts                     │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole rupiah.
    #[inline]
    pub const fn from_rupiah(rupiah: i64) -> Self {
        Money(rupiah)
    }

    /// Returns the value in whole rupiah.
    #[inline]
    pub const fn rupiah(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity, saturating at the `i64` bounds.
    ///
    /// Fine for display figures such as stock value. Amounts that get stored
    /// go through [`Money::checked_multiply`].
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::money::Money;
    ///
    /// let unit_price = Money::from_rupiah(3_500);
    /// assert_eq!(unit_price.multiply_quantity(3).rupiah(), 10_500);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// `None` when `self × qty` does not fit.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::money::Money;
    ///
    /// assert_eq!(Money::from_rupiah(2_000).checked_multiply(3), Some(Money::from_rupiah(6_000)));
    /// assert_eq!(Money::from_rupiah(i64::MAX).checked_multiply(2), None);
    /// ```
    #[inline]
    pub const fn checked_multiply(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Parses an amount typed by an operator.
    ///
    /// Accepts digits with optional `.` thousands separators and an optional
    /// `Rp` prefix, so `50.000`, `Rp 50.000` and `50000` are all Rp 50.000.
    /// Negative amounts and decimals are rejected.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::money::Money;
    ///
    /// assert_eq!(Money::parse_input("50.000").unwrap().rupiah(), 50_000);
    /// assert!(Money::parse_input("12,5").is_err());
    /// ```
    pub fn parse_input(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let without_prefix = trimmed
            .strip_prefix("Rp")
            .or_else(|| trimmed.strip_prefix("rp"))
            .unwrap_or(trimmed)
            .trim();
        let digits: String = without_prefix.chars().filter(|c| *c != '.').collect();

        if digits.is_empty() {
            return Err(ValidationError::Required {
                field: "amount".to_string(),
            });
        }

        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidFormat {
                field: "amount".to_string(),
                reason: "use digits with optional '.' thousands separators".to_string(),
            });
        }

        digits
            .parse::<i64>()
            .map(Money)
            .map_err(|_| ValidationError::InvalidFormat {
                field: "amount".to_string(),
                reason: "amount is too large".to_string(),
            })
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Rupiah formatting with `.` thousands separators: `Rp 1.234.567`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        let sign = if self.0 < 0 { "-" } else { "" };
        f.pad(&format!("{}Rp {}", sign, grouped))
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Saturating addition. Posting uses [`Money::checked_add`] instead.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

/// Multiplication by i64 (quantities), saturating.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
