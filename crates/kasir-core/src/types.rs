//! # Domain Types
//!
//! Core domain types used throughout Kasir.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Warehouse     │◄──│    Product      │   │      User       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  name           │   │  name           │   │  username       │       │
//! │  │  address        │   │  purchase_price │   │  role           │       │
//! │  └─────────────────┘   │  selling_price  │   │  warehouse_id?  │──┐    │
//! │          ▲             │  stock (>= 0)   │   └─────────────────┘  │    │
//! │          │             │  warehouse_id   │                        │    │
//! │          │             └─────────────────┘                        │    │
//! │          └────────────────────────────────────────────────────────┘    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────┐                         │
//! │  │  Transaction    │──►│  TransactionItem    │  (snapshot of product   │
//! │  │  append-only    │   │  name + both prices │   at time of sale)      │
//! │  └─────────────────┘   └─────────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Warehouse references are soft: nothing cascades. Deleting a warehouse is
//! refused while a product or user still points at it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{
    validate_address, validate_password, validate_price, validate_product_name, validate_stock,
    validate_username, validate_warehouse_name, ValidationResult,
};

// =============================================================================
// Warehouse
// =============================================================================

/// A warehouse (or store room) that holds stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Warehouse {
    pub id: i64,
    pub name: String,
    /// Empty string when no address was given.
    pub address: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Input for creating or updating a warehouse.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WarehouseInput {
    pub name: String,
    #[serde(default)]
    pub address: String,
}

impl WarehouseInput {
    /// Validates and trims the input.
    pub fn validated(self) -> ValidationResult<Self> {
        validate_warehouse_name(&self.name)?;
        validate_address(&self.address)?;
        Ok(WarehouseInput {
            name: self.name.trim().to_string(),
            address: self.address.trim().to_string(),
        })
    }
}

/// What still references a warehouse.
///
/// ## Delete Guard
/// ```text
/// delete_warehouse(3)
///      │
///      ▼
/// usage(3) = { usernames: ["budi"], product_count: 12 }
///      │
///      ▼
/// is_blocking() == true  → refuse, report both lists to the operator
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WarehouseUsage {
    pub usernames: Vec<String>,
    pub product_count: i64,
}

impl WarehouseUsage {
    /// True when any user or product still references the warehouse.
    pub fn is_blocking(&self) -> bool {
        !self.usernames.is_empty() || self.product_count > 0
    }
}

impl std::fmt::Display for WarehouseUsage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if !self.usernames.is_empty() {
            parts.push(format!(
                "{} user(s): {}",
                self.usernames.len(),
                self.usernames.join(", ")
            ));
        }
        if self.product_count > 0 {
            parts.push(format!("{} product(s)", self.product_count));
        }
        write!(f, "{}", parts.join("; "))
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product held in one warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Cost price, used for profit.
    pub purchase_price: Money,
    /// Price charged to the customer.
    pub selling_price: Money,
    /// Units on hand. Never negative after a committed write.
    pub stock: i64,
    pub warehouse_id: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Profit per unit sold.
    #[inline]
    pub fn unit_profit(&self) -> Money {
        self.selling_price - self.purchase_price
    }

    /// Value of the stock on hand at selling price.
    #[inline]
    pub fn stock_value(&self) -> Money {
        self.selling_price.multiply_quantity(self.stock)
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub purchase_price: Money,
    pub selling_price: Money,
    pub stock: i64,
    pub warehouse_id: i64,
}

impl NewProduct {
    /// Validates and trims the input.
    pub fn validated(self) -> ValidationResult<Self> {
        validate_product_name(&self.name)?;
        validate_price("purchase_price", self.purchase_price)?;
        validate_price("selling_price", self.selling_price)?;
        validate_stock(self.stock)?;
        Ok(NewProduct {
            name: self.name.trim().to_string(),
            ..self
        })
    }
}

/// Field update for an existing product.
///
/// The owning warehouse is not part of an update; products stay where they
/// were created.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductUpdate {
    pub name: String,
    pub purchase_price: Money,
    pub selling_price: Money,
    pub stock: i64,
}

impl ProductUpdate {
    /// Validates and trims the input.
    pub fn validated(self) -> ValidationResult<Self> {
        validate_product_name(&self.name)?;
        validate_price("purchase_price", self.purchase_price)?;
        validate_price("selling_price", self.selling_price)?;
        validate_stock(self.stock)?;
        Ok(ProductUpdate {
            name: self.name.trim().to_string(),
            ..self
        })
    }
}

/// One row of a product export document.
///
/// `id: None` means "create"; `Some(id)` means "update that product".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub purchase_price: Money,
    pub selling_price: Money,
    pub stock: i64,
    pub warehouse_id: i64,
}

impl From<&Product> for ProductRecord {
    fn from(p: &Product) -> Self {
        ProductRecord {
            id: Some(p.id),
            name: p.name.clone(),
            purchase_price: p.purchase_price,
            selling_price: p.selling_price,
            stock: p.stock,
            warehouse_id: p.warehouse_id,
        }
    }
}

/// Portable product list used for export and import.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductExport {
    #[ts(as = "String")]
    pub exported_at: DateTime<Utc>,
    pub products: Vec<ProductRecord>,
}

/// Counts returned after an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImportOutcome {
    pub created: u64,
    pub updated: u64,
}

// =============================================================================
// Role
// =============================================================================

/// What a user is allowed to do.
///
/// Stored as lowercase text. `user` is accepted as an older spelling of
/// `staff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access to every warehouse and all management menus.
    Admin,
    /// Cashier. May be scoped to a single warehouse.
    #[serde(alias = "user")]
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "staff" | "user" => Ok(Role::Staff),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec!["admin".to_string(), "staff".to_string()],
            }),
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// A user as shown to operators. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
    /// `None` means access to every warehouse.
    pub warehouse_id: Option<i64>,
    /// Joined for display; `None` when unscoped or the warehouse is gone.
    pub warehouse_name: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl User {
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Input for registering a user.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub warehouse_id: Option<i64>,
}

impl NewUser {
    /// Validates and trims the username. The password is kept verbatim.
    pub fn validated(self) -> ValidationResult<Self> {
        validate_username(&self.username)?;
        validate_password(&self.password)?;
        Ok(NewUser {
            username: self.username.trim().to_string(),
            ..self
        })
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A committed sale. Append-only: never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub warehouse_id: i64,
    pub total: Money,
    pub profit: Money,
    pub payment: Money,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "change_due"))]
    pub change: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<TransactionItem>,
}

impl Transaction {
    /// Human-facing transaction number, e.g. `TRX-000042`.
    pub fn number(&self) -> String {
        format!("TRX-{:06}", self.id)
    }
}

/// A line of a committed sale.
///
/// ## Snapshot Pattern
/// Product name and both prices are copied at the time of sale. Later edits
/// to the product do not change history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TransactionItem {
    pub id: i64,
    pub transaction_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub purchase_price: Money,
    pub selling_price: Money,
    pub subtotal: Money,
    pub profit: Money,
}

/// A requested sale line: which product and how many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRequestItem {
    pub product_id: i64,
    pub quantity: i64,
}

/// A requested sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRequest {
    pub items: Vec<SaleRequestItem>,
    pub payment: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================
