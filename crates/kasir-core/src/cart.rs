//! # Cart
//!
//! The transient cart held while a cashier builds a sale.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Menu Action              Cart Method            State Change           │
//! │  ───────────              ───────────            ────────────           │
//! │                                                                         │
//! │  Add product ───────────► add() ───────────────► merge or push line    │
//! │                                                                         │
//! │  Remove line N ─────────► remove_line(N) ──────► lines.remove(N-1)     │
//! │                                                                         │
//! │  Pay ───────────────────► to_request() ────────► SaleRequest           │
//! │                                                                         │
//! │  Cancel ────────────────► clear() ─────────────► lines.clear()         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart is never persisted. Stock checks here are advisory: the
//! authoritative check is the guarded decrement inside the posting unit of
//! work.

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Product, SaleRequest, SaleRequestItem};
use crate::validation::validate_quantity;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// One line of the cart.
///
/// The product is a snapshot taken when it was added, so the cart displays
/// consistent prices while the sale is being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product: Product,
    pub quantity: i64,
}

impl CartLine {
    /// Selling price × quantity.
    pub fn subtotal(&self) -> Money {
        self.product.selling_price.multiply_quantity(self.quantity)
    }
}

/// The cart.
///
/// ## Invariants
/// - Lines are unique by product id (adding the same product merges)
/// - Every quantity is in 1..=MAX_ITEM_QUANTITY
/// - At most MAX_CART_ITEMS lines
/// - A line's quantity never exceeds the stock seen when it was added
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Quantity of a product already in the cart.
    pub fn quantity_of(&self, product_id: i64) -> i64 {
        self.lines
            .iter()
            .find(|l| l.product.id == product_id)
            .map(|l| l.quantity)
            .unwrap_or(0)
    }

    /// Adds a product, or increases its quantity if already present.
    ///
    /// ## Example
    /// ```text
    /// stock = 5, cart has 3 of the product
    /// add(product, 3)  → InsufficientStock { available: 2, requested: 3 }
    /// add(product, 2)  → Ok, line quantity = 5
    /// ```
    pub fn add(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        let in_cart = self.quantity_of(product.id);
        let available = product.stock - in_cart;
        if quantity > available {
            return Err(CoreError::InsufficientStock {
                product: product.name.clone(),
                available: available.max(0),
                requested: quantity,
            });
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product.id) {
            let new_qty = line.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            line.quantity = new_qty;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.lines.push(CartLine {
            product: product.clone(),
            quantity,
        });
        Ok(())
    }

    /// Removes a line by its 1-based position as shown to the cashier.
    pub fn remove_line(&mut self, position: usize) -> CoreResult<CartLine> {
        if position == 0 || position > self.lines.len() {
            return Err(CoreError::NoSuchLine(position));
        }
        Ok(self.lines.remove(position - 1))
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Sum of line subtotals.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Turns the cart into a sale request with the given payment.
    pub fn to_request(&self, payment: Money) -> SaleRequest {
        SaleRequest {
            items: self
                .lines
                .iter()
                .map(|l| SaleRequestItem {
                    product_id: l.product.id,
                    quantity: l.quantity,
                })
                .collect(),
            payment,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: i64, selling: i64, stock: i64) -> Product {
        Product {
            id,
            name: format!("Produk {}", id),
            purchase_price: Money::from_rupiah(selling / 2),
            selling_price: Money::from_rupiah(selling),
            stock,
            warehouse_id: 1,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_merges_same_product() {
        let mut cart = Cart::new();
        let p = product(1, 5_000, 10);

        cart.add(&p, 2).unwrap();
        cart.add(&p, 3).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(1), 5);
        assert_eq!(cart.total().rupiah(), 25_000);
    }

    #[test]
    fn test_add_respects_stock_already_in_cart() {
        let mut cart = Cart::new();
        let p = product(1, 5_000, 5);

        cart.add(&p, 3).unwrap();
        let err = cart.add(&p, 3).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 2,
                requested: 3,
                ..
            }
        ));
        assert!(cart.add(&p, 2).is_ok());
    }

    #[test]
    fn test_add_rejects_bad_quantity() {
        let mut cart = Cart::new();
        let p = product(1, 5_000, 5);

        assert!(matches!(cart.add(&p, 0), Err(CoreError::Validation(_))));
        assert!(matches!(cart.add(&p, -2), Err(CoreError::Validation(_))));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_line_is_one_based() {
        let mut cart = Cart::new();
        cart.add(&product(1, 1_000, 5), 1).unwrap();
        cart.add(&product(2, 2_000, 5), 1).unwrap();

        let removed = cart.remove_line(1).unwrap();
        assert_eq!(removed.product.id, 1);
        assert_eq!(cart.lines()[0].product.id, 2);

        assert!(matches!(cart.remove_line(0), Err(CoreError::NoSuchLine(0))));
        assert!(matches!(cart.remove_line(5), Err(CoreError::NoSuchLine(5))));
    }

    #[test]
    fn test_to_request() {
        let mut cart = Cart::new();
        cart.add(&product(7, 1_000, 5), 2).unwrap();

        let request = cart.to_request(Money::from_rupiah(5_000));
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items[0].product_id, 7);
        assert_eq!(request.items[0].quantity, 2);
        assert_eq!(request.payment.rupiah(), 5_000);
    }
}
