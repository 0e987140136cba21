//! # Transaction Menu
//!
//! ```text
//! browse ──► add to cart ──► view / remove ──► pay ──► receipt ──► save?
//!                 │
//!                 └─ product must be visible to the session and the
//!                    quantity must fit the stock not already in the cart
//! ```
//!
//! The cart only lives in this menu. Stock is re-checked when the sale is
//! posted, so a cart built from a stale listing can still be refused.

use std::fs;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use tracing::{info, warn};

use kasir_core::receipt::truncate;
use kasir_core::{Cart, DailySummary};
use kasir_service::{Receipt, Session};

use crate::app::App;
use crate::menus::local_time;

const SALE_MENU: &[(&str, &str)] = &[
    ("1", "Product list"),
    ("2", "Add to cart"),
    ("3", "View cart"),
    ("4", "Remove from cart"),
    ("5", "Pay"),
    ("6", "Today's sales"),
    ("0", "Back"),
];

impl<R: BufRead, W: Write> App<R, W> {
    pub(crate) async fn sale_menu(&mut self, session: &Session) -> anyhow::Result<()> {
        let mut cart = Cart::new();

        loop {
            let title = format!("NEW TRANSACTION ({} line(s), {})", cart.len(), cart.total());
            let choice = self.menu(&title, SALE_MENU)?;

            match choice.as_str() {
                "1" => self.browse_products(session).await?,
                "2" => self.add_to_cart(session, &mut cart).await?,
                "3" => self.show_cart(&cart)?,
                "4" => self.remove_from_cart(&mut cart)?,
                "5" => self.checkout(session, &mut cart).await?,
                "6" => self.todays_sales(session).await?,
                "0" => {
                    if cart.is_empty() || self.console.confirm("Discard the cart")? {
                        return Ok(());
                    }
                }
                _ => self.console.say("Unknown choice.")?,
            }
        }
    }

    async fn add_to_cart(&mut self, session: &Session, cart: &mut Cart) -> anyhow::Result<()> {
        let id = self.console.prompt_number("Product ID: ")?;
        let product = match self.kasir.products().get(session, id).await {
            Ok(product) => product,
            Err(e) => return self.show_error(e),
        };

        let available = product.stock - cart.quantity_of(product.id);
        self.console.say(format!(
            "{} @ {} ({} available)",
            product.name, product.selling_price, available
        ))?;

        let quantity = self.console.prompt_number("Quantity: ")?;
        match cart.add(&product, quantity) {
            Ok(()) => self
                .console
                .say(format!("Added {} x {}.", quantity, product.name)),
            Err(e) => self.console.say(format!("Error: {}", e)),
        }
    }

    fn show_cart(&mut self, cart: &Cart) -> anyhow::Result<()> {
        if cart.is_empty() {
            return self.console.say("Cart is empty.");
        }

        self.console.say(format!(
            "\n{:<3} {:<30} {:>5} {:>14} {:>14}",
            "#", "Product", "Qty", "Price", "Subtotal"
        ))?;
        for (i, line) in cart.lines().iter().enumerate() {
            self.console.say(format!(
                "{:<3} {:<30} {:>5} {:>14} {:>14}",
                i + 1,
                truncate(&line.product.name, 30),
                line.quantity,
                line.product.selling_price.to_string(),
                line.subtotal().to_string()
            ))?;
        }
        self.console.say(format!("{:>70}", format!("TOTAL {}", cart.total())))
    }

    fn remove_from_cart(&mut self, cart: &mut Cart) -> anyhow::Result<()> {
        self.show_cart(cart)?;
        if cart.is_empty() {
            return Ok(());
        }

        let position = self.console.prompt_number("Line to remove: ")?;
        match cart.remove_line(usize::try_from(position).unwrap_or(0)) {
            Ok(line) => self.console.say(format!("Removed {}.", line.product.name)),
            Err(e) => self.console.say(format!("Error: {}", e)),
        }
    }

    async fn checkout(&mut self, session: &Session, cart: &mut Cart) -> anyhow::Result<()> {
        if cart.is_empty() {
            return self.console.say("Cart is empty.");
        }
        self.show_cart(cart)?;

        let payment = self.console.prompt_money("Payment: Rp ")?;
        let transaction = match self
            .kasir
            .transactions()
            .post(session, cart.to_request(payment))
            .await
        {
            Ok(transaction) => transaction,
            Err(e) => return self.show_error(e),
        };
        cart.clear();

        let receipt = match self.kasir.transactions().receipt(session, &transaction).await {
            Ok(receipt) => receipt,
            Err(e) => return self.show_error(e),
        };
        self.console.say(&receipt.text)?;

        if self.console.confirm("Save receipt")? {
            match self.save_receipt(&receipt) {
                Ok(path) => self.console.say(format!("Saved to {}", path.display()))?,
                Err(e) => {
                    warn!(error = %e, "Could not save receipt");
                    self.console.say(format!("Error: {:#}", e))?;
                }
            }
        }
        Ok(())
    }

    fn save_receipt(&self, receipt: &Receipt) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(&self.receipts_dir)
            .with_context(|| format!("creating {}", self.receipts_dir.display()))?;
        let path = self.receipts_dir.join(&receipt.file_name);
        fs::write(&path, &receipt.text).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "Receipt saved");
        Ok(path)
    }

    async fn todays_sales(&mut self, session: &Session) -> anyhow::Result<()> {
        let transactions = match self.kasir.transactions().list_today(session).await {
            Ok(list) => list,
            Err(e) => return self.show_error(e),
        };

        self.console.say("\n--- TODAY'S SALES ---")?;
        if transactions.is_empty() {
            return self.console.say("No sales yet today.");
        }

        let offset = self.kasir.offset();
        for t in &transactions {
            self.console.say(format!(
                "{}  {}  {:>14}  {} item(s)",
                t.number(),
                local_time(t.created_at, offset),
                t.total.to_string(),
                t.items.len()
            ))?;
        }

        let summary = DailySummary::from_transactions(&transactions);
        self.console.say(format!(
            "{} transaction(s), sales {}, profit {}",
            summary.transaction_count, summary.total_sales, summary.total_profit
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::app::testing::*;

    #[tokio::test]
    async fn test_sale_flow_posts_and_saves_receipt() {
        let (kasir, admin) = kasir().await;
        let w = warehouse(&kasir, &admin, "Toko").await;
        let beras = product(&kasir, &admin, "Beras", w.id, 5).await;

        let dir = tempfile::tempdir().unwrap();
        let id = beras.id.to_string();
        let mut ui = app(
            &kasir,
            dir.path(),
            &[
                "2", &id, "2", // add 2 x Beras
                "5", "20.000", "y", // pay exact, save receipt
                "6", // today's sales
                "0",
            ],
        );
        ui.sale_menu(&admin).await.unwrap();

        let out = output(&ui);
        assert!(out.contains("Added 2 x Beras."));
        assert!(out.contains("TRX-000001"));
        assert!(out.contains("1 transaction(s), sales Rp 20.000, profit Rp 8.000"));

        let stock = kasir.products().get(&admin, beras.id).await.unwrap().stock;
        assert_eq!(stock, 3);

        let saved: Vec<_> = std::fs::read_dir(dir.path().join("receipts"))
            .unwrap()
            .collect();
        assert_eq!(saved.len(), 1);
    }

    #[tokio::test]
    async fn test_cart_respects_remaining_stock() {
        let (kasir, admin) = kasir().await;
        let w = warehouse(&kasir, &admin, "Toko").await;
        let kopi = product(&kasir, &admin, "Kopi", w.id, 3).await;

        let dir = tempfile::tempdir().unwrap();
        let id = kopi.id.to_string();
        let mut ui = app(
            &kasir,
            dir.path(),
            &["2", &id, "2", "2", &id, "2", "0", "y"],
        );
        ui.sale_menu(&admin).await.unwrap();

        let out = output(&ui);
        assert!(out.contains("Insufficient stock for Kopi: available 1, requested 2"));
        assert_eq!(kasir.products().get(&admin, kopi.id).await.unwrap().stock, 3);
    }

    #[tokio::test]
    async fn test_short_payment_keeps_cart() {
        let (kasir, admin) = kasir().await;
        let w = warehouse(&kasir, &admin, "Toko").await;
        let teh = product(&kasir, &admin, "Teh", w.id, 5).await;

        let dir = tempfile::tempdir().unwrap();
        let id = teh.id.to_string();
        let mut ui = app(
            &kasir,
            dir.path(),
            &["2", &id, "1", "5", "5.000", "3", "4", "1", "3", "0"],
        );
        ui.sale_menu(&admin).await.unwrap();

        let out = output(&ui);
        assert!(out.contains("less than total"));
        assert!(out.contains("Removed Teh."));
        assert!(out.contains("Cart is empty."));
        assert!(kasir.transactions().list_today(&admin).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scoped_staff_cannot_add_other_warehouse() {
        let (kasir, admin) = kasir().await;
        let a = warehouse(&kasir, &admin, "A").await;
        let b = warehouse(&kasir, &admin, "B").await;
        let in_b = product(&kasir, &admin, "Gula", b.id, 5).await;

        let staff = kasir_service::Session {
            user_id: 999,
            username: "kasir1".to_string(),
            role: kasir_core::Role::Staff,
            warehouse_id: Some(a.id),
        };

        let dir = tempfile::tempdir().unwrap();
        let id = in_b.id.to_string();
        let mut ui = app(&kasir, dir.path(), &["2", &id, "0"]);
        ui.sale_menu(&staff).await.unwrap();

        assert!(output(&ui).contains("Error: Product not found"));
    }
}
