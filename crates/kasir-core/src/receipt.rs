//! # Receipt
//!
//! Plain-text receipt for a committed transaction.
//!
//! ```text
//! ═══════════════════════════════════════════
//!                  RECEIPT
//! ═══════════════════════════════════════════
//! Transaction  : TRX-000001
//! Date         : 17-08-2025 10:15:00
//! Cashier      : sari
//! Warehouse    : Gudang Utama
//! ───────────────────────────────────────────
//! Beras 5kg
//!   2 x Rp 10.000 = Rp 20.000
//! ───────────────────────────────────────────
//! TOTAL        :     Rp 20.000
//! PAID         :     Rp 20.000
//! CHANGE       :          Rp 0
//! ═══════════════════════════════════════════
//! ```

use std::fmt::Write;

use chrono::FixedOffset;

use crate::types::Transaction;

const DOUBLE_RULE: &str = "═══════════════════════════════════════════";
const SINGLE_RULE: &str = "───────────────────────────────────────────";

/// Everything a receipt shows.
#[derive(Debug, Clone)]
pub struct ReceiptView<'a> {
    pub transaction: &'a Transaction,
    pub cashier: &'a str,
    pub warehouse_name: Option<&'a str>,
    /// Business time zone used for the printed date.
    pub offset: FixedOffset,
}

impl ReceiptView<'_> {
    /// Renders the receipt text.
    pub fn render(&self) -> String {
        let t = self.transaction;
        let local = t.created_at.with_timezone(&self.offset);
        let mut out = String::new();

        // Writing to a String cannot fail.
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", DOUBLE_RULE);
        let _ = writeln!(out, "{:^43}", "RECEIPT");
        let _ = writeln!(out, "{}", DOUBLE_RULE);
        let _ = writeln!(out, "Transaction  : {}", t.number());
        let _ = writeln!(out, "Date         : {}", local.format("%d-%m-%Y %H:%M:%S"));
        let _ = writeln!(out, "Cashier      : {}", self.cashier);
        if let Some(name) = self.warehouse_name {
            let _ = writeln!(out, "Warehouse    : {}", name);
        }
        let _ = writeln!(out, "{}", SINGLE_RULE);

        for item in &t.items {
            let _ = writeln!(out, "{}", truncate(&item.product_name, 30));
            let _ = writeln!(
                out,
                "  {} x {} = {}",
                item.quantity, item.selling_price, item.subtotal
            );
        }

        let _ = writeln!(out, "{}", SINGLE_RULE);
        let _ = writeln!(out, "TOTAL        : {:>13}", t.total);
        let _ = writeln!(out, "PAID         : {:>13}", t.payment);
        let _ = writeln!(out, "CHANGE       : {:>13}", t.change);
        let _ = writeln!(out, "{}", DOUBLE_RULE);
        let _ = writeln!(out, "{:^43}", "Thank you for shopping");
        let _ = writeln!(out, "{}", DOUBLE_RULE);

        out
    }

    /// `receipt_TRX-000001_20250817_101500.txt`
    pub fn file_name(&self) -> String {
        let local = self.transaction.created_at.with_timezone(&self.offset);
        format!(
            "receipt_{}_{}.txt",
            self.transaction.number(),
            local.format("%Y%m%d_%H%M%S")
        )
    }
}

/// Shortens text to `max` characters, ending with `...` when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max <= 3 {
        return text.chars().take(max).collect();
    }
    let mut cut: String = text.chars().take(max - 3).collect();
    cut.push_str("...");
    cut
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::TransactionItem;
    use chrono::{TimeZone, Utc};

    fn sample() -> Transaction {
        Transaction {
            id: 1,
            user_id: 2,
            warehouse_id: 1,
            total: Money::from_rupiah(20_000),
            profit: Money::from_rupiah(8_000),
            payment: Money::from_rupiah(50_000),
            change: Money::from_rupiah(30_000),
            created_at: Utc.with_ymd_and_hms(2025, 8, 17, 3, 15, 0).unwrap(),
            items: vec![TransactionItem {
                id: 1,
                transaction_id: 1,
                product_id: 9,
                product_name: "Beras 5kg".to_string(),
                quantity: 2,
                purchase_price: Money::from_rupiah(6_000),
                selling_price: Money::from_rupiah(10_000),
                subtotal: Money::from_rupiah(20_000),
                profit: Money::from_rupiah(8_000),
            }],
        }
    }

    #[test]
    fn test_render_contains_lines_and_totals() {
        let trx = sample();
        let view = ReceiptView {
            transaction: &trx,
            cashier: "sari",
            warehouse_name: Some("Gudang Utama"),
            offset: FixedOffset::east_opt(7 * 3600).unwrap(),
        };
        let text = view.render();

        assert!(text.contains("TRX-000001"));
        assert!(text.contains("17-08-2025 10:15:00"));
        assert!(text.contains("Cashier      : sari"));
        assert!(text.contains("Warehouse    : Gudang Utama"));
        assert!(text.contains("  2 x Rp 10.000 = Rp 20.000"));
        assert!(text.contains("TOTAL        :     Rp 20.000"));
        assert!(text.contains("CHANGE       :     Rp 30.000"));
    }

    #[test]
    fn test_render_without_warehouse() {
        let trx = sample();
        let view = ReceiptView {
            transaction: &trx,
            cashier: "admin",
            warehouse_name: None,
            offset: FixedOffset::east_opt(0).unwrap(),
        };
        assert!(!view.render().contains("Warehouse"));
    }

    #[test]
    fn test_file_name_uses_local_time() {
        let trx = sample();
        let view = ReceiptView {
            transaction: &trx,
            cashier: "sari",
            warehouse_name: None,
            offset: FixedOffset::east_opt(7 * 3600).unwrap(),
        };
        assert_eq!(view.file_name(), "receipt_TRX-000001_20250817_101500.txt");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Kopi", 10), "Kopi");
        assert_eq!(truncate("Kopi Kapal Api Special Mix", 10), "Kopi Ka...");
        assert_eq!(truncate("abcdef", 3), "abc");
    }
}
