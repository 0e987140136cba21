//! # Menu Loop
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  run()                                                                  │
//! │   └─► login() ──► session_menu(&session) ──► logout ──► login() ...    │
//! │         │                                                               │
//! │         └─ empty username or EOF ends the program                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One `Session` lives between login and logout. Every menu receives it
//! explicitly; nothing about the logged-in user is global.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use tracing::{error, info};

use kasir_service::{ErrorKind, Kasir, ServiceError, Session};

use crate::console::Console;

const BANNER: &str = r#"
===========================================
              KASIR  -  POS
==========================================="#;

const ADMIN_MENU: &[(&str, &str)] = &[
    ("1", "New transaction"),
    ("2", "Products"),
    ("3", "Daily report"),
    ("4", "Users"),
    ("5", "Warehouses"),
    ("6", "Change password"),
    ("0", "Logout"),
];

const STAFF_MENU: &[(&str, &str)] = &[
    ("1", "New transaction"),
    ("2", "Product list"),
    ("3", "Daily report"),
    ("4", "Change password"),
    ("0", "Logout"),
];

pub struct App<R, W> {
    pub(crate) kasir: Kasir,
    pub(crate) console: Console<R, W>,
    pub(crate) receipts_dir: PathBuf,
    pub(crate) exports_dir: PathBuf,
}

impl<R: BufRead, W: Write> App<R, W> {
    pub fn new(
        kasir: Kasir,
        console: Console<R, W>,
        receipts_dir: PathBuf,
        exports_dir: PathBuf,
    ) -> Self {
        App {
            kasir,
            console,
            receipts_dir,
            exports_dir,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        self.console.say(BANNER)?;

        while let Some(session) = self.login().await? {
            info!(username = %session.username, role = %session.role, "Logged in");
            self.session_menu(&session).await?;
            info!(username = %session.username, "Logged out");
            self.console.say("Logged out.")?;
        }

        self.console.say("Goodbye.")?;
        Ok(())
    }

    /// Asks for credentials until they check out or the operator gives up.
    async fn login(&mut self) -> anyhow::Result<Option<Session>> {
        loop {
            self.console.say("\n--- LOGIN ---")?;
            let username = self.console.prompt("Username (empty to quit): ")?;
            if username.is_empty() {
                return Ok(None);
            }
            let password = self.console.prompt("Password: ")?;

            match self.kasir.auth().authenticate(&username, &password).await {
                Ok(session) => {
                    self.console.say(format!(
                        "Welcome, {} ({}).",
                        session.username, session.role
                    ))?;
                    return Ok(Some(session));
                }
                Err(e) => {
                    self.show_error(e)?;
                    if !self.console.confirm("Try again")? {
                        return Ok(None);
                    }
                }
            }
        }
    }

    async fn session_menu(&mut self, session: &Session) -> anyhow::Result<()> {
        loop {
            let admin = session.is_admin();
            let items = if admin { ADMIN_MENU } else { STAFF_MENU };
            let title = format!("MAIN MENU ({})", session.username);
            let choice = self.menu(&title, items)?;

            match (admin, choice.as_str()) {
                (_, "1") => self.sale_menu(session).await?,
                (true, "2") => self.product_menu(session).await?,
                (false, "2") => self.browse_products(session).await?,
                (_, "3") => self.report_menu(session).await?,
                (true, "4") => self.user_menu(session).await?,
                (true, "5") => self.warehouse_menu(session).await?,
                (true, "6") | (false, "4") => self.change_password(session).await?,
                (_, "0") => return Ok(()),
                _ => self.console.say("Unknown choice.")?,
            }
        }
    }

    async fn change_password(&mut self, session: &Session) -> anyhow::Result<()> {
        self.console.say("\n--- CHANGE PASSWORD ---")?;
        let old = self.console.prompt("Current password: ")?;
        let new = self.console.prompt("New password: ")?;
        let again = self.console.prompt("Repeat new password: ")?;
        if new != again {
            return self.console.say("Passwords do not match.");
        }

        match self.kasir.auth().change_password(session, &old, &new).await {
            Ok(()) => self.console.say("Password changed."),
            Err(e) => self.show_error(e),
        }
    }

    /// Prints a titled menu and returns the trimmed choice.
    pub(crate) fn menu(&mut self, title: &str, items: &[(&str, &str)]) -> anyhow::Result<String> {
        self.console.say(format!("\n=== {} ===", title))?;
        for (key, label) in items {
            self.console.say(format!("{}. {}", key, label))?;
        }
        self.console.prompt("Choice: ")
    }

    /// Reports a failed operation and carries on with the menu.
    pub(crate) fn show_error(&mut self, err: ServiceError) -> anyhow::Result<()> {
        if err.kind() == ErrorKind::Internal {
            error!(error = %err, "Operation failed");
        }
        self.console.say(format!("Error: {}", err))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::io::Cursor;
    use std::sync::Arc;

    use chrono::FixedOffset;
    use kasir_core::{Money, NewProduct, Product, Warehouse, WarehouseInput};
    use kasir_db::{Database, DbConfig};
    use kasir_service::Passwords;

    use super::*;

    pub type TestApp = App<Cursor<Vec<u8>>, Vec<u8>>;

    /// In-memory Kasir with `admin`/`admin123`.
    pub async fn kasir() -> (Kasir, Session) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let offset = FixedOffset::east_opt(7 * 3600).unwrap();
        let kasir = Kasir::new(db, offset, Arc::new(Passwords::low_cost().unwrap()));
        kasir
            .auth()
            .ensure_bootstrap_admin("admin", "admin123")
            .await
            .unwrap();
        let admin = kasir.auth().authenticate("admin", "admin123").await.unwrap();
        (kasir, admin)
    }

    /// An app that reads the given lines and writes into a buffer.
    pub fn app(kasir: &Kasir, dir: &std::path::Path, input: &[&str]) -> TestApp {
        let mut text = input.join("\n");
        text.push('\n');
        App::new(
            kasir.clone(),
            Console::new(Cursor::new(text.into_bytes()), Vec::new()),
            dir.join("receipts"),
            dir.join("exports"),
        )
    }

    pub fn output(app: &TestApp) -> String {
        String::from_utf8_lossy(app.console.output()).into_owned()
    }

    pub async fn warehouse(kasir: &Kasir, admin: &Session, name: &str) -> Warehouse {
        kasir
            .warehouses()
            .create(
                admin,
                WarehouseInput {
                    name: name.to_string(),
                    address: String::new(),
                },
            )
            .await
            .unwrap()
    }

    /// Sells at Rp 10.000, costs Rp 6.000.
    pub async fn product(
        kasir: &Kasir,
        admin: &Session,
        name: &str,
        warehouse_id: i64,
        stock: i64,
    ) -> Product {
        kasir
            .products()
            .create(
                admin,
                NewProduct {
                    name: name.to_string(),
                    purchase_price: Money::from_rupiah(6_000),
                    selling_price: Money::from_rupiah(10_000),
                    stock,
                    warehouse_id,
                },
            )
            .await
            .unwrap()
    }
}
