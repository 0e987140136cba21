//! # Product Menus
//!
//! The browser pages through the catalogue for everyone. The management
//! menu is admin only and adds stock summary, CRUD and JSON export/import.
//!
//! ## Browser Keys
//! ```text
//! n  next page       s  search by name
//! p  previous page   c  clear search
//! 3  jump to page 3  q  back
//! ```

use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use tracing::{info, warn};

use kasir_core::receipt::truncate;
use kasir_core::{NewProduct, PageRequest, Product, ProductExport, ProductUpdate};
use kasir_service::Session;

use crate::app::App;

const PRODUCT_MENU: &[(&str, &str)] = &[
    ("1", "Browse products"),
    ("2", "Stock summary"),
    ("3", "Add product"),
    ("4", "Edit product"),
    ("5", "Delete product"),
    ("6", "Export to JSON"),
    ("7", "Import from JSON"),
    ("0", "Back"),
];

impl<R: BufRead, W: Write> App<R, W> {
    pub(crate) async fn product_menu(&mut self, session: &Session) -> anyhow::Result<()> {
        loop {
            match self.menu("PRODUCTS", PRODUCT_MENU)?.as_str() {
                "1" => self.browse_products(session).await?,
                "2" => self.stock_summary(session).await?,
                "3" => self.add_product(session).await?,
                "4" => self.edit_product(session).await?,
                "5" => self.delete_product(session).await?,
                "6" => self.export_products(session).await?,
                "7" => self.import_products(session).await?,
                "0" => return Ok(()),
                _ => self.console.say("Unknown choice.")?,
            }
        }
    }

    pub(crate) async fn browse_products(&mut self, session: &Session) -> anyhow::Result<()> {
        let names = self.warehouse_names(session).await;
        let mut request = PageRequest::default();
        let mut search: Option<String> = None;

        loop {
            let page = match self
                .kasir
                .products()
                .list(session, request, search.as_deref(), None)
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    self.show_error(e)?;
                    search = None;
                    request = PageRequest::default();
                    continue;
                }
            };

            self.console.say("")?;
            if let Some(term) = &search {
                self.console.say(format!("Search: \"{}\"", term))?;
            }
            self.print_products(&page.data, &names)?;
            self.console.say(format!(
                "Page {} of {} ({} product(s))",
                page.meta.current_page,
                page.meta.total_pages.max(1),
                page.meta.total_items
            ))?;

            let answer = self
                .console
                .prompt("[n]ext [p]rev [s]earch [c]lear [number] page [q]uit: ")?;
            match answer.to_lowercase().as_str() {
                "n" if page.has_next() => request = request.with_page(request.page() + 1),
                "n" => self.console.say("Already on the last page.")?,
                "p" if page.has_prev() => request = request.with_page(request.page() - 1),
                "p" => self.console.say("Already on the first page.")?,
                "s" => {
                    let term = self.console.prompt("Name contains: ")?;
                    search = (!term.is_empty()).then_some(term);
                    request = request.with_page(1);
                }
                "c" => {
                    search = None;
                    request = request.with_page(1);
                }
                "q" | "" => return Ok(()),
                other => match other.parse::<i64>() {
                    Ok(n) if n >= 1 && n <= page.meta.total_pages => {
                        request = request.with_page(n)
                    }
                    _ => self.console.say("Unknown choice.")?,
                },
            }
        }
    }

    fn print_products(
        &mut self,
        products: &[Product],
        warehouse_names: &HashMap<i64, String>,
    ) -> anyhow::Result<()> {
        if products.is_empty() {
            return self.console.say("No products found.");
        }

        self.console.say(format!(
            "{:>5}  {:<30} {:>14} {:>7}  {}",
            "ID", "Name", "Price", "Stock", "Warehouse"
        ))?;
        for p in products {
            let warehouse = warehouse_names
                .get(&p.warehouse_id)
                .cloned()
                .unwrap_or_else(|| format!("#{}", p.warehouse_id));
            self.console.say(format!(
                "{:>5}  {:<30} {:>14} {:>7}  {}",
                p.id,
                truncate(&p.name, 30),
                p.selling_price.to_string(),
                p.stock,
                warehouse
            ))?;
        }
        Ok(())
    }

    /// Warehouse id to name, empty when the lookup fails.
    async fn warehouse_names(&self, session: &Session) -> HashMap<i64, String> {
        match self.kasir.warehouses().list(session).await {
            Ok(list) => list.into_iter().map(|w| (w.id, w.name)).collect(),
            Err(e) => {
                warn!(error = %e, "Could not load warehouse names");
                HashMap::new()
            }
        }
    }

    async fn stock_summary(&mut self, session: &Session) -> anyhow::Result<()> {
        let summary = match self.kasir.products().stock_summary(session).await {
            Ok(summary) => summary,
            Err(e) => return self.show_error(e),
        };

        self.console.say("\n--- STOCK SUMMARY ---")?;
        self.console.say(format!(
            "{:<25} {:>9} {:>9} {:>18}",
            "Warehouse", "Products", "Units", "Value"
        ))?;
        for w in &summary.warehouses {
            self.console.say(format!(
                "{:<25} {:>9} {:>9} {:>18}",
                truncate(&w.warehouse_name, 25),
                w.product_count,
                w.total_stock,
                w.stock_value.to_string()
            ))?;
        }
        self.console.say(format!(
            "{:<25} {:>9} {:>9} {:>18}",
            "TOTAL",
            summary.total_products,
            summary.total_stock,
            summary.total_value.to_string()
        ))
    }

    async fn add_product(&mut self, session: &Session) -> anyhow::Result<()> {
        self.console.say("\n--- ADD PRODUCT ---")?;
        self.list_warehouses(session).await?;

        let input = NewProduct {
            name: self.console.prompt("Name: ")?,
            purchase_price: self.console.prompt_money("Purchase price: Rp ")?,
            selling_price: self.console.prompt_money("Selling price: Rp ")?,
            stock: self.console.prompt_number("Stock: ")?,
            warehouse_id: self.console.prompt_number("Warehouse ID: ")?,
        };

        match self.kasir.products().create(session, input).await {
            Ok(p) => self.console.say(format!("Product {} created with ID {}.", p.name, p.id)),
            Err(e) => self.show_error(e),
        }
    }

    async fn edit_product(&mut self, session: &Session) -> anyhow::Result<()> {
        let id = self.console.prompt_number("Product ID: ")?;
        let current = match self.kasir.products().get(session, id).await {
            Ok(p) => p,
            Err(e) => return self.show_error(e),
        };
        self.console.say("Leave a field empty to keep its value.")?;

        let name = self.console.prompt(&format!("Name [{}]: ", current.name))?;
        let purchase_price = self
            .console
            .prompt_optional_money(&format!("Purchase price [{}]: Rp ", current.purchase_price))?;
        let selling_price = self
            .console
            .prompt_optional_money(&format!("Selling price [{}]: Rp ", current.selling_price))?;
        let stock = self
            .console
            .prompt_optional_number(&format!("Stock [{}]: ", current.stock))?;

        let update = ProductUpdate {
            name: if name.is_empty() { current.name } else { name },
            purchase_price: purchase_price.unwrap_or(current.purchase_price),
            selling_price: selling_price.unwrap_or(current.selling_price),
            stock: stock.unwrap_or(current.stock),
        };

        match self.kasir.products().update(session, id, update).await {
            Ok(p) => self.console.say(format!("Product {} updated.", p.name)),
            Err(e) => self.show_error(e),
        }
    }

    async fn delete_product(&mut self, session: &Session) -> anyhow::Result<()> {
        let id = self.console.prompt_number("Product ID: ")?;
        let product = match self.kasir.products().get(session, id).await {
            Ok(p) => p,
            Err(e) => return self.show_error(e),
        };

        if !self.console.confirm(&format!("Delete {}", product.name))? {
            return self.console.say("Cancelled.");
        }

        match self.kasir.products().delete(session, id).await {
            Ok(()) => self.console.say(format!("Product {} deleted.", product.name)),
            Err(e) => self.show_error(e),
        }
    }

    async fn export_products(&mut self, session: &Session) -> anyhow::Result<()> {
        let document = match self.kasir.products().export(session).await {
            Ok(document) => document,
            Err(e) => return self.show_error(e),
        };

        match self.write_export(&document) {
            Ok(path) => self.console.say(format!(
                "Exported {} product(s) to {}",
                document.products.len(),
                path.display()
            )),
            Err(e) => {
                warn!(error = %e, "Export failed");
                self.console.say(format!("Error: {:#}", e))
            }
        }
    }

    fn write_export(&self, document: &ProductExport) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(&self.exports_dir)
            .with_context(|| format!("creating {}", self.exports_dir.display()))?;

        let stamp = Utc::now()
            .with_timezone(&self.kasir.offset())
            .format("%Y%m%d_%H%M%S");
        let path = self.exports_dir.join(format!("products_{}.json", stamp));

        let json = serde_json::to_string_pretty(document)?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "Products exported");
        Ok(path)
    }

    async fn import_products(&mut self, session: &Session) -> anyhow::Result<()> {
        let path = self.console.prompt("JSON file path: ")?;
        if path.is_empty() {
            return self.console.say("Cancelled.");
        }

        let document = match read_export(Path::new(&path)) {
            Ok(document) => document,
            Err(e) => return self.console.say(format!("Error: {:#}", e)),
        };

        match self.kasir.products().import(session, document).await {
            Ok(outcome) => self.console.say(format!(
                "Import done: {} created, {} updated.",
                outcome.created, outcome.updated
            )),
            Err(e) => self.show_error(e),
        }
    }
}

fn read_export(path: &Path) -> anyhow::Result<ProductExport> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}
