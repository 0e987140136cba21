use std::io::{BufRead, Write};

use kasir_core::receipt::truncate;
use kasir_core::WarehouseInput;
use kasir_service::{ServiceError, Session};

use crate::app::App;

const WAREHOUSE_MENU: &[(&str, &str)] = &[
    ("1", "List warehouses"),
    ("2", "Add warehouse"),
    ("3", "Edit warehouse"),
    ("4", "Delete warehouse"),
    ("0", "Back"),
];

impl<R: BufRead, W: Write> App<R, W> {
    pub(crate) async fn warehouse_menu(&mut self, session: &Session) -> anyhow::Result<()> {
        loop {
            match self.menu("WAREHOUSES", WAREHOUSE_MENU)?.as_str() {
                "1" => self.list_warehouses(session).await?,
                "2" => self.add_warehouse(session).await?,
                "3" => self.edit_warehouse(session).await?,
                "4" => self.delete_warehouse(session).await?,
                "0" => return Ok(()),
                _ => self.console.say("Unknown choice.")?,
            }
        }
    }

    pub(crate) async fn list_warehouses(&mut self, session: &Session) -> anyhow::Result<()> {
        let warehouses = match self.kasir.warehouses().list(session).await {
            Ok(list) => list,
            Err(e) => return self.show_error(e),
        };

        if warehouses.is_empty() {
            return self.console.say("No warehouses yet.");
        }

        self.console
            .say(format!("{:>5}  {:<25} {}", "ID", "Name", "Address"))?;
        for w in &warehouses {
            self.console.say(format!(
                "{:>5}  {:<25} {}",
                w.id,
                truncate(&w.name, 25),
                w.address
            ))?;
        }
        Ok(())
    }

    async fn add_warehouse(&mut self, session: &Session) -> anyhow::Result<()> {
        let input = WarehouseInput {
            name: self.console.prompt("Name: ")?,
            address: self.console.prompt("Address (optional): ")?,
        };

        match self.kasir.warehouses().create(session, input).await {
            Ok(w) => self
                .console
                .say(format!("Warehouse {} created with ID {}.", w.name, w.id)),
            Err(e) => self.show_error(e),
        }
    }

    async fn edit_warehouse(&mut self, session: &Session) -> anyhow::Result<()> {
        let id = self.console.prompt_number("Warehouse ID: ")?;
        let current = match self.kasir.warehouses().get(session, id).await {
            Ok(w) => w,
            Err(e) => return self.show_error(e),
        };
        self.console.say("Leave a field empty to keep its value.")?;

        let name = self.console.prompt(&format!("Name [{}]: ", current.name))?;
        let address = self
            .console
            .prompt(&format!("Address [{}]: ", current.address))?;

        let input = WarehouseInput {
            name: if name.is_empty() { current.name } else { name },
            address: if address.is_empty() {
                current.address
            } else {
                address
            },
        };

        match self.kasir.warehouses().update(session, id, input).await {
            Ok(w) => self.console.say(format!("Warehouse {} updated.", w.name)),
            Err(e) => self.show_error(e),
        }
    }

    async fn delete_warehouse(&mut self, session: &Session) -> anyhow::Result<()> {
        let id = self.console.prompt_number("Warehouse ID: ")?;
        let warehouse = match self.kasir.warehouses().get(session, id).await {
            Ok(w) => w,
            Err(e) => return self.show_error(e),
        };

        if !self.console.confirm(&format!("Delete {}", warehouse.name))? {
            return self.console.say("Cancelled.");
        }

        match self.kasir.warehouses().delete(session, id).await {
            Ok(()) => self
                .console
                .say(format!("Warehouse {} deleted.", warehouse.name)),
            Err(ServiceError::WarehouseInUse { usage }) => {
                self.console
                    .say(format!("{} is still in use and was not deleted:", warehouse.name))?;
                for username in &usage.usernames {
                    self.console.say(format!("  - user {}", username))?;
                }
                if usage.product_count > 0 {
                    self.console
                        .say(format!("  - {} product(s)", usage.product_count))?;
                }
                Ok(())
            }
            Err(e) => self.show_error(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use kasir_core::{NewUser, Role};

    use crate::app::testing::*;

    #[tokio::test]
    async fn test_add_and_edit() {
        let (kasir, admin) = kasir().await;
        let dir = tempfile::tempdir().unwrap();
        let mut ui = app(
            &kasir,
            dir.path(),
            &["2", "Toko Depan", "Jl. Merdeka 1", "3", "1", "", "Jl. Merdeka 2", "1", "0"],
        );
        ui.warehouse_menu(&admin).await.unwrap();

        let out = output(&ui);
        assert!(out.contains("Warehouse Toko Depan created with ID 1."));
        assert!(out.contains("Warehouse Toko Depan updated."));
        assert!(out.contains("Jl. Merdeka 2"));
    }

    #[tokio::test]
    async fn test_blocked_delete_lists_blockers() {
        let (kasir, admin) = kasir().await;
        let w = warehouse(&kasir, &admin, "Gudang").await;
        product(&kasir, &admin, "Beras", w.id, 5).await;
        kasir
            .users()
            .register(
                &admin,
                NewUser {
                    username: "budi".to_string(),
                    password: "rahasia".to_string(),
                    role: Role::Staff,
                    warehouse_id: Some(w.id),
                },
            )
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let id = w.id.to_string();
        let mut ui = app(&kasir, dir.path(), &["4", &id, "y", "0"]);
        ui.warehouse_menu(&admin).await.unwrap();

        let out = output(&ui);
        assert!(out.contains("Gudang is still in use and was not deleted:"));
        assert!(out.contains("  - user budi"));
        assert!(out.contains("  - 1 product(s)"));
        assert_eq!(kasir.warehouses().list(&admin).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_unused() {
        let (kasir, admin) = kasir().await;
        let w = warehouse(&kasir, &admin, "Kosong").await;

        let dir = tempfile::tempdir().unwrap();
        let id = w.id.to_string();
        let mut ui = app(&kasir, dir.path(), &["4", &id, "y", "0"]);
        ui.warehouse_menu(&admin).await.unwrap();

        assert!(output(&ui).contains("Warehouse Kosong deleted."));
        assert!(kasir.warehouses().list(&admin).await.unwrap().is_empty());
    }
}
