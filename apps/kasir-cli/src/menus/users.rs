use std::io::{BufRead, Write};

use kasir_core::{NewUser, Role};
use kasir_service::Session;

use crate::app::App;
use crate::menus::local_time;

const USER_MENU: &[(&str, &str)] = &[
    ("1", "List users"),
    ("2", "Register user"),
    ("3", "Delete user"),
    ("0", "Back"),
];

impl<R: BufRead, W: Write> App<R, W> {
    pub(crate) async fn user_menu(&mut self, session: &Session) -> anyhow::Result<()> {
        loop {
            match self.menu("USERS", USER_MENU)?.as_str() {
                "1" => self.list_users(session).await?,
                "2" => self.register_user(session).await?,
                "3" => self.delete_user(session).await?,
                "0" => return Ok(()),
                _ => self.console.say("Unknown choice.")?,
            }
        }
    }

    async fn list_users(&mut self, session: &Session) -> anyhow::Result<()> {
        let users = match self.kasir.users().list(session).await {
            Ok(list) => list,
            Err(e) => return self.show_error(e),
        };

        let offset = self.kasir.offset();
        self.console.say(format!(
            "{:>5}  {:<20} {:<6} {:<20} {}",
            "ID", "Username", "Role", "Warehouse", "Created"
        ))?;
        for u in &users {
            let warehouse = match (&u.warehouse_name, u.warehouse_id) {
                (Some(name), _) => name.clone(),
                (None, Some(id)) => format!("#{}", id),
                (None, None) => "All".to_string(),
            };
            self.console.say(format!(
                "{:>5}  {:<20} {:<6} {:<20} {}",
                u.id,
                u.username,
                u.role.as_str(),
                warehouse,
                local_time(u.created_at, offset)
            ))?;
        }
        Ok(())
    }

    async fn register_user(&mut self, session: &Session) -> anyhow::Result<()> {
        self.console.say("\n--- REGISTER USER ---")?;
        let username = self.console.prompt("Username: ")?;
        let password = self.console.prompt("Password: ")?;

        let role = loop {
            let answer = self.console.prompt("Role (admin/staff): ")?;
            match answer.parse::<Role>() {
                Ok(role) => break role,
                Err(e) => self.console.say(format!("{}", e))?,
            }
        };

        self.list_warehouses(session).await?;
        let warehouse_id = self
            .console
            .prompt_optional_number("Warehouse ID (empty for all warehouses): ")?;

        let input = NewUser {
            username,
            password,
            role,
            warehouse_id,
        };
        match self.kasir.users().register(session, input).await {
            Ok(user) => self.console.say(format!(
                "User {} registered as {} with ID {}.",
                user.username, user.role, user.id
            )),
            Err(e) => self.show_error(e),
        }
    }

    async fn delete_user(&mut self, session: &Session) -> anyhow::Result<()> {
        let id = self.console.prompt_number("User ID: ")?;
        if !self.console.confirm(&format!("Delete user {}", id))? {
            return self.console.say("Cancelled.");
        }

        match self.kasir.users().delete(session, id).await {
            Ok(()) => self.console.say("User deleted."),
            Err(e) => self.show_error(e),
        }
    }
}
