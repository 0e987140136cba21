//! User directory operations. Admin only.

use std::sync::Arc;

use tracing::info;

use kasir_core::{NewUser, User};
use kasir_db::{Database, NewUserRow};

use crate::auth::Passwords;
use crate::error::{ServiceError, ServiceResult};
use crate::session::Session;
use crate::warehouses::WarehouseService;

#[derive(Debug, Clone)]
pub struct UserService {
    db: Database,
    passwords: Arc<Passwords>,
}

impl UserService {
    pub fn new(db: Database, passwords: Arc<Passwords>) -> Self {
        UserService { db, passwords }
    }

    pub async fn list(&self, session: &Session) -> ServiceResult<Vec<User>> {
        session.require_admin()?;
        Ok(self.db.users().list().await?)
    }

    /// Registers a user with a hashed password.
    ///
    /// ## Errors
    /// - `Validation` for a bad username/password or unknown warehouse
    /// - `Conflict` when the username is taken
    pub async fn register(&self, session: &Session, input: NewUser) -> ServiceResult<User> {
        session.require_admin()?;
        let input = input.validated()?;

        if let Some(warehouse_id) = input.warehouse_id {
            WarehouseService::new(self.db.clone())
                .ensure_exists(warehouse_id)
                .await?;
        }

        let id = self
            .db
            .users()
            .insert(&NewUserRow {
                username: input.username,
                password_hash: self.passwords.hash(&input.password)?,
                role: input.role,
                warehouse_id: input.warehouse_id,
            })
            .await?;

        let user = self
            .db
            .users()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;

        info!(user_id = user.id, username = %user.username, role = %user.role, "User registered");
        Ok(user)
    }

    /// Deletes a user other than the caller.
    pub async fn delete(&self, session: &Session, id: i64) -> ServiceResult<()> {
        session.require_admin()?;
        if id == session.user_id {
            return Err(ServiceError::Validation(
                "You cannot delete your own account".to_string(),
            ));
        }

        self.db.users().delete(id).await?;
        info!(user_id = id, "User deleted");
        Ok(())
    }
}
