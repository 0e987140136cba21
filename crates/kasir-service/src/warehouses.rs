//! Warehouse directory operations.

use tracing::{info, warn};

use kasir_core::{Warehouse, WarehouseInput};
use kasir_db::Database;

use crate::error::{ServiceError, ServiceResult};
use crate::session::Session;

#[derive(Debug, Clone)]
pub struct WarehouseService {
    db: Database,
}

impl WarehouseService {
    pub fn new(db: Database) -> Self {
        WarehouseService { db }
    }

    pub async fn list(&self, _session: &Session) -> ServiceResult<Vec<Warehouse>> {
        Ok(self.db.warehouses().list().await?)
    }

    pub async fn get(&self, _session: &Session, id: i64) -> ServiceResult<Warehouse> {
        self.db
            .warehouses()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Warehouse", id))
    }

    pub async fn create(&self, session: &Session, input: WarehouseInput) -> ServiceResult<Warehouse> {
        session.require_admin()?;
        let input = input.validated()?;

        let warehouse = self.db.warehouses().insert(&input).await?;
        info!(warehouse_id = warehouse.id, name = %warehouse.name, "Warehouse created");
        Ok(warehouse)
    }

    pub async fn update(
        &self,
        session: &Session,
        id: i64,
        input: WarehouseInput,
    ) -> ServiceResult<Warehouse> {
        session.require_admin()?;
        let input = input.validated()?;

        self.db.warehouses().update(id, &input).await?;
        info!(warehouse_id = id, "Warehouse updated");
        self.get(session, id).await
    }

    /// Deletes a warehouse nobody references.
    ///
    /// ## Errors
    /// `WarehouseInUse` naming the users and product count that still point
    /// at it. Nothing is changed in that case.
    pub async fn delete(&self, session: &Session, id: i64) -> ServiceResult<()> {
        session.require_admin()?;
        self.get(session, id).await?;

        if let Some(usage) = self.db.warehouses().delete(id).await? {
            warn!(warehouse_id = id, %usage, "Warehouse delete blocked");
            return Err(ServiceError::WarehouseInUse { usage });
        }

        info!(warehouse_id = id, "Warehouse deleted");
        Ok(())
    }

    /// Fails with `Validation` when the id names no warehouse.
    pub(crate) async fn ensure_exists(&self, id: i64) -> ServiceResult<Warehouse> {
        self.db
            .warehouses()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::Validation(format!("Warehouse {} does not exist", id)))
    }
}
