//! # Service Error Type
//!
//! The one error type both adapters see.
//!
//! ## Classification
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Source                               ServiceError          ErrorKind   │
//! │  ──────                               ────────────          ─────────   │
//! │  DbError::NotFound                ──► NotFound          ──► NotFound    │
//! │  ValidationError, bad cart/payment ─► Validation        ──► Validation  │
//! │  DbError::UniqueViolation         ──► Conflict          ──► Conflict    │
//! │  DbError::StockConflict           ──► Conflict          ──► Conflict    │
//! │  CoreError::InsufficientStock     ──► Conflict          ──► Conflict    │
//! │  warehouse still referenced       ──► WarehouseInUse    ──► Conflict    │
//! │  wrong username / password        ──► InvalidCredentials──► Unauthorized│
//! │  staff calling admin operation    ──► Forbidden         ──► Forbidden   │
//! │  anything else                    ──► Internal          ──► Internal    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kasir_core::{CoreError, ValidationError, WarehouseUsage};
use kasir_db::DbError;
use thiserror::Error;
use tracing::error;

/// Coarse classification used for HTTP statuses and menu messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Conflict,
    Unauthorized,
    Forbidden,
    Internal,
}

/// Errors returned by every service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    /// A warehouse delete blocked by references.
    #[error("Warehouse is still used by {usage}")]
    WarehouseInUse { usage: WarehouseUsage },

    /// Unknown user or wrong password. Deliberately does not say which.
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("{0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        ServiceError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ServiceError::Forbidden(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::NotFound { .. } => ErrorKind::NotFound,
            ServiceError::Validation(_) => ErrorKind::Validation,
            ServiceError::Conflict(_) | ServiceError::WarehouseInUse { .. } => ErrorKind::Conflict,
            ServiceError::InvalidCredentials => ErrorKind::Unauthorized,
            ServiceError::Forbidden(_) => ErrorKind::Forbidden,
            ServiceError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ServiceError::not_found("Product", id),
            CoreError::InsufficientStock { .. } => ServiceError::Conflict(err.to_string()),
            CoreError::WrongWarehouse { .. } => ServiceError::Forbidden(err.to_string()),
            CoreError::Validation(e) => ServiceError::Validation(e.to_string()),
            CoreError::EmptyCart
            | CoreError::CartTooLarge { .. }
            | CoreError::QuantityTooLarge { .. }
            | CoreError::NoSuchLine(_)
            | CoreError::AmountTooLarge
            | CoreError::InsufficientPayment { .. } => ServiceError::Validation(err.to_string()),
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            DbError::UniqueViolation { field, value } => {
                ServiceError::Conflict(format!("{} '{}' already exists", field, value))
            }
            DbError::StockConflict { .. } => ServiceError::Conflict(err.to_string()),
            DbError::ForeignKeyViolation { message } => {
                error!("Foreign key violation: {}", message);
                ServiceError::Conflict("Invalid reference".to_string())
            }
            DbError::CheckViolation { message } => ServiceError::Validation(message),
            DbError::LastAdmin => ServiceError::Validation(err.to_string()),
            other => {
                // Log the actual error but return a generic message
                error!("Database error: {}", other);
                ServiceError::Internal("Database operation failed".to_string())
            }
        }
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use kasir_core::Money;

    #[test]
    fn test_db_errors_are_classified() {
        let err: ServiceError = DbError::not_found("Product", 3).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err: ServiceError = DbError::duplicate("username", "budi").into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.to_string(), "username 'budi' already exists");

        let err: ServiceError = DbError::StockConflict {
            product_id: 1,
            requested: 2,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err: ServiceError = DbError::LastAdmin.into();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err: ServiceError = DbError::QueryFailed("syntax error near SELEC".into()).into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(!err.to_string().contains("SELEC"));
    }

    #[test]
    fn test_core_errors_are_classified() {
        let err: ServiceError = CoreError::EmptyCart.into();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err: ServiceError = CoreError::InsufficientPayment {
            total: Money::from_rupiah(10),
            payment: Money::from_rupiah(5),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err: ServiceError = CoreError::WrongWarehouse {
            product: "Kopi".into(),
            warehouse_id: 2,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn test_warehouse_in_use_message() {
        let err = ServiceError::WarehouseInUse {
            usage: WarehouseUsage {
                usernames: vec!["sari".into()],
                product_count: 2,
            },
        };
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(
            err.to_string(),
            "Warehouse is still used by 1 user(s): sari; 2 product(s)"
        );
    }
}
