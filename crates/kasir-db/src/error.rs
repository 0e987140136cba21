//! # Database Errors
//!
//! `DbError` sorts sqlx failures into the few cases callers act on. The
//! service layer turns them into `NotFound`, `Conflict` or a redacted
//! internal error.
//!
//! ```text
//! sqlx::Error ──► DbError ──► ServiceError ──► HTTP status / menu message
//! ```
//!
//! Constraint failures are classified with `DatabaseError::kind()`, not by
//! matching message text. The SQLite message is still used to name the
//! offending column (`UNIQUE constraint failed: users.username`).

use sqlx::error::ErrorKind as SqlxKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// No row for that id. Also returned when an UPDATE or DELETE by id
    /// touches nothing.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected the write. Only `users.username` has one.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// A transaction item pointing at a header that does not exist.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A CHECK constraint fired, e.g. a negative price slipped past
    /// validation.
    #[error("Check constraint failed: {message}")]
    CheckViolation { message: String },

    /// Deleting this user would leave no admin account.
    #[error("Cannot delete the last admin account")]
    LastAdmin,

    /// The guarded stock decrement matched no row.
    ///
    /// ```text
    /// UPDATE products SET stock = stock - 3 WHERE id = 7 AND stock >= 3
    ///      │
    ///      ▼
    /// rows_affected == 0   (stock dropped below 3 after it was read,
    ///                       or the product is gone)
    ///      │
    ///      ▼
    /// StockConflict { product_id: 7, requested: 3 }  → the post rolls back
    /// ```
    #[error("Insufficient stock for product {product_id}: requested {requested}")]
    StockConflict { product_id: i64, requested: i64 },

    /// The database file could not be opened or the pool is closed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// BEGIN or COMMIT failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Every pooled connection stayed busy past the acquire timeout.
    #[error("Timed out waiting for a database connection")]
    PoolTimedOut,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// `"UNIQUE constraint failed: users.username"` → `"username"`.
fn constraint_column(message: &str) -> String {
    message
        .rsplit(": ")
        .next()
        .and_then(|target| target.split(", ").next())
        .map(|column| column.rsplit('.').next().unwrap_or(column))
        .unwrap_or("unknown")
        .to_string()
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.kind() {
                    SqlxKind::UniqueViolation => DbError::UniqueViolation {
                        field: constraint_column(&message),
                        value: "unknown".to_string(),
                    },
                    SqlxKind::ForeignKeyViolation => DbError::ForeignKeyViolation { message },
                    SqlxKind::CheckViolation => DbError::CheckViolation { message },
                    _ => DbError::QueryFailed(message),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolTimedOut,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),
            sqlx::Error::Io(e) => DbError::ConnectionFailed(e.to_string()),

            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_column() {
        assert_eq!(
            constraint_column("UNIQUE constraint failed: users.username"),
            "username"
        );
        assert_eq!(
            constraint_column("UNIQUE constraint failed: t.a, t.b"),
            "a"
        );
        assert_eq!(constraint_column("weird"), "weird");
    }

    #[test]
    fn test_sqlx_mapping() {
        assert!(matches!(
            DbError::from(sqlx::Error::RowNotFound),
            DbError::NotFound { .. }
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::PoolTimedOut),
            DbError::PoolTimedOut
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::PoolClosed),
            DbError::ConnectionFailed(_)
        ));
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            DbError::not_found("Product", 7).to_string(),
            "Product not found: 7"
        );
        assert_eq!(
            DbError::duplicate("username", "budi").to_string(),
            "Duplicate username: 'budi' already exists"
        );
        assert_eq!(
            DbError::StockConflict {
                product_id: 7,
                requested: 3
            }
            .to_string(),
            "Insufficient stock for product 7: requested 3"
        );
    }
}
