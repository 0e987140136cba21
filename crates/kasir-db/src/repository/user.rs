//! # User Repository
//!
//! Database operations for users.
//!
//! The password hash never leaves this crate inside a [`User`]. Only
//! [`UserCredentials`], fetched by username for verification, carries it.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use kasir_core::{Role, User};

const USER_SELECT: &str = r#"
    SELECT
        u.id,
        u.username,
        u.role,
        u.warehouse_id,
        w.name AS warehouse_name,
        u.created_at
    FROM users u
    LEFT JOIN warehouses w ON w.id = u.warehouse_id
"#;

/// The row needed to check a password.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCredentials {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub warehouse_id: Option<i64>,
}

/// A user row ready to insert. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUserRow {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub warehouse_id: Option<i64>,
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Lists users with their warehouse names, ordered by id.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let sql = format!("{} ORDER BY u.id", USER_SELECT);
        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// Gets a user by ID.
    pub async fn get(&self, id: i64) -> DbResult<Option<User>> {
        let sql = format!("{} WHERE u.id = ?1", USER_SELECT);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Fetches the credential row for a username.
    pub async fn find_credentials(&self, username: &str) -> DbResult<Option<UserCredentials>> {
        let creds = sqlx::query_as::<_, UserCredentials>(
            r#"
            SELECT id, username, password_hash, role, warehouse_id
            FROM users
            WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(creds)
    }

    /// Fetches the credential row for a user id.
    pub async fn credentials_by_id(&self, id: i64) -> DbResult<Option<UserCredentials>> {
        let creds = sqlx::query_as::<_, UserCredentials>(
            r#"
            SELECT id, username, password_hash, role, warehouse_id
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(creds)
    }

    /// Inserts a user.
    ///
    /// ## Errors
    /// `UniqueViolation { field: "username", .. }` when the name is taken.
    pub async fn insert(&self, row: &NewUserRow) -> DbResult<i64> {
        let now: DateTime<Utc> = Utc::now();
        debug!(username = %row.username, role = %row.role, "Inserting user");

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, role, warehouse_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&row.username)
        .bind(&row.password_hash)
        .bind(row.role)
        .bind(row.warehouse_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("username", row.username.clone()),
            other => other,
        })?;

        Ok(result.last_insert_rowid())
    }

    /// Replaces a user's password hash.
    pub async fn update_password_hash(&self, id: i64, password_hash: &str) -> DbResult<()> {
        debug!(id, "Updating password hash");

        let result = sqlx::query("UPDATE users SET password_hash = ?2 WHERE id = ?1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    /// Deletes a user, unless that would leave no admin behind.
    ///
    /// The admin count is checked inside the DELETE, so two admins removing
    /// each other at the same moment cannot both succeed.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting user");

        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = ?1
              AND (role <> ?2 OR (SELECT COUNT(*) FROM users WHERE role = ?2) > 1)
            "#,
        )
        .bind(id)
        .bind(Role::Admin)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.get(id).await? {
                Some(_) => Err(DbError::LastAdmin),
                None => Err(DbError::not_found("User", id)),
            };
        }

        Ok(())
    }

    /// Counts all users.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
