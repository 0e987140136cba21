//! # Authentication
//!
//! Password hashing and credential checks.
//!
//! ## Login Flow
//! ```text
//! authenticate("sari", "rahasia")
//!      │
//!      ▼
//! find_credentials("sari")
//!      │
//!      ├── found ───► argon2 verify against stored hash
//!      │
//!      └── missing ─► argon2 verify against a dummy hash (same cost),
//!                     then fail
//!      │
//!      ▼
//! Ok(Session) or Err(InvalidCredentials)  (same error either way)
//! ```

use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use tracing::{info, warn};

use kasir_core::validation::{validate_password, validate_username};
use kasir_core::{Role, User};
use kasir_db::{Database, NewUserRow};

use crate::error::{ServiceError, ServiceResult};
use crate::session::Session;

// =============================================================================
// Password Hashing
// =============================================================================

/// Argon2 hasher plus a dummy hash for timing-equal failures.
#[derive(Clone)]
pub struct Passwords {
    argon2: Argon2<'static>,
    dummy_hash: String,
}

impl std::fmt::Debug for Passwords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Passwords").finish_non_exhaustive()
    }
}

impl Passwords {
    /// Argon2id with the library's default cost.
    pub fn new() -> ServiceResult<Self> {
        Self::with_argon2(Argon2::default())
    }

    /// A cheap Argon2id configuration for tests and demo seeding.
    pub fn low_cost() -> ServiceResult<Self> {
        let params = Params::new(1024, 1, 1, None)
            .map_err(|e| ServiceError::Internal(format!("Invalid argon2 params: {}", e)))?;
        Self::with_argon2(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    fn with_argon2(argon2: Argon2<'static>) -> ServiceResult<Self> {
        let mut passwords = Passwords {
            argon2,
            dummy_hash: String::new(),
        };
        passwords.dummy_hash = passwords.hash("kasir-dummy-password")?;
        Ok(passwords)
    }

    /// Hashes a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> ServiceResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| ServiceError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Verifies a password against a stored PHC string. Constant time in the
    /// password; false for malformed hashes.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Burns the same work as a real verification.
    fn verify_dummy(&self, password: &str) {
        let _ = self.verify(password, &self.dummy_hash);
    }
}

// =============================================================================
// Auth Service
// =============================================================================

#[derive(Debug, Clone)]
pub struct AuthService {
    db: Database,
    passwords: Arc<Passwords>,
}

impl AuthService {
    pub fn new(db: Database, passwords: Arc<Passwords>) -> Self {
        AuthService { db, passwords }
    }

    /// Checks a username and password and returns a session.
    pub async fn authenticate(&self, username: &str, password: &str) -> ServiceResult<Session> {
        let creds = self.db.users().find_credentials(username.trim()).await?;

        match creds {
            Some(creds) if self.passwords.verify(password, &creds.password_hash) => {
                info!(user_id = creds.id, username = %creds.username, "User authenticated");
                Ok(Session {
                    user_id: creds.id,
                    username: creds.username,
                    role: creds.role,
                    warehouse_id: creds.warehouse_id,
                })
            }
            Some(creds) => {
                warn!(username = %creds.username, "Wrong password");
                Err(ServiceError::InvalidCredentials)
            }
            None => {
                self.passwords.verify_dummy(password);
                warn!(username = %username, "Unknown username");
                Err(ServiceError::InvalidCredentials)
            }
        }
    }

    /// Changes the acting user's own password.
    pub async fn change_password(
        &self,
        session: &Session,
        old_password: &str,
        new_password: &str,
    ) -> ServiceResult<()> {
        let creds = self
            .db
            .users()
            .credentials_by_id(session.user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", session.user_id))?;

        if !self.passwords.verify(old_password, &creds.password_hash) {
            return Err(ServiceError::InvalidCredentials);
        }

        validate_password(new_password)?;
        let hash = self.passwords.hash(new_password)?;
        self.db.users().update_password_hash(creds.id, &hash).await?;

        info!(user_id = creds.id, "Password changed");
        Ok(())
    }

    /// Creates the first admin when the user table is empty.
    ///
    /// Returns the created user, or `None` when users already exist.
    pub async fn ensure_bootstrap_admin(
        &self,
        username: &str,
        password: &str,
    ) -> ServiceResult<Option<User>> {
        if self.db.users().count().await? > 0 {
            return Ok(None);
        }

        validate_username(username)?;
        validate_password(password)?;

        let id = self
            .db
            .users()
            .insert(&NewUserRow {
                username: username.trim().to_string(),
                password_hash: self.passwords.hash(password)?,
                role: Role::Admin,
                warehouse_id: None,
            })
            .await?;

        info!(user_id = id, username = %username, "Bootstrap admin created");
        Ok(self.db.users().get(id).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use kasir_db::DbConfig;

    async fn service() -> AuthService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        AuthService::new(db, Arc::new(Passwords::low_cost().unwrap()))
    }

    #[test]
    fn test_hash_and_verify() {
        let passwords = Passwords::low_cost().unwrap();
        let hash = passwords.hash("rahasia").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(passwords.verify("rahasia", &hash));
        assert!(!passwords.verify("salah", &hash));
        assert!(!passwords.verify("rahasia", "not-a-hash"));

        // Fresh salt every time.
        assert_ne!(hash, passwords.hash("rahasia").unwrap());
    }

    #[tokio::test]
    async fn test_bootstrap_then_authenticate() {
        let auth = service().await;

        let admin = auth
            .ensure_bootstrap_admin("admin", "admin123")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, Role::Admin);

        // Only once.
        assert!(auth
            .ensure_bootstrap_admin("admin2", "admin123")
            .await
            .unwrap()
            .is_none());

        let session = auth.authenticate("admin", "admin123").await.unwrap();
        assert!(session.is_admin());
        assert_eq!(session.user_id, admin.id);
    }

    #[tokio::test]
    async fn test_failures_look_the_same() {
        let auth = service().await;
        auth.ensure_bootstrap_admin("admin", "admin123").await.unwrap();

        let wrong = auth.authenticate("admin", "nope").await.unwrap_err();
        let unknown = auth.authenticate("ghost", "nope").await.unwrap_err();
        assert_eq!(wrong.to_string(), unknown.to_string());
        assert!(matches!(unknown, ServiceError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_change_password() {
        let auth = service().await;
        auth.ensure_bootstrap_admin("admin", "admin123").await.unwrap();
        let session = auth.authenticate("admin", "admin123").await.unwrap();

        assert!(matches!(
            auth.change_password(&session, "wrong", "newpass1").await,
            Err(ServiceError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.change_password(&session, "admin123", "123").await,
            Err(ServiceError::Validation(_))
        ));

        auth.change_password(&session, "admin123", "newpass1")
            .await
            .unwrap();
        assert!(auth.authenticate("admin", "admin123").await.is_err());
        assert!(auth.authenticate("admin", "newpass1").await.is_ok());
    }
}
