//! # Session
//!
//! The authenticated actor for one operation.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  kasir-cli                          kasir-api                           │
//! │  ─────────                          ─────────                           │
//! │  login once ──► Session held        every request ──► Basic Auth        │
//! │  by the menu loop until logout      ──► Session for that request only   │
//! │         │                                   │                           │
//! │         └──────────────┬────────────────────┘                           │
//! │                        ▼                                                │
//! │          service.operation(&session, ...)                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no process-wide "current user". Every service call that needs
//! to know who is acting takes a `&Session`.

use serde::Serialize;

use kasir_core::{Role, User};

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    pub warehouse_id: Option<i64>,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// The warehouse this actor is restricted to, if any.
    ///
    /// Admins are never restricted, even when a warehouse is recorded for
    /// them.
    pub fn warehouse_scope(&self) -> Option<i64> {
        if self.is_admin() {
            None
        } else {
            self.warehouse_id
        }
    }

    pub fn require_admin(&self) -> ServiceResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::forbidden("Admin access required"))
        }
    }
}

impl From<&User> for Session {
    fn from(user: &User) -> Self {
        Session {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
            warehouse_id: user.warehouse_id,
        }
    }
}
