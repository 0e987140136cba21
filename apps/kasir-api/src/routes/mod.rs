//! Route handlers, one module per resource.

pub mod login;
pub mod products;
pub mod reports;
pub mod transactions;
pub mod users;
pub mod warehouses;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::AppState;

/// `{ "message": "..." }`
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(MessageResponse {
            message: message.into(),
        })
    }
}

/// `{ "id": 3 }`, the body of every DELETE.
#[derive(Debug, Deserialize)]
pub struct IdBody {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
}

/// Liveness plus a database ping.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = state.kasir.db().health_check().await;
    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if database { "ok" } else { "degraded" },
            database,
        }),
    )
}
