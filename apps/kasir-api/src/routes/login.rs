use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use kasir_core::Role;

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: String,
    pub role: Role,
    pub warehouse_id: Option<i64>,
}

/// Confirms a username/password pair. Nothing is stored; later requests
/// send the same pair as Basic Auth.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let session = state
        .kasir
        .auth()
        .authenticate(&body.username, &body.password)
        .await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        user: session.username,
        role: session.role,
        warehouse_id: session.warehouse_id,
    }))
}
