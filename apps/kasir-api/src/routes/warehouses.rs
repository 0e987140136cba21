use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use kasir_core::{Warehouse, WarehouseInput};

use crate::auth::AuthSession;
use crate::error::ApiResult;
use crate::routes::{IdBody, MessageResponse};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
    pub id: i64,
    #[serde(flatten)]
    pub fields: WarehouseInput,
}

pub async fn list(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> ApiResult<Json<Vec<Warehouse>>> {
    Ok(Json(state.kasir.warehouses().list(&session).await?))
}

pub async fn create(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Json(body): Json<WarehouseInput>,
) -> ApiResult<(StatusCode, Json<Warehouse>)> {
    let warehouse = state.kasir.warehouses().create(&session, body).await?;
    Ok((StatusCode::CREATED, Json(warehouse)))
}

pub async fn update(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Json(body): Json<UpdateBody>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .kasir
        .warehouses()
        .update(&session, body.id, body.fields)
        .await?;
    Ok(MessageResponse::new("Warehouse updated successfully"))
}

/// 409 with the blocking users and product count when still referenced.
pub async fn delete(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Json(body): Json<IdBody>,
) -> ApiResult<Json<MessageResponse>> {
    state.kasir.warehouses().delete(&session, body.id).await?;
    Ok(MessageResponse::new("Warehouse deleted successfully"))
}
