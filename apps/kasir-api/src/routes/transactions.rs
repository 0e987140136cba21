use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use kasir_core::{SaleRequest, Transaction};

use crate::auth::AuthSession;
use crate::error::ApiResult;
use crate::AppState;

/// Today's transactions, newest first, limited to the caller's warehouse
/// when they are scoped.
pub async fn list_today(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> ApiResult<Json<Vec<Transaction>>> {
    Ok(Json(state.kasir.transactions().list_today(&session).await?))
}

/// Posts a sale. Stock shortfalls come back as 409 and change nothing.
pub async fn post(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Json(body): Json<SaleRequest>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let transaction = state.kasir.transactions().post(&session, body).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}
