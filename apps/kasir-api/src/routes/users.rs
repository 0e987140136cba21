use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use kasir_core::{NewUser, User};

use crate::auth::AuthSession;
use crate::error::ApiResult;
use crate::routes::{IdBody, MessageResponse};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PasswordBody {
    pub old_password: String,
    pub new_password: String,
}

/// Users without password hashes.
pub async fn list(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.kasir.users().list(&session).await?))
}

pub async fn register(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Json(body): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state.kasir.users().register(&session, body).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Json(body): Json<IdBody>,
) -> ApiResult<Json<MessageResponse>> {
    state.kasir.users().delete(&session, body.id).await?;
    Ok(MessageResponse::new("User deleted successfully"))
}

pub async fn change_password(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Json(body): Json<PasswordBody>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .kasir
        .auth()
        .change_password(&session, &body.old_password, &body.new_password)
        .await?;
    Ok(MessageResponse::new("Password changed successfully"))
}
