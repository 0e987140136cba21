use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use kasir_core::{
    ImportOutcome, NewProduct, Page, PageRequest, Product, ProductExport, ProductUpdate,
    StockSummary,
};

use crate::auth::AuthSession;
use crate::error::ApiResult;
use crate::routes::{IdBody, MessageResponse};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub warehouse_id: Option<i64>,
}

/// PUT body: the product id next to the editable fields.
#[derive(Debug, Deserialize)]
pub struct UpdateBody {
    pub id: i64,
    #[serde(flatten)]
    pub fields: ProductUpdate,
}

pub async fn list(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Page<Product>>> {
    let page = state
        .kasir
        .products()
        .list(
            &session,
            PageRequest::from_query(query.page, query.limit),
            query.search.as_deref(),
            query.warehouse_id,
        )
        .await?;
    Ok(Json(page))
}

pub async fn get(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(id): Path<i64>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.kasir.products().get(&session, id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Json(body): Json<NewProduct>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = state.kasir.products().create(&session, body).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Json(body): Json<UpdateBody>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .kasir
        .products()
        .update(&session, body.id, body.fields)
        .await?;
    Ok(MessageResponse::new("Product updated successfully"))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Json(body): Json<IdBody>,
) -> ApiResult<Json<MessageResponse>> {
    state.kasir.products().delete(&session, body.id).await?;
    Ok(MessageResponse::new("Product deleted successfully"))
}

pub async fn stock_summary(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> ApiResult<Json<StockSummary>> {
    Ok(Json(state.kasir.products().stock_summary(&session).await?))
}

pub async fn export(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> ApiResult<Json<ProductExport>> {
    Ok(Json(state.kasir.products().export(&session).await?))
}

pub async fn import(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Json(document): Json<ProductExport>,
) -> ApiResult<Json<ImportOutcome>> {
    Ok(Json(state.kasir.products().import(&session, document).await?))
}
