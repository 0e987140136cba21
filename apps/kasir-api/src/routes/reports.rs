use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use kasir_core::{DailyReport, ReportDate};
use kasir_service::ServiceError;

use crate::auth::AuthSession;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// `DD-MM-YYYY`; today when absent or empty.
    pub date: Option<String>,
}

pub async fn daily(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<DailyReport>> {
    let date = match query.date.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(ReportDate::parse(raw).map_err(ServiceError::from)?),
        _ => None,
    };

    Ok(Json(state.kasir.reports().daily(&session, date).await?))
}
