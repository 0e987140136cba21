//! # API Error Type
//!
//! Every failed request gets the same JSON body.
//!
//! ```json
//! {
//!   "code": "CONFLICT",
//!   "message": "Warehouse is still used by 1 user(s): sari",
//!   "details": { "usernames": ["sari"], "product_count": 0 }
//! }
//! ```
//!
//! `details` appears only when there is something structured to add.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use kasir_service::{ErrorKind, ServiceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// 404
    NotFound,
    /// 400
    ValidationError,
    /// 409
    Conflict,
    /// 401
    Unauthorized,
    /// 403
    Forbidden,
    /// 500
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ErrorKind> for ErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NotFound => ErrorCode::NotFound,
            ErrorKind::Validation => ErrorCode::ValidationError,
            ErrorKind::Conflict => ErrorCode::Conflict,
            ErrorKind::Unauthorized => ErrorCode::Unauthorized,
            ErrorKind::Forbidden => ErrorCode::Forbidden,
            ErrorKind::Internal => ErrorCode::Internal,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let code = ErrorCode::from(err.kind());

        match err {
            ServiceError::Internal(detail) => {
                error!(%detail, "Request failed with internal error");
                ApiError::new(code, "Internal server error")
            }
            ServiceError::WarehouseInUse { ref usage } => {
                let details = serde_json::to_value(usage).ok();
                ApiError {
                    code,
                    message: err.to_string(),
                    details,
                }
            }
            other => ApiError::new(code, other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status();
        let mut response = (status, Json(self)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"kasir\""),
            );
        }

        response
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use kasir_core::WarehouseUsage;

    #[test]
    fn test_status_codes() {
        fn status(err: ServiceError) -> StatusCode {
            ApiError::from(err).into_response().status()
        }

        assert_eq!(status(ServiceError::not_found("Product", 1)), StatusCode::NOT_FOUND);
        assert_eq!(
            status(ServiceError::Validation("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status(ServiceError::Conflict("stock".into())), StatusCode::CONFLICT);
        assert_eq!(status(ServiceError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status(ServiceError::forbidden("no")), StatusCode::FORBIDDEN);
        assert_eq!(
            status(ServiceError::Internal("disk full".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_is_redacted() {
        let err = ApiError::from(ServiceError::Internal("disk full".into()));
        assert_eq!(err.message, "Internal server error");
    }

    #[test]
    fn test_unauthorized_has_challenge() {
        let response = ApiError::unauthorized("Missing credentials").into_response();
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"kasir\""
        );
    }

    #[test]
    fn test_warehouse_in_use_details() {
        let err = ApiError::from(ServiceError::WarehouseInUse {
            usage: WarehouseUsage {
                usernames: vec!["sari".into()],
                product_count: 3,
            },
        });
        assert_eq!(err.code, ErrorCode::Conflict);
        let details = err.details.unwrap();
        assert_eq!(details["product_count"], 3);
        assert_eq!(details["usernames"][0], "sari");
    }
}
