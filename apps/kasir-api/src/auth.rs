//! HTTP Basic Auth extractor.
//!
//! There is no token or server-side session store. Every protected request
//! carries `Authorization: Basic base64(username:password)` and is checked
//! against the user table again.
//!
//! ```rust,ignore
//! async fn handler(AuthSession(session): AuthSession) -> impl IntoResponse {
//!     format!("Hello, {}!", session.username)
//! }
//! ```

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use kasir_service::Session;

use crate::error::ApiError;
use crate::AppState;

/// The authenticated caller of one request.
#[derive(Debug, Clone)]
pub struct AuthSession(pub Session);

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| ApiError::unauthorized("Missing credentials"))?
            .to_str()
            .map_err(|_| ApiError::unauthorized("Malformed Authorization header"))?;

        let (username, password) = parse_basic(header)
            .ok_or_else(|| ApiError::unauthorized("Malformed Authorization header"))?;

        let session = state.kasir.auth().authenticate(&username, &password).await?;
        Ok(AuthSession(session))
    }
}

/// Decodes `Basic dXNlcjpwYXNz` into `("user", "pass")`.
///
/// The password may itself contain `:`; only the first one separates.
pub fn parse_basic(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}
