//! Shared-secret authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use bridge_core::error::CoreError;

use crate::error::AppError;
use crate::state::AppState;

/// Alternate header carrying the raw token.
pub const TOKEN_HEADER: &str = "x-bridge-token";

/// Marker proving the caller presented a valid credential.
///
/// Add it as the first extractor of any handler that requires auth, so the
/// credential is checked before the path or body is looked at:
///
/// ```ignore
/// async fn my_handler(_auth: Authenticated, State(state): State<AppState>) { .. }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Authenticated;

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let credential = extract_credential(&parts.headers).ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Missing credential. Expected: Authorization: Bearer <token>".into(),
            ))
        })?;

        if !state.verifier.verify(credential) {
            tracing::debug!("Rejected request with invalid credential");
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid credential".into(),
            )));
        }

        Ok(Authenticated)
    }
}

/// Pull the presented credential out of the request headers.
///
/// A `Bearer` authorization header wins; otherwise a non-empty
/// `X-Bridge-Token` header is used.
pub fn extract_credential(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if let Some(token) = bearer {
        return Some(token.trim());
    }

    headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}
