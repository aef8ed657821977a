//! Caller identity extractor.
//!
//! Authentication lives in the upstream gateway, which verifies the caller
//! and forwards their internal user id in the `X-User-Id` header. This
//! service must never be exposed without that gateway in front of it.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use courier_core::types::DbId;

use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user taken from the gateway-set `X-User-Id` header.
///
/// Use this as an extractor parameter in any handler that requires a caller
/// identity:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    /// The caller's internal database id.
    pub user_id: DbId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthenticated("Missing X-User-Id header".into()))?;

        let user_id: DbId = header
            .parse()
            .map_err(|_| AppError::Unauthenticated("Invalid X-User-Id header".into()))?;

        Ok(AuthUser { user_id })
    }
}
