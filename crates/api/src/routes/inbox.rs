//! Handlers for the `/inbox` resource: the caller's delivery records.
//!
//! All endpoints require a caller identity via [`AuthUser`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use courier_core::error::CoreError;
use courier_core::types::DbId;
use courier_db::models::delivery::DeliveryRecord;
use courier_db::repositories::DeliveryRecordRepo;

use crate::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum page size for inbox listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for inbox listing.
const DEFAULT_LIMIT: i64 = 50;

/// Query parameters for `GET /inbox`.
#[derive(Debug, Deserialize)]
pub struct InboxQuery {
    /// If `true`, return only unread records. Defaults to `false`.
    pub unread_only: Option<bool>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// GET /api/v1/inbox
///
/// List the caller's delivery records, newest first.
pub async fn list_inbox(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<InboxQuery>,
) -> AppResult<Json<DataResponse<Vec<DeliveryRecord>>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);
    let unread_only = params.unread_only.unwrap_or(false);

    let records =
        DeliveryRecordRepo::list_for_user(&state.pool, auth.user_id, unread_only, limit, offset)
            .await?;

    Ok(Json(DataResponse { data: records }))
}

/// POST /api/v1/inbox/{id}/read
///
/// Mark a single record as read. Returns 204 No Content on success, or 404
/// if the record does not belong to the caller or is already read.
pub async fn mark_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(record_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let found = DeliveryRecordRepo::mark_read(&state.pool, record_id, auth.user_id).await?;

    if !found {
        return Err(AppError::Core(CoreError::not_found(
            "Delivery record",
            record_id.to_string(),
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/inbox/read-all
///
/// Mark all of the caller's unread records as read. Returns how many changed.
pub async fn mark_all_read(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let count = DeliveryRecordRepo::mark_all_read(&state.pool, auth.user_id).await?;

    Ok(Json(serde_json::json!({
        "data": { "marked_read": count }
    })))
}

/// GET /api/v1/inbox/unread-count
///
/// Return the number of unread records for the caller.
pub async fn unread_count(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let count = DeliveryRecordRepo::unread_count(&state.pool, auth.user_id).await?;

    Ok(Json(serde_json::json!({
        "data": { "count": count }
    })))
}

/// Routes mounted at `/inbox`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_inbox))
        .route("/read-all", post(mark_all_read))
        .route("/unread-count", get(unread_count))
        .route("/{id}/read", post(mark_read))
}
