//! Handlers for the `/channels` resource: operator administration.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use serde::Deserialize;

use courier_db::models::channel::Channel;
use courier_db::repositories::ChannelRepo;
use courier_dispatch::catalog;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/channels
///
/// List every registered channel, including disabled ones.
pub async fn list_channels(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Channel>>>> {
    let channels = ChannelRepo::list(&state.pool, false).await?;
    Ok(Json(DataResponse { data: channels }))
}

/// Body for `PUT /channels/{name}/enabled`.
#[derive(Debug, Deserialize)]
pub struct SetEnabledBody {
    pub enabled: bool,
}

/// PUT /api/v1/channels/{name}/enabled
///
/// Flip the operator kill switch. Disabled channels drop out of resolution
/// immediately; stored preferences are untouched.
pub async fn set_enabled(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<SetEnabledBody>,
) -> AppResult<impl IntoResponse> {
    catalog::set_channel_enabled(&state.pool, &name, body.enabled).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/channels/{name}
///
/// Delete a channel. Returns 409 while any notification or preference
/// still references it.
pub async fn delete_channel(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<impl IntoResponse> {
    catalog::delete_channel(&state.pool, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Routes mounted at `/channels`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_channels))
        .route("/{name}/enabled", put(set_enabled))
        .route("/{name}", delete(delete_channel))
}
