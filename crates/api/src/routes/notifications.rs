//! Handlers for the `/notifications` resource: catalog, preferences, send.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;

use courier_core::types::DbId;
use courier_db::models::notification::Notification;
use courier_db::models::preference::UpsertOutcome;
use courier_dispatch::catalog;
use courier_dispatch::preferences::{self, PrefSubject};

use crate::auth::AuthUser;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/notifications
///
/// Public notifications the caller may subscribe to.
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Notification>>>> {
    let notifications =
        catalog::notifications_for_user(&state.pool, state.oracle.as_ref(), auth.user_id).await?;

    Ok(Json(DataResponse {
        data: notifications,
    }))
}

/// GET /api/v1/notifications/preferences
///
/// Resolved per-channel preference state for every notification visible to
/// the caller. Channels without an explicit preference show the resolved
/// default rather than "unset".
pub async fn get_preferences(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<BTreeMap<String, BTreeMap<String, bool>>>>> {
    let overview =
        catalog::user_prefs_overview(&state.pool, state.oracle.as_ref(), auth.user_id).await?;

    Ok(Json(DataResponse { data: overview }))
}

/// Body for `PUT /notifications/{name}/preferences`: channel name to
/// desired notify value.
#[derive(Debug, Deserialize)]
pub struct UpdatePreferencesBody {
    pub channels: BTreeMap<String, bool>,
}

/// PUT /api/v1/notifications/{name}/preferences
///
/// Apply per-channel overrides for the caller. The response lists only the
/// channels whose stored value actually changed.
pub async fn update_preferences(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<UpdatePreferencesBody>,
) -> AppResult<Json<DataResponse<BTreeMap<String, UpsertOutcome>>>> {
    let outcomes = preferences::update_preferences(
        &state.pool,
        state.oracle.as_ref(),
        &name,
        PrefSubject::User(auth.user_id),
        &body.channels,
    )
    .await?;

    Ok(Json(DataResponse { data: outcomes }))
}

/// Body for `POST /notifications/{name}/send`.
#[derive(Debug, Deserialize)]
pub struct SendBody {
    /// Recipient user ids.
    pub recipients: Vec<DbId>,
    /// Message text; defaults to the notification's display name.
    pub message: Option<String>,
    /// Optional deep link shown with the message.
    pub path: Option<String>,
    /// Optional template context.
    pub context: Option<serde_json::Value>,
}

/// POST /api/v1/notifications/{name}/send
///
/// Dispatch the notification to the given recipients over their effective
/// channels. Per-channel failures are contained and recorded, not reported
/// here; callers inspect the recipients' delivery records for outcomes.
/// Returns 202 Accepted once every attempt has been recorded.
pub async fn send_notification(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<SendBody>,
) -> AppResult<impl IntoResponse> {
    state
        .dispatcher
        .send(
            &name,
            body.recipients,
            body.message.as_deref(),
            body.path.as_deref(),
            body.context.as_ref(),
        )
        .await?;

    Ok(StatusCode::ACCEPTED)
}

/// Routes mounted at `/notifications`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/preferences", get(get_preferences))
        .route("/{name}/preferences", put(update_preferences))
        .route("/{name}/send", post(send_notification))
}
