pub mod channels;
pub mod health;
pub mod inbox;
pub mod notifications;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /inbox                                    list delivery records
/// /inbox/read-all                           mark all read (POST)
/// /inbox/unread-count                       unread count
/// /inbox/{id}/read                          mark one read (POST)
///
/// /notifications                            catalog visible to the caller
/// /notifications/preferences                resolved preference overview
/// /notifications/{name}/preferences         update caller preferences (PUT)
/// /notifications/{name}/send                dispatch to recipients (POST)
///
/// /channels                                 list channels
/// /channels/{name}/enabled                  kill switch (PUT)
/// /channels/{name}                          delete (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/inbox", inbox::router())
        .nest("/notifications", notifications::router())
        .nest("/channels", channels::router())
}
