use std::sync::Arc;

use courier_core::permissions::PermissionOracle;
use courier_dispatch::Dispatcher;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: courier_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Dispatch engine driving the send protocol.
    pub dispatcher: Arc<Dispatcher>,
    /// Permission oracle gating preference edits.
    pub oracle: Arc<dyn PermissionOracle>,
}
