//! Channel entity model.

use courier_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `channels` table.
///
/// `enabled` is the operator kill switch: a disabled channel is excluded
/// from every resolution regardless of preferences. All other columns are
/// overwritten by the bootstrap upsert on each start.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Channel {
    pub id: DbId,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
