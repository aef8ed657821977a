//! Delivery record entity model.

use courier_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `delivery_records` table.
///
/// Append-only: one row per (recipient, channel) delivery attempt, written
/// after the attempt completes. Only `is_read`/`read_at` change afterwards,
/// and only at the owning user's request.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DeliveryRecord {
    pub id: DbId,
    pub user_id: DbId,
    pub notification_id: DbId,
    pub channel_id: DbId,
    pub success: bool,
    pub description: Option<String>,
    pub path: Option<String>,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
