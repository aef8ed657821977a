//! Preference entity models.

use courier_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `user_preferences` table. Unique per
/// (user, notification, channel); highest resolution precedence.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserPreference {
    pub id: DbId,
    pub user_id: DbId,
    pub notification_id: DbId,
    pub channel_id: DbId,
    pub notify: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `group_preferences` table. Unique per
/// (group, notification, channel); overrides the notification default for
/// all members of the group.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GroupPreference {
    pub id: DbId,
    pub group_id: DbId,
    pub notification_id: DbId,
    pub channel_id: DbId,
    pub notify: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Outcome of a preference upsert.
///
/// `Unchanged` means the stored value already equals the requested value and
/// no write was performed, leaving `updated_at` untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Created,
    Updated,
    Unchanged,
}
