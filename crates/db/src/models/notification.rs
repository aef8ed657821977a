//! Notification catalog entity model.

use courier_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub name: String,
    pub display_name: String,
    /// UI visibility only; a private notification is still deliverable.
    pub is_public: bool,
    /// Fallback delivery decision when no preference override exists.
    pub default_notify: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
