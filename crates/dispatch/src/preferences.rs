//! Preference updates with permission gating.
//!
//! Permissions gate who may *edit* a subscription, never whether a
//! notification is *delivered*: a user who loses a permission after opting
//! in keeps receiving the notification until the preference is cleared.

use std::collections::BTreeMap;

use courier_core::error::CoreError;
use courier_core::permissions::PermissionOracle;
use courier_core::types::DbId;
use courier_db::models::preference::UpsertOutcome;
use courier_db::repositories::{ChannelRepo, IdentityRepo, NotificationRepo, PreferenceRepo};
use courier_db::DbPool;

use crate::error::{EngineError, EngineResult};

/// Who a preference update applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefSubject {
    User(DbId),
    Group(DbId),
}

/// Apply a batch of per-channel overrides for one notification.
///
/// `prefs` maps channel name to the desired `notify` value. The result maps
/// each channel name to what happened; channels whose stored value already
/// matched are omitted. User-subject updates are gated by the notification's
/// permission set through the oracle; group preferences are
/// administrator-managed and bypass the gate.
pub async fn update_preferences(
    pool: &DbPool,
    oracle: &dyn PermissionOracle,
    notification_name: &str,
    subject: PrefSubject,
    prefs: &BTreeMap<String, bool>,
) -> EngineResult<BTreeMap<String, UpsertOutcome>> {
    let notification = NotificationRepo::get_by_name(pool, notification_name)
        .await?
        .ok_or_else(|| CoreError::not_found("Notification", notification_name))?;

    if let PrefSubject::User(user_id) = subject {
        let required = NotificationRepo::permission_names(pool, notification.id).await?;
        if !oracle.has_permissions(user_id, &required).await? {
            return Err(EngineError::Core(CoreError::PermissionDenied(format!(
                "User {user_id} may not edit preferences for '{notification_name}'"
            ))));
        }
    }

    let mut outcomes = BTreeMap::new();
    for (channel_name, &notify) in prefs {
        let channel = ChannelRepo::get_by_name(pool, channel_name)
            .await?
            .ok_or_else(|| CoreError::not_found("Channel", channel_name))?;

        let outcome = match subject {
            PrefSubject::User(user_id) => {
                PreferenceRepo::upsert_user(pool, user_id, notification.id, channel.id, notify)
                    .await?
            }
            PrefSubject::Group(group_id) => {
                PreferenceRepo::upsert_group(pool, group_id, notification.id, channel.id, notify)
                    .await?
            }
        };

        if outcome != UpsertOutcome::Unchanged {
            outcomes.insert(channel_name.clone(), outcome);
        }
    }

    tracing::debug!(
        notification = notification_name,
        ?subject,
        changed = outcomes.len(),
        "Preferences updated"
    );

    Ok(outcomes)
}

/// Remove every stored preference for the given users, reverting them to
/// group and default resolution.
pub async fn clear_preferences(pool: &DbPool, user_ids: &[DbId]) -> EngineResult<u64> {
    let removed = PreferenceRepo::clear_users(pool, user_ids).await?;
    tracing::info!(users = user_ids.len(), removed, "User preferences cleared");
    Ok(removed)
}

// ---------------------------------------------------------------------------
// StorePermissionOracle
// ---------------------------------------------------------------------------

/// [`PermissionOracle`] backed by the identity standin tables.
///
/// Hosts with an external permission system implement the trait themselves
/// and skip this type.
pub struct StorePermissionOracle {
    pool: DbPool,
}

impl StorePermissionOracle {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PermissionOracle for StorePermissionOracle {
    async fn has_permissions(
        &self,
        user_id: DbId,
        permissions: &[String],
    ) -> Result<bool, CoreError> {
        IdentityRepo::has_all_permissions(&self.pool, user_id, permissions)
            .await
            .map_err(|e| CoreError::Internal(e.to_string()))
    }
}
