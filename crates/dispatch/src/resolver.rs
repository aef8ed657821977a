//! Effective-channel resolution.
//!
//! Applies the three-tier override rule from [`courier_core::resolve`] to
//! live preference data. Resolution is a pure function over current state:
//! nothing is cached, every send re-resolves.

use std::collections::{BTreeMap, HashMap};

use courier_core::resolve::effective_notify;
use courier_core::types::DbId;
use courier_db::models::channel::Channel;
use courier_db::models::notification::Notification;
use courier_db::repositories::{IdentityRepo, NotificationRepo, PreferenceRepo};
use courier_db::DbPool;

use crate::error::EngineResult;

/// Computes the effective channel set for a (notification, user) pair.
pub struct PreferenceResolver;

impl PreferenceResolver {
    /// Channels the notification should actually be delivered through for
    /// this user.
    ///
    /// The result is always a subset of the notification's allowed channels
    /// intersected with the currently-enabled channels; preference
    /// overrides can only opt in or out within that set.
    pub async fn resolve_channels(
        pool: &DbPool,
        notification: &Notification,
        user_id: DbId,
    ) -> EngineResult<Vec<Channel>> {
        let candidates =
            NotificationRepo::allowed_channels(pool, notification.id, true).await?;
        if candidates.is_empty() {
            return Ok(vec![]);
        }

        let (user_prefs, group_prefs) =
            Self::load_preferences(pool, notification, user_id).await?;

        Ok(candidates
            .into_iter()
            .filter(|channel| {
                let resolution = effective_notify(
                    user_prefs.get(&channel.id).copied(),
                    group_prefs.get(&channel.id).map_or(&[][..], Vec::as_slice),
                    notification.default_notify,
                );
                resolution.notify
            })
            .collect())
    }

    /// Per-channel resolved state for preference UIs: every enabled channel
    /// allowed by the notification, mapped to whether delivery is currently
    /// on for this user. Channels without an explicit preference show the
    /// resolved default, not "unset".
    pub async fn user_prefs_view(
        pool: &DbPool,
        notification: &Notification,
        user_id: DbId,
    ) -> EngineResult<BTreeMap<String, bool>> {
        let candidates =
            NotificationRepo::allowed_channels(pool, notification.id, true).await?;
        if candidates.is_empty() {
            return Ok(BTreeMap::new());
        }

        let (user_prefs, group_prefs) =
            Self::load_preferences(pool, notification, user_id).await?;

        Ok(candidates
            .into_iter()
            .map(|channel| {
                let resolution = effective_notify(
                    user_prefs.get(&channel.id).copied(),
                    group_prefs.get(&channel.id).map_or(&[][..], Vec::as_slice),
                    notification.default_notify,
                );
                (channel.name, resolution.notify)
            })
            .collect())
    }

    /// Fetch the user's explicit preferences and those of all their groups,
    /// keyed by channel id.
    async fn load_preferences(
        pool: &DbPool,
        notification: &Notification,
        user_id: DbId,
    ) -> EngineResult<(HashMap<DbId, bool>, HashMap<DbId, Vec<bool>>)> {
        let user_prefs: HashMap<DbId, bool> =
            PreferenceRepo::user_prefs_for(pool, user_id, notification.id)
                .await?
                .into_iter()
                .map(|p| (p.channel_id, p.notify))
                .collect();

        let group_ids = IdentityRepo::group_ids_for_user(pool, user_id).await?;
        let mut group_prefs: HashMap<DbId, Vec<bool>> = HashMap::new();
        if !group_ids.is_empty() {
            for pref in
                PreferenceRepo::group_prefs_for(pool, &group_ids, notification.id).await?
            {
                group_prefs.entry(pref.channel_id).or_default().push(pref.notify);
            }
        }

        Ok((user_prefs, group_prefs))
    }
}
