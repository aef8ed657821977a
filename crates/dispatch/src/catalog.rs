//! Notification catalog operations.
//!
//! Hosts call [`define_notification`] at startup, after
//! [`bootstrap`](crate::bootstrap::bootstrap), for every notification they
//! emit. The operation is idempotent and keyed on the notification name, so
//! repeated startups converge to the same catalog.

use std::collections::BTreeMap;
use std::collections::HashSet;

use courier_core::error::CoreError;
use courier_core::permissions::PermissionOracle;
use courier_core::types::DbId;
use validator::Validate;

use courier_db::models::notification::Notification;
use courier_db::repositories::{ChannelRepo, IdentityRepo, NotificationRepo};
use courier_db::DbPool;

use crate::error::{EngineError, EngineResult};
use crate::resolver::PreferenceResolver;

/// Definition of a notification, as supplied by the host application.
#[derive(Debug, Clone, Validate)]
pub struct NotificationSpec {
    /// Unique notification name, e.g. `"billing.invoice"`.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Human-readable name; defaults to `name` when absent.
    #[validate(length(min = 1, max = 200))]
    pub display_name: Option<String>,
    /// Permission names a user must hold to edit their subscription.
    pub permissions: Vec<String>,
    /// Allowed channel names. `None` means "every channel enabled right
    /// now" (a snapshot, not a live reference).
    pub channels: Option<Vec<String>>,
    /// Whether the notification appears in user-facing preference UIs.
    pub is_public: bool,
    /// Delivery decision when no preference override exists.
    pub default_notify: bool,
}

impl NotificationSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            permissions: Vec::new(),
            channels: None,
            is_public: true,
            default_notify: true,
        }
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    pub fn channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels = Some(channels.into_iter().map(Into::into).collect());
        self
    }

    pub fn public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }

    pub fn default_notify(mut self, default_notify: bool) -> Self {
        self.default_notify = default_notify;
        self
    }
}

/// Create or update a notification definition, replacing its permission and
/// channel associations wholesale.
///
/// Fails with [`CoreError::Validation`] when the spec is malformed or names
/// a channel or permission that does not exist.
pub async fn define_notification(
    pool: &DbPool,
    spec: &NotificationSpec,
) -> EngineResult<Notification> {
    spec.validate()
        .map_err(|e| CoreError::Validation(e.to_string()))?;

    let channel_ids = match &spec.channels {
        Some(names) => {
            let channels = ChannelRepo::get_by_names(pool, names).await?;
            let found: HashSet<&str> = channels.iter().map(|c| c.name.as_str()).collect();
            let missing: Vec<&str> = names
                .iter()
                .map(String::as_str)
                .filter(|n| !found.contains(n))
                .collect();
            if !missing.is_empty() {
                return Err(EngineError::Core(CoreError::Validation(format!(
                    "Unknown channels: {}",
                    missing.join(", ")
                ))));
            }
            channels.into_iter().map(|c| c.id).collect::<Vec<DbId>>()
        }
        // Snapshot of currently-enabled channels at definition time.
        None => ChannelRepo::list(pool, true)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect(),
    };

    let permissions = IdentityRepo::permissions_by_names(pool, &spec.permissions).await?;
    let found: HashSet<&str> = permissions.iter().map(|p| p.name.as_str()).collect();
    let missing: Vec<&str> = spec
        .permissions
        .iter()
        .map(String::as_str)
        .filter(|n| !found.contains(n))
        .collect();
    if !missing.is_empty() {
        return Err(EngineError::Core(CoreError::Validation(format!(
            "Unknown permissions: {}",
            missing.join(", ")
        ))));
    }
    let permission_ids: Vec<DbId> = permissions.into_iter().map(|p| p.id).collect();

    let display_name = spec.display_name.as_deref().unwrap_or(&spec.name);
    let notification = NotificationRepo::upsert(
        pool,
        &spec.name,
        display_name,
        spec.is_public,
        spec.default_notify,
    )
    .await?;

    NotificationRepo::replace_channels(pool, notification.id, &channel_ids).await?;
    NotificationRepo::replace_permissions(pool, notification.id, &permission_ids).await?;

    tracing::info!(
        notification = %notification.name,
        channels = channel_ids.len(),
        permissions = permission_ids.len(),
        "Notification defined"
    );

    Ok(notification)
}

/// Public notifications the user may see and subscribe to: at least one
/// allowed channel, and the user satisfies the permission set.
pub async fn notifications_for_user(
    pool: &DbPool,
    oracle: &dyn PermissionOracle,
    user_id: DbId,
) -> EngineResult<Vec<Notification>> {
    let mut visible = Vec::new();
    for notification in NotificationRepo::list_public(pool).await? {
        let channels = NotificationRepo::allowed_channels(pool, notification.id, false).await?;
        if channels.is_empty() {
            continue;
        }
        let required = NotificationRepo::permission_names(pool, notification.id).await?;
        if oracle.has_permissions(user_id, &required).await? {
            visible.push(notification);
        }
    }
    Ok(visible)
}

/// Resolved preference map for every notification visible to the user:
/// notification name → (channel name → effective notify).
pub async fn user_prefs_overview(
    pool: &DbPool,
    oracle: &dyn PermissionOracle,
    user_id: DbId,
) -> EngineResult<BTreeMap<String, BTreeMap<String, bool>>> {
    let mut overview = BTreeMap::new();
    for notification in notifications_for_user(pool, oracle, user_id).await? {
        let view = PreferenceResolver::user_prefs_view(pool, &notification, user_id).await?;
        overview.insert(notification.name, view);
    }
    Ok(overview)
}

/// Flip a channel's operator kill switch.
pub async fn set_channel_enabled(pool: &DbPool, name: &str, enabled: bool) -> EngineResult<()> {
    if !ChannelRepo::set_enabled(pool, name, enabled).await? {
        return Err(EngineError::Core(CoreError::not_found("Channel", name)));
    }
    tracing::info!(channel = name, enabled, "Channel kill switch changed");
    Ok(())
}

/// Delete a channel.
///
/// Fails with [`CoreError::ProtectedReference`] while any notification
/// association or user/group preference still references the channel.
pub async fn delete_channel(pool: &DbPool, name: &str) -> EngineResult<()> {
    let channel = ChannelRepo::get_by_name(pool, name)
        .await?
        .ok_or_else(|| CoreError::not_found("Channel", name))?;

    if ChannelRepo::delete_if_unreferenced(pool, channel.id).await? {
        tracing::info!(channel = name, "Channel deleted");
        return Ok(());
    }

    Err(EngineError::Core(CoreError::ProtectedReference(format!(
        "Channel '{name}' is still referenced by notifications or preferences"
    ))))
}
