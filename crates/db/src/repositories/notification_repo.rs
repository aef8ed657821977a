//! Repository for the `notifications` table and its association tables.

use courier_core::types::DbId;
use sqlx::PgPool;

use crate::models::channel::Channel;
use crate::models::notification::Notification;

/// Column list for `notifications` queries.
const COLUMNS: &str = "id, name, display_name, is_public, default_notify, created_at, updated_at";

/// Column list for joined `channels` queries, qualified to avoid ambiguity.
const CHANNEL_COLUMNS: &str =
    "c.id, c.name, c.display_name, c.description, c.enabled, c.created_at, c.updated_at";

/// Provides CRUD operations for the notification catalog.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Insert or update a notification definition keyed by `name`.
    pub async fn upsert(
        pool: &PgPool,
        name: &str,
        display_name: &str,
        is_public: bool,
        default_notify: bool,
    ) -> Result<Notification, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications (name, display_name, is_public, default_notify) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (name) DO UPDATE SET \
                display_name = EXCLUDED.display_name, \
                is_public = EXCLUDED.is_public, \
                default_notify = EXCLUDED.default_notify, \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(name)
            .bind(display_name)
            .bind(is_public)
            .bind(default_notify)
            .fetch_one(pool)
            .await
    }

    /// Get a notification by its unique name.
    pub async fn get_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notifications WHERE name = $1");
        sqlx::query_as::<_, Notification>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List notifications visible in user-facing preference UIs.
    pub async fn list_public(pool: &PgPool) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notifications WHERE is_public = true ORDER BY name");
        sqlx::query_as::<_, Notification>(&query)
            .fetch_all(pool)
            .await
    }

    /// Replace the channel associations wholesale.
    ///
    /// Runs in a transaction so a concurrent resolution never observes a
    /// half-replaced set.
    pub async fn replace_channels(
        pool: &PgPool,
        notification_id: DbId,
        channel_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM notification_channels WHERE notification_id = $1")
            .bind(notification_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO notification_channels (notification_id, channel_id) \
             SELECT $1, unnest($2::bigint[])",
        )
        .bind(notification_id)
        .bind(channel_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }

    /// Replace the permission associations wholesale.
    pub async fn replace_permissions(
        pool: &PgPool,
        notification_id: DbId,
        permission_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM notification_permissions WHERE notification_id = $1")
            .bind(notification_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO notification_permissions (notification_id, permission_id) \
             SELECT $1, unnest($2::bigint[])",
        )
        .bind(notification_id)
        .bind(permission_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }

    /// Channels allowed for the notification, optionally only enabled ones.
    pub async fn allowed_channels(
        pool: &PgPool,
        notification_id: DbId,
        enabled_only: bool,
    ) -> Result<Vec<Channel>, sqlx::Error> {
        let filter = if enabled_only {
            "AND c.enabled = true"
        } else {
            ""
        };
        let query = format!(
            "SELECT {CHANNEL_COLUMNS} FROM channels c \
             JOIN notification_channels nc ON nc.channel_id = c.id \
             WHERE nc.notification_id = $1 {filter} \
             ORDER BY c.name"
        );
        sqlx::query_as::<_, Channel>(&query)
            .bind(notification_id)
            .fetch_all(pool)
            .await
    }

    /// Names of the permissions required to edit a subscription to this
    /// notification.
    pub async fn permission_names(
        pool: &PgPool,
        notification_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT p.name FROM permissions p \
             JOIN notification_permissions np ON np.permission_id = p.id \
             WHERE np.notification_id = $1 \
             ORDER BY p.name",
        )
        .bind(notification_id)
        .fetch_all(pool)
        .await
    }
}
