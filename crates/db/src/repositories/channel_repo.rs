//! Repository for the `channels` table.

use courier_core::types::DbId;
use sqlx::PgPool;

use crate::models::channel::Channel;

/// Column list for `channels` queries.
const COLUMNS: &str = "id, name, display_name, description, enabled, created_at, updated_at";

/// Provides CRUD operations for delivery channels.
pub struct ChannelRepo;

impl ChannelRepo {
    /// Insert or update a channel definition from its in-process handler.
    ///
    /// Uses `INSERT ... ON CONFLICT (name) DO UPDATE` so the bootstrap call
    /// is idempotent. `enabled` is deliberately not part of the update set:
    /// it is operator-owned and survives restarts.
    pub async fn upsert_definition(
        pool: &PgPool,
        name: &str,
        display_name: &str,
        description: Option<&str>,
    ) -> Result<Channel, sqlx::Error> {
        let query = format!(
            "INSERT INTO channels (name, display_name, description) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (name) DO UPDATE SET \
                display_name = EXCLUDED.display_name, \
                description = EXCLUDED.description, \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Channel>(&query)
            .bind(name)
            .bind(display_name)
            .bind(description)
            .fetch_one(pool)
            .await
    }

    /// Get a channel by its unique name.
    pub async fn get_by_name(pool: &PgPool, name: &str) -> Result<Option<Channel>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM channels WHERE name = $1");
        sqlx::query_as::<_, Channel>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List channels, optionally restricted to enabled ones.
    pub async fn list(pool: &PgPool, enabled_only: bool) -> Result<Vec<Channel>, sqlx::Error> {
        let filter = if enabled_only {
            "WHERE enabled = true"
        } else {
            ""
        };
        let query = format!("SELECT {COLUMNS} FROM channels {filter} ORDER BY name");
        sqlx::query_as::<_, Channel>(&query).fetch_all(pool).await
    }

    /// Fetch the channels matching the given names (missing names are
    /// simply absent from the result; the caller decides whether that is an
    /// error).
    pub async fn get_by_names(
        pool: &PgPool,
        names: &[String],
    ) -> Result<Vec<Channel>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM channels WHERE name = ANY($1) ORDER BY name");
        sqlx::query_as::<_, Channel>(&query)
            .bind(names)
            .fetch_all(pool)
            .await
    }

    /// Flip the operator kill switch. Returns `false` if the channel does
    /// not exist.
    pub async fn set_enabled(
        pool: &PgPool,
        name: &str,
        enabled: bool,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE channels SET enabled = $2, updated_at = NOW() WHERE name = $1")
                .bind(name)
                .bind(enabled)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a channel only if nothing references it.
    ///
    /// The reference check and the delete run as a single statement so a
    /// concurrent preference insert cannot slip between them. Returns `true`
    /// if the row was deleted.
    pub async fn delete_if_unreferenced(
        pool: &PgPool,
        channel_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM channels WHERE id = $1 \
             AND NOT EXISTS (SELECT 1 FROM notification_channels WHERE channel_id = $1) \
             AND NOT EXISTS (SELECT 1 FROM user_preferences WHERE channel_id = $1) \
             AND NOT EXISTS (SELECT 1 FROM group_preferences WHERE channel_id = $1)",
        )
        .bind(channel_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
