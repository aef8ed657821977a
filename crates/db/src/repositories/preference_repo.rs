//! Repository for the `user_preferences` and `group_preferences` tables.

use courier_core::types::DbId;
use sqlx::PgPool;

use crate::models::preference::{GroupPreference, UpsertOutcome, UserPreference};

/// Column list for `user_preferences` queries.
const USER_COLUMNS: &str =
    "id, user_id, notification_id, channel_id, notify, created_at, updated_at";

/// Column list for `group_preferences` queries.
const GROUP_COLUMNS: &str =
    "id, group_id, notification_id, channel_id, notify, created_at, updated_at";

/// Provides CRUD operations for per-user and per-group channel preferences.
pub struct PreferenceRepo;

impl PreferenceRepo {
    /// All of a user's explicit preferences for one notification.
    pub async fn user_prefs_for(
        pool: &PgPool,
        user_id: DbId,
        notification_id: DbId,
    ) -> Result<Vec<UserPreference>, sqlx::Error> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM user_preferences \
             WHERE user_id = $1 AND notification_id = $2"
        );
        sqlx::query_as::<_, UserPreference>(&query)
            .bind(user_id)
            .bind(notification_id)
            .fetch_all(pool)
            .await
    }

    /// Explicit preferences of the given groups for one notification.
    pub async fn group_prefs_for(
        pool: &PgPool,
        group_ids: &[DbId],
        notification_id: DbId,
    ) -> Result<Vec<GroupPreference>, sqlx::Error> {
        let query = format!(
            "SELECT {GROUP_COLUMNS} FROM group_preferences \
             WHERE group_id = ANY($1) AND notification_id = $2"
        );
        sqlx::query_as::<_, GroupPreference>(&query)
            .bind(group_ids)
            .bind(notification_id)
            .fetch_all(pool)
            .await
    }

    /// Create or update a user preference, reporting what happened.
    ///
    /// A value equal to the stored one is a no-op (`Unchanged`) and does not
    /// touch `updated_at`. The insert path uses `ON CONFLICT` on the unique
    /// triple so concurrent creates cannot produce duplicate rows.
    pub async fn upsert_user(
        pool: &PgPool,
        user_id: DbId,
        notification_id: DbId,
        channel_id: DbId,
        notify: bool,
    ) -> Result<UpsertOutcome, sqlx::Error> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM user_preferences \
             WHERE user_id = $1 AND notification_id = $2 AND channel_id = $3"
        );
        let existing = sqlx::query_as::<_, UserPreference>(&query)
            .bind(user_id)
            .bind(notification_id)
            .bind(channel_id)
            .fetch_optional(pool)
            .await?;

        match existing {
            None => {
                sqlx::query(
                    "INSERT INTO user_preferences (user_id, notification_id, channel_id, notify) \
                     VALUES ($1, $2, $3, $4) \
                     ON CONFLICT ON CONSTRAINT uq_user_preferences_triple DO UPDATE SET \
                        notify = EXCLUDED.notify, \
                        updated_at = NOW()",
                )
                .bind(user_id)
                .bind(notification_id)
                .bind(channel_id)
                .bind(notify)
                .execute(pool)
                .await?;
                Ok(UpsertOutcome::Created)
            }
            Some(pref) if pref.notify == notify => Ok(UpsertOutcome::Unchanged),
            Some(pref) => {
                sqlx::query(
                    "UPDATE user_preferences SET notify = $2, updated_at = NOW() WHERE id = $1",
                )
                .bind(pref.id)
                .bind(notify)
                .execute(pool)
                .await?;
                Ok(UpsertOutcome::Updated)
            }
        }
    }

    /// Create or update a group preference. Same shape as
    /// [`upsert_user`](Self::upsert_user); groups are administrator-managed
    /// so there is no permission gate at this layer.
    pub async fn upsert_group(
        pool: &PgPool,
        group_id: DbId,
        notification_id: DbId,
        channel_id: DbId,
        notify: bool,
    ) -> Result<UpsertOutcome, sqlx::Error> {
        let query = format!(
            "SELECT {GROUP_COLUMNS} FROM group_preferences \
             WHERE group_id = $1 AND notification_id = $2 AND channel_id = $3"
        );
        let existing = sqlx::query_as::<_, GroupPreference>(&query)
            .bind(group_id)
            .bind(notification_id)
            .bind(channel_id)
            .fetch_optional(pool)
            .await?;

        match existing {
            None => {
                sqlx::query(
                    "INSERT INTO group_preferences (group_id, notification_id, channel_id, notify) \
                     VALUES ($1, $2, $3, $4) \
                     ON CONFLICT ON CONSTRAINT uq_group_preferences_triple DO UPDATE SET \
                        notify = EXCLUDED.notify, \
                        updated_at = NOW()",
                )
                .bind(group_id)
                .bind(notification_id)
                .bind(channel_id)
                .bind(notify)
                .execute(pool)
                .await?;
                Ok(UpsertOutcome::Created)
            }
            Some(pref) if pref.notify == notify => Ok(UpsertOutcome::Unchanged),
            Some(pref) => {
                sqlx::query(
                    "UPDATE group_preferences SET notify = $2, updated_at = NOW() WHERE id = $1",
                )
                .bind(pref.id)
                .bind(notify)
                .execute(pool)
                .await?;
                Ok(UpsertOutcome::Updated)
            }
        }
    }

    /// Delete every user preference for the given users (account reset or
    /// offboarding). Returns the number of rows removed.
    pub async fn clear_users(pool: &PgPool, user_ids: &[DbId]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_preferences WHERE user_id = ANY($1)")
            .bind(user_ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
