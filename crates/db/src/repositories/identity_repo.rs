//! Repository for the identity standin tables: `users`, `groups`,
//! `permissions` and their membership/grant join tables.

use courier_core::types::DbId;
use sqlx::PgPool;

use crate::models::identity::{Permission, User};

/// Column list for `users` queries.
const USER_COLUMNS: &str = "id, username, email, is_active, created_at";

/// Column list for `permissions` queries.
const PERMISSION_COLUMNS: &str = "id, name, created_at";

/// Provides lookups over users, group membership, and permission grants.
pub struct IdentityRepo;

impl IdentityRepo {
    /// Get a user by id.
    pub async fn get_user(pool: &PgPool, user_id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Ids of every group the user belongs to.
    pub async fn group_ids_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT group_id FROM user_groups WHERE user_id = $1 ORDER BY group_id")
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Fetch the permissions matching the given names (missing names are
    /// absent from the result).
    pub async fn permissions_by_names(
        pool: &PgPool,
        names: &[String],
    ) -> Result<Vec<Permission>, sqlx::Error> {
        let query =
            format!("SELECT {PERMISSION_COLUMNS} FROM permissions WHERE name = ANY($1) ORDER BY name");
        sqlx::query_as::<_, Permission>(&query)
            .bind(names)
            .fetch_all(pool)
            .await
    }

    /// Whether the user holds every named permission, either directly or
    /// through group membership.
    ///
    /// Names that do not exist in the `permissions` table count as not held.
    pub async fn has_all_permissions(
        pool: &PgPool,
        user_id: DbId,
        names: &[String],
    ) -> Result<bool, sqlx::Error> {
        if names.is_empty() {
            return Ok(true);
        }

        let held: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM permissions p \
             WHERE p.name = ANY($2) \
               AND (EXISTS (SELECT 1 FROM user_permissions up \
                            WHERE up.permission_id = p.id AND up.user_id = $1) \
                 OR EXISTS (SELECT 1 FROM group_permissions gp \
                            JOIN user_groups ug ON ug.group_id = gp.group_id \
                            WHERE gp.permission_id = p.id AND ug.user_id = $1))",
        )
        .bind(user_id)
        .bind(names)
        .fetch_one(pool)
        .await?;

        Ok(held.unwrap_or(0) == names.len() as i64)
    }
}
