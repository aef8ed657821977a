//! Permission oracle seam.
//!
//! A notification may carry a set of required permissions. They gate whether
//! a user may view or edit their own subscription to the notification; they
//! never gate delivery itself. The concrete permission backend belongs to
//! the host application, so it is abstracted behind [`PermissionOracle`].

use crate::error::CoreError;
use crate::types::DbId;

/// Answers whether a user satisfies a set of required permissions.
#[async_trait::async_trait]
pub trait PermissionOracle: Send + Sync {
    /// Return `true` iff `user_id` holds every permission in `permissions`.
    ///
    /// An empty `permissions` slice means "no restriction" and must resolve
    /// to `true`.
    async fn has_permissions(&self, user_id: DbId, permissions: &[String])
        -> Result<bool, CoreError>;
}

/// Oracle that grants everything. Useful for hosts without a permission
/// backend and for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait::async_trait]
impl PermissionOracle for AllowAll {
    async fn has_permissions(
        &self,
        _user_id: DbId,
        _permissions: &[String],
    ) -> Result<bool, CoreError> {
        Ok(true)
    }
}
