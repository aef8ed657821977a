//! The send protocol: resolve recipients, deliver per channel, record.
//!
//! [`Dispatcher::send`] is the engine's single entry point for emitting a
//! notification. Failures are contained per (recipient, channel) pair: a
//! handler that returns `false`, times out, or is missing from the registry
//! produces a failed [`DeliveryRecord`](courier_db::models::delivery::DeliveryRecord)
//! and never aborts the remaining deliveries.

use std::sync::Arc;
use std::time::Duration;

use courier_core::error::CoreError;
use courier_core::types::DbId;
use courier_db::repositories::{DeliveryRecordRepo, IdentityRepo, NotificationRepo};
use courier_db::DbPool;

use crate::channel::{ChannelRegistry, DeliveryRequest};
use crate::error::{EngineError, EngineResult};
use crate::resolver::PreferenceResolver;

/// Upper bound on a single handler invocation.
const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Recipient list for one send, by user id.
#[derive(Debug, Clone, Default)]
pub struct Recipients(pub Vec<DbId>);

impl From<DbId> for Recipients {
    fn from(user_id: DbId) -> Self {
        Self(vec![user_id])
    }
}

impl From<Vec<DbId>> for Recipients {
    fn from(user_ids: Vec<DbId>) -> Self {
        Self(user_ids)
    }
}

impl From<&[DbId]> for Recipients {
    fn from(user_ids: &[DbId]) -> Self {
        Self(user_ids.to_vec())
    }
}

/// Drives the resolve → deliver → record loop for each send.
pub struct Dispatcher {
    pool: DbPool,
    registry: Arc<ChannelRegistry>,
    send_timeout: Duration,
}

impl Dispatcher {
    pub fn new(pool: DbPool, registry: Arc<ChannelRegistry>) -> Self {
        Self {
            pool,
            registry,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    /// Override the per-handler delivery timeout.
    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    /// Send a notification to every recipient over their effective channels.
    ///
    /// `message` defaults to the notification's display name. One delivery
    /// record is written per (recipient, channel) attempt, success or not;
    /// callers inspect delivery records when they need outcomes. Errors are
    /// returned only for an unknown notification or a database failure;
    /// channel-level problems are contained and recorded.
    pub async fn send(
        &self,
        notification_name: &str,
        recipients: impl Into<Recipients>,
        message: Option<&str>,
        path: Option<&str>,
        context: Option<&serde_json::Value>,
    ) -> EngineResult<()> {
        let notification = NotificationRepo::get_by_name(&self.pool, notification_name)
            .await?
            .ok_or_else(|| {
                EngineError::Core(CoreError::not_found("Notification", notification_name))
            })?;

        let message = message.unwrap_or(&notification.display_name);
        let recipients = recipients.into();
        let mut delivered: usize = 0;
        let mut failed: usize = 0;
        let mut skipped: usize = 0;

        for user_id in &recipients.0 {
            let user = match IdentityRepo::get_user(&self.pool, *user_id).await? {
                Some(user) if user.is_active => user,
                Some(_) => {
                    tracing::warn!(user_id, notification = notification_name, "Recipient inactive, skipping");
                    skipped += 1;
                    continue;
                }
                None => {
                    tracing::warn!(user_id, notification = notification_name, "Recipient unknown, skipping");
                    skipped += 1;
                    continue;
                }
            };

            let channels =
                PreferenceResolver::resolve_channels(&self.pool, &notification, user.id).await?;

            for channel in channels {
                let request = DeliveryRequest {
                    user: &user,
                    notification: &notification,
                    message,
                    path,
                    context,
                };

                let success = match self.registry.get(&channel.name) {
                    Some(handler) => {
                        match tokio::time::timeout(self.send_timeout, handler.deliver(&request))
                            .await
                        {
                            Ok(success) => success,
                            Err(_) => {
                                tracing::warn!(
                                    channel = %channel.name,
                                    user_id = user.id,
                                    notification = notification_name,
                                    timeout_secs = self.send_timeout.as_secs(),
                                    "Channel handler timed out"
                                );
                                false
                            }
                        }
                    }
                    // Registered in the database but not in this process.
                    None => {
                        tracing::warn!(
                            channel = %channel.name,
                            user_id = user.id,
                            notification = notification_name,
                            "No handler registered for channel"
                        );
                        false
                    }
                };

                // The description is always the recipient-facing message;
                // failure causes live in the logs, not the inbox.
                DeliveryRecordRepo::create(
                    &self.pool,
                    user.id,
                    notification.id,
                    channel.id,
                    success,
                    Some(message),
                    path,
                )
                .await?;

                if success {
                    delivered += 1;
                } else {
                    failed += 1;
                }
            }
        }

        tracing::info!(
            notification = notification_name,
            recipients = recipients.0.len(),
            delivered,
            failed,
            skipped,
            "Notification dispatched"
        );

        Ok(())
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipients_from_single_id() {
        let recipients: Recipients = 42.into();
        assert_eq!(recipients.0, vec![42]);
    }

    #[test]
    fn recipients_from_slice() {
        let ids = [1, 2, 3];
        let recipients: Recipients = ids.as_slice().into();
        assert_eq!(recipients.0, vec![1, 2, 3]);
    }
}
