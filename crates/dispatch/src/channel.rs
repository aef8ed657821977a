//! Channel capability interface and the in-process handler registry.
//!
//! A channel implementation is registered once at bootstrap under its
//! unique name; the dispatcher resolves handlers from the registry by the
//! `channels.name` column value. There is no dynamic code loading: the set
//! of channels is closed at startup.

use std::collections::HashMap;
use std::sync::Arc;

use courier_db::models::notification::Notification;
use courier_db::models::identity::User;

/// Everything a handler needs to perform one delivery attempt.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryRequest<'a> {
    /// The recipient of this attempt.
    pub user: &'a User,
    /// The notification being delivered.
    pub notification: &'a Notification,
    /// Resolved message text (defaults to the notification display name).
    pub message: &'a str,
    /// Optional deep link shown with the message.
    pub path: Option<&'a str>,
    /// Optional template context supplied by the caller.
    pub context: Option<&'a serde_json::Value>,
}

/// A named delivery mechanism.
///
/// `deliver` must never panic and must never propagate transport or
/// template errors: expected failure modes are caught inside the handler
/// and reduced to `false`. The dispatcher records the boolean outcome and
/// moves on to the next (recipient, channel) pair.
#[async_trait::async_trait]
pub trait ChannelHandler: Send + Sync {
    /// Unique channel name; matches the `channels.name` row.
    fn name(&self) -> &'static str;

    /// Human-readable name shown in preference UIs.
    fn display_name(&self) -> &'static str;

    /// Optional description shown in preference UIs.
    fn description(&self) -> Option<&'static str> {
        None
    }

    /// Attempt one delivery. Returns `true` on success.
    async fn deliver(&self, request: &DeliveryRequest<'_>) -> bool;
}

/// Immutable name → handler map built by
/// [`bootstrap`](crate::bootstrap::bootstrap) and shared via `Arc`.
#[derive(Default)]
pub struct ChannelRegistry {
    handlers: HashMap<String, Arc<dyn ChannelHandler>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its own name. Replaces any previous handler
    /// with the same name.
    pub fn insert(&mut self, handler: Arc<dyn ChannelHandler>) {
        self.handlers.insert(handler.name().to_string(), handler);
    }

    /// Look up a handler by channel name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ChannelHandler>> {
        self.handlers.get(name)
    }

    /// Names of all registered handlers, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullChannel(&'static str);

    #[async_trait::async_trait]
    impl ChannelHandler for NullChannel {
        fn name(&self) -> &'static str {
            self.0
        }

        fn display_name(&self) -> &'static str {
            "Null"
        }

        async fn deliver(&self, _request: &DeliveryRequest<'_>) -> bool {
            true
        }
    }

    #[test]
    fn registry_lookup_by_name() {
        let mut registry = ChannelRegistry::new();
        registry.insert(Arc::new(NullChannel("email")));
        registry.insert(Arc::new(NullChannel("webhook")));

        assert_eq!(registry.len(), 2);
        assert!(registry.get("email").is_some());
        assert!(registry.get("sms").is_none());
        assert_eq!(registry.names(), vec!["email", "webhook"]);
    }

    #[test]
    fn registry_insert_replaces_same_name() {
        let mut registry = ChannelRegistry::new();
        registry.insert(Arc::new(NullChannel("email")));
        registry.insert(Arc::new(NullChannel("email")));
        assert_eq!(registry.len(), 1);
    }
}
