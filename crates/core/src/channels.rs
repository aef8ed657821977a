//! Well-known channel name constants.
//!
//! These must match the `channels.name` values created at bootstrap by the
//! built-in handlers and referenced by preferences and delivery records.

/// Email delivery via SMTP.
pub const CHANNEL_EMAIL: &str = "email";

/// Webhook delivery to an external HTTP endpoint.
pub const CHANNEL_WEBHOOK: &str = "webhook";
