//! Built-in delivery channel handlers.
//!
//! Hosts may register any [`ChannelHandler`](crate::ChannelHandler)
//! implementation at bootstrap; these are the two that ship with courier.

pub mod email;
pub mod webhook;

pub use email::{EmailChannel, EmailConfig};
pub use webhook::{WebhookChannel, WebhookConfig};
