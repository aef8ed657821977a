//! Courier dispatch engine.
//!
//! The pieces that turn a named notification and a recipient list into
//! per-channel delivery attempts:
//!
//! - [`ChannelHandler`] — the capability interface a delivery channel
//!   implements, plus the [`ChannelRegistry`] built at bootstrap.
//! - [`channels`] — built-in email (SMTP) and webhook handlers.
//! - [`bootstrap`](bootstrap::bootstrap) — explicit idempotent startup
//!   routine that persists channel definitions and builds the registry.
//! - [`catalog`] — notification define-or-update and channel admin ops.
//! - [`PreferenceResolver`] — three-tier effective-channel resolution.
//! - [`preferences`] — user/group preference updates with permission
//!   gating.
//! - [`Dispatcher`] — the send protocol: resolve, deliver, record.

pub mod bootstrap;
pub mod catalog;
pub mod channel;
pub mod channels;
pub mod dispatcher;
pub mod error;
pub mod preferences;
pub mod resolver;
pub mod template;

pub use channel::{ChannelHandler, ChannelRegistry, DeliveryRequest};
pub use dispatcher::{Dispatcher, Recipients};
pub use error::{EngineError, EngineResult};
pub use resolver::PreferenceResolver;
