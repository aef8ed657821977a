//! Courier domain core.
//!
//! Pure domain types and logic shared by the storage and dispatch layers:
//!
//! - [`types`] — workspace-wide id and timestamp aliases.
//! - [`error`] — the [`CoreError`](error::CoreError) taxonomy.
//! - [`channels`] — well-known channel name constants.
//! - [`resolve`] — the three-tier preference resolution function.
//! - [`permissions`] — the [`PermissionOracle`](permissions::PermissionOracle)
//!   seam for the host's permission backend.

pub mod channels;
pub mod error;
pub mod permissions;
pub mod resolve;
pub mod types;

pub use error::CoreError;
pub use permissions::PermissionOracle;
