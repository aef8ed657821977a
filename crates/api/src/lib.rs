//! Courier HTTP API.
//!
//! A thin axum layer over `courier-dispatch`: an inbox over delivery
//! records, preference viewing and editing, notification send, and channel
//! administration. Authentication is delegated to an upstream gateway that
//! sets the `X-User-Id` header; see [`auth::AuthUser`].

pub mod auth;
pub mod config;
pub mod error;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
