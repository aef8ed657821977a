//! Row models and DTOs.
//!
//! Each submodule contains `FromRow` + `Serialize` entity structs matching
//! the database rows for one table family.

pub mod channel;
pub mod delivery;
pub mod identity;
pub mod notification;
pub mod preference;
