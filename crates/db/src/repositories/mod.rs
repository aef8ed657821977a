//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod channel_repo;
pub mod delivery_repo;
pub mod identity_repo;
pub mod notification_repo;
pub mod preference_repo;

pub use channel_repo::ChannelRepo;
pub use delivery_repo::DeliveryRecordRepo;
pub use identity_repo::IdentityRepo;
pub use notification_repo::NotificationRepo;
pub use preference_repo::PreferenceRepo;
