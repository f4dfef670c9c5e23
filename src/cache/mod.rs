//! Cache Module
//!
//! Provides the in-memory expiring cache, its on-disk persistence, and the
//! typed credential and badge stores layered on top of it.

mod badges;
mod credentials;
mod entry;
mod persist;
mod stats;
mod store;
mod value;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use badges::{BadgeKey, BadgeStore, IDLE_BADGE_KEY};
pub use credentials::CredentialStore;
pub use entry::{CacheEntry, Ttl};
pub use persist::{load_cache, restore_cache, save_cache};
pub use stats::CacheStats;
pub use store::CacheStore;
pub use value::{shared, BadgeImage, CacheValue, SharedCache};
