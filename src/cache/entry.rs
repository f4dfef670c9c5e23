//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with expiry support.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

// == Ttl ==
/// Expiry policy applied when an entry is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Use the default TTL the store was configured with
    Default,
    /// The entry never expires
    Never,
    /// The entry expires once the duration has elapsed
    After(Duration),
}

// == Cache Entry ==
/// Represents a single cache entry with its value and expiry metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Expiration timestamp, None = no expiration
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl` from now.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl` - Optional time-to-live, None = never expires
    pub fn new(value: V, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.and_then(expiry_from_now),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is greater than or equal to
    /// its expiration time. Entries without expiry never expire.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Same as [`CacheEntry::is_expired`] against a fixed point in time.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the entry has expired
    /// - `Some(remaining)` if the entry has an expiry in the future
    /// - `None` if the entry never expires
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|expires| (expires - Utc::now()).to_std().unwrap_or(Duration::ZERO))
    }
}

// == Utility Functions ==
/// Returns the absolute expiry for a TTL starting now.
///
/// A TTL too large to represent is treated as no expiry.
pub fn expiry_from_now(ttl: Duration) -> Option<DateTime<Utc>> {
    let delta = TimeDelta::from_std(ttl).ok()?;
    Utc::now().checked_add_signed(delta)
}
