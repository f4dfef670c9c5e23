//! Cache Store Module
//!
//! Main cache engine: a HashMap of string keys to expiring entries.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;

use crate::cache::{CacheEntry, CacheStats, Ttl};

// == Cache Store ==
/// In-memory key-value storage with per-entry expiry.
///
/// Expired entries are invisible to readers as soon as their TTL elapses and
/// are physically removed either on read or by [`CacheStore::cleanup_expired`].
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Performance statistics
    stats: CacheStats,
    /// TTL applied for `Ttl::Default`, None = never expire
    default_ttl: Option<Duration>,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates an empty CacheStore.
    ///
    /// # Arguments
    /// * `default_ttl` - TTL applied to entries written with `Ttl::Default`
    pub fn new(default_ttl: Option<Duration>) -> Self {
        Self::from_items(default_ttl, HashMap::new())
    }

    /// Creates a CacheStore pre-populated with previously saved entries.
    ///
    /// Entries that expired while the items were at rest are dropped.
    pub fn from_items(default_ttl: Option<Duration>, items: HashMap<String, CacheEntry<V>>) -> Self {
        let now = Utc::now();
        let entries: HashMap<_, _> = items
            .into_iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .collect();

        let mut stats = CacheStats::new();
        stats.set_total_entries(entries.len());

        Self {
            entries,
            stats,
            default_ttl,
        }
    }

    /// Returns the TTL used for `Ttl::Default`.
    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }

    // == Set ==
    /// Stores a value, overwriting any previous entry and its expiry.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Expiry policy for this entry
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Ttl) {
        let ttl = match ttl {
            Ttl::Default => self.default_ttl,
            Ttl::Never => None,
            Ttl::After(duration) => Some(duration),
        };

        self.entries.insert(key.into(), CacheEntry::new(value, ttl));
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Retrieves a copy of the value stored under `key`.
    ///
    /// Returns None if the key is absent or its entry has expired. An expired
    /// entry found here is removed without waiting for the next sweep.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                let value = entry.value.clone();
                self.stats.record_hit();
                return Some(value);
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove(key);
            self.stats.record_expirations(1);
            self.stats.set_total_entries(self.entries.len());
        }
        self.stats.record_miss();
        None
    }

    // == Delete ==
    /// Removes an entry by key, returning whether it was present.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Items ==
    /// Returns a point-in-time copy of every live entry with its expiry.
    pub fn items(&self) -> HashMap<String, CacheEntry<V>> {
        let now = Utc::now();
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Utc::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));

        let count = before - self.entries.len();
        self.stats.record_expirations(count);
        self.stats.set_total_entries(self.entries.len());
        count
    }

    // == Length ==
    /// Returns the number of entries physically held, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
