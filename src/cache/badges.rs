//! Badge Cache
//!
//! Typed view over the shared cache holding rendered badge images, keyed by
//! track id, plus a single entry for the idle state.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::cache::{BadgeImage, CacheValue, SharedCache, Ttl};
use crate::error::RenderError;

/// Cache key of the "nothing playing" badge.
pub const IDLE_BADGE_KEY: &str = "badge:idle";

const TRACK_KEY_PREFIX: &str = "track:";

// == Badge Key ==
/// Identifies a badge image in the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BadgeKey {
    /// Badge for a specific track id
    Track(String),
    /// Badge shown while nothing is playing
    Idle,
}

impl BadgeKey {
    pub fn cache_key(&self) -> String {
        match self {
            BadgeKey::Track(id) => format!("{TRACK_KEY_PREFIX}{id}"),
            BadgeKey::Idle => IDLE_BADGE_KEY.to_string(),
        }
    }
}

type KeyLocks = StdMutex<HashMap<String, Arc<Mutex<()>>>>;

// == Badge Store ==
/// Stores rendered badges in the shared cache.
///
/// Track badges use the cache's default TTL; the idle badge uses its own
/// configured TTL. Concurrent misses for one key are collapsed so only one
/// caller renders.
#[derive(Clone)]
pub struct BadgeStore {
    cache: SharedCache,
    idle_ttl: Ttl,
    in_flight: Arc<KeyLocks>,
}

impl BadgeStore {
    /// # Arguments
    /// * `cache` - The shared cache
    /// * `idle_ttl` - Expiry policy for the idle badge
    pub fn new(cache: SharedCache, idle_ttl: Ttl) -> Self {
        Self {
            cache,
            idle_ttl,
            in_flight: Arc::new(StdMutex::new(HashMap::new())),
        }
    }

    fn ttl_for(&self, key: &BadgeKey) -> Ttl {
        match key {
            BadgeKey::Track(_) => Ttl::Default,
            BadgeKey::Idle => self.idle_ttl,
        }
    }

    // == Get Or Render ==
    /// Returns the cached badge for `key`, rendering and storing it on a miss.
    ///
    /// A render failure is returned to the caller and nothing is cached, so
    /// the next request tries again.
    pub async fn get_or_render<F, Fut>(&self, key: &BadgeKey, render: F) -> Result<Vec<u8>, RenderError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>, RenderError>>,
    {
        let cache_key = key.cache_key();
        if let Some(svg) = self.cached(&cache_key).await {
            debug!("Badge cache hit for {}", cache_key);
            return Ok(svg);
        }

        let in_flight = self.key_lock(&cache_key);
        let _held = in_flight.lock.lock().await;

        // Another caller may have rendered while we waited
        if let Some(svg) = self.cached(&cache_key).await {
            return Ok(svg);
        }

        let svg = render().await?;
        info!("Rendered badge for {} ({} bytes)", cache_key, svg.len());
        self.cache.write().await.set(
            cache_key.clone(),
            CacheValue::Badge(BadgeImage { svg: svg.clone() }),
            self.ttl_for(key),
        );
        Ok(svg)
    }

    async fn cached(&self, cache_key: &str) -> Option<Vec<u8>> {
        match self.cache.write().await.get(cache_key)? {
            CacheValue::Badge(image) => Some(image.svg),
            CacheValue::Credential(_) => None,
        }
    }

    fn key_lock(&self, cache_key: &str) -> InFlight<'_> {
        let lock = lock_map(&self.in_flight)
            .entry(cache_key.to_string())
            .or_default()
            .clone();

        InFlight {
            locks: &self.in_flight,
            key: cache_key.to_string(),
            lock,
        }
    }

    #[cfg(test)]
    fn in_flight_len(&self) -> usize {
        lock_map(&self.in_flight).len()
    }
}

fn lock_map(locks: &KeyLocks) -> MutexGuard<'_, HashMap<String, Arc<Mutex<()>>>> {
    locks.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Claim on one key's render lock.
///
/// Dropping it removes the key from the in-flight map once no other caller
/// holds the lock, including when the request is cancelled mid-render.
struct InFlight<'a> {
    locks: &'a KeyLocks,
    key: String,
    lock: Arc<Mutex<()>>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut locks = lock_map(self.locks);
        // Only the map and this claim hold it: nobody else is waiting
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.key);
        }
    }
}
