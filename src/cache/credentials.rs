//! Credential Store
//!
//! Typed view over the shared cache holding one never-expiring credential per
//! Spotify user.

use tracing::warn;

use crate::cache::{CacheValue, SharedCache, Ttl};
use crate::spotify::Credential;

const KEY_PREFIX: &str = "user:";

/// Stores user credentials in the shared cache.
#[derive(Clone)]
pub struct CredentialStore {
    cache: SharedCache,
}

impl CredentialStore {
    pub fn new(cache: SharedCache) -> Self {
        Self { cache }
    }

    /// Saves a user's credential, replacing any previous one.
    ///
    /// Credentials never expire and are never removed by the sweep.
    pub async fn store(&self, user_id: &str, credential: Credential) {
        let mut cache = self.cache.write().await;
        cache.set(
            credential_key(user_id),
            CacheValue::Credential(credential),
            Ttl::Never,
        );
    }

    /// Returns the stored credential for a user, if any.
    pub async fn load(&self, user_id: &str) -> Option<Credential> {
        let value = self.cache.write().await.get(&credential_key(user_id))?;

        match value {
            CacheValue::Credential(credential) => Some(credential),
            other => {
                warn!("Unexpected {:?} entry under credential key for {}", kind(&other), user_id);
                None
            }
        }
    }
}

fn credential_key(user_id: &str) -> String {
    format!("{KEY_PREFIX}{user_id}")
}

fn kind(value: &CacheValue) -> &'static str {
    match value {
        CacheValue::Credential(_) => "credential",
        CacheValue::Badge(_) => "badge",
    }
}
