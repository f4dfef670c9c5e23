//! Cache Value Module
//!
//! The tagged value type held by the shared cache. Each logical store owns
//! one variant and only reads entries of that variant back.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::cache::CacheStore;
use crate::spotify::Credential;

/// The cache instance shared by handlers, typed stores and background tasks.
pub type SharedCache = Arc<RwLock<CacheStore<CacheValue>>>;

/// Wraps a store for sharing.
pub fn shared(store: CacheStore<CacheValue>) -> SharedCache {
    Arc::new(RwLock::new(store))
}

// == Cache Value ==
/// A value stored in the shared cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum CacheValue {
    /// OAuth credential of one user
    Credential(Credential),
    /// Pre-rendered badge image
    Badge(BadgeImage),
}

/// Rendered SVG bytes; base64 encoded when persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeImage {
    #[serde(with = "base64_bytes")]
    pub svg: Vec<u8>,
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(D::Error::custom)
    }
}
