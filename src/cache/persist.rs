//! Cache Persistence Module
//!
//! Saves cache snapshots to a JSON file and loads them back at startup.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{info, warn};

use crate::cache::{CacheEntry, CacheStore};
use crate::error::PersistError;

// == Save ==
/// Writes a snapshot of cache entries to `path`, replacing its contents.
///
/// The snapshot is written to a sibling `.tmp` file which is then renamed over
/// `path`, so a crash mid-write never leaves a truncated cache file.
pub fn save_cache<V: Serialize>(
    items: &HashMap<String, CacheEntry<V>>,
    path: &Path,
) -> Result<(), PersistError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = temp_path(path);
    if let Err(e) = write_json(&tmp, items) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    Ok(())
}

fn write_json<V: Serialize>(
    path: &Path,
    items: &HashMap<String, CacheEntry<V>>,
) -> Result<(), PersistError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, items)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("cache"));
    name.push(".tmp");
    path.with_file_name(name)
}

// == Load ==
/// Reads entries previously written by [`save_cache`].
///
/// A missing or undecodable file is an error; callers are expected to log it
/// and continue with an empty cache.
pub fn load_cache<V: DeserializeOwned>(
    path: &Path,
) -> Result<HashMap<String, CacheEntry<V>>, PersistError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

// == Restore ==
/// Builds the startup cache, seeded from `path` when one is configured.
///
/// Load failures are logged and yield an empty cache rather than aborting.
pub fn restore_cache<V: DeserializeOwned + Clone>(
    path: Option<&Path>,
    default_ttl: Option<Duration>,
) -> CacheStore<V> {
    let Some(path) = path else {
        return CacheStore::new(default_ttl);
    };

    match load_cache(path) {
        Ok(items) => {
            let store = CacheStore::from_items(default_ttl, items);
            info!("Restored {} cache entries from {}", store.len(), path.display());
            store
        }
        Err(e) => {
            warn!("Starting with an empty cache, could not load {}: {}", path.display(), e);
            CacheStore::new(default_ttl)
        }
    }
}
