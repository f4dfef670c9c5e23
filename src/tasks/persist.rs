//! Cache Persistence Task
//!
//! Background task that saves the cache to disk on a timer and once more on
//! shutdown.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::cache::{save_cache, SharedCache};

/// Spawns the background task persisting the cache to `path`.
///
/// The cache is saved every `interval` and a final time after `shutdown` is
/// cancelled. With no path or a zero interval the task returns immediately
/// and never writes. Save failures are logged and the loop keeps going.
///
/// # Arguments
/// * `cache` - Shared reference to the cache
/// * `path` - Cache file location, None = persistence disabled
/// * `interval` - Time between saves
/// * `shutdown` - Cancelled when the process is shutting down
pub fn spawn_persist_task(
    cache: SharedCache,
    path: Option<PathBuf>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let path = match path {
            Some(path) if !interval.is_zero() => path,
            _ => {
                info!("Cache persistence disabled");
                return;
            }
        };

        info!(
            "Persisting cache to {} every {:?}",
            path.display(),
            interval
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    if persist_once(&cache, &path).await {
                        info!("Cache saved to {} on shutdown", path.display());
                    }
                    break;
                }
                _ = tokio::time::sleep(interval) => {
                    persist_once(&cache, &path).await;
                }
            }
        }
    })
}

/// Snapshots the cache and writes it to `path` on a blocking thread.
///
/// Returns whether the save succeeded; failures are logged, never raised.
pub async fn persist_once(cache: &SharedCache, path: &Path) -> bool {
    let items = cache.read().await.items();
    let count = items.len();
    let target = path.to_path_buf();

    match tokio::task::spawn_blocking(move || save_cache(&items, &target)).await {
        Ok(Ok(())) => {
            debug!("Saved {} cache entries to {}", count, path.display());
            true
        }
        Ok(Err(e)) => {
            warn!("Failed to save cache to {}: {}", path.display(), e);
            false
        }
        Err(e) => {
            error!("Cache save task failed: {}", e);
            false
        }
    }
}
