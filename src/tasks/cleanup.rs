//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// The task sleeps for `interval` between sweeps and exits once `shutdown`
/// is cancelled. A zero interval disables sweeping; expired entries are then
/// only dropped when read.
///
/// # Arguments
/// * `cache` - Shared reference to the cache
/// * `interval` - Time between sweeps
/// * `shutdown` - Cancelled when the process is shutting down
///
/// # Returns
/// A JoinHandle for the spawned task, awaited during graceful shutdown.
pub fn spawn_cleanup_task(
    cache: SharedCache,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if interval.is_zero() {
            info!("TTL cleanup disabled");
            return;
        }

        info!("Starting TTL cleanup task with interval of {:?}", interval);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("TTL cleanup task stopping");
                    break;
                }
                _ = tokio::time::sleep(interval) => {}
            }

            let removed = cache.write().await.cleanup_expired();

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
