//! Shutdown Sequencing
//!
//! Stops the background tasks only after the server has drained, so the
//! final cache save sees every write made by in-flight requests.

use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Runs `server` to completion, then cancels `shutdown` and waits for `tasks`.
///
/// `server` should resolve once graceful shutdown has finished draining
/// requests. Its result is returned after the tasks have stopped.
///
/// # Arguments
/// * `server` - The serving future, including its graceful drain
/// * `shutdown` - Token the background tasks watch
/// * `tasks` - Handles of the background tasks
pub async fn drain_then_stop<F, E>(
    server: F,
    shutdown: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
) -> Result<(), E>
where
    F: Future<Output = Result<(), E>>,
{
    let result = server.await;

    info!("Server drained, stopping background tasks");
    shutdown.cancel();
    for handle in tasks {
        if let Err(e) = handle.await {
            warn!("Background task ended abnormally: {}", e);
        }
    }

    result
}
