//! Spotify Status - a "now playing" badge server
//!
//! Binary entry point: loads configuration, restores the cache, starts the
//! background tasks and serves HTTP until a shutdown signal arrives.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spotify_status::badge::ShieldsRenderer;
use spotify_status::cache::{restore_cache, shared};
use spotify_status::spotify::SpotifyClient;
use spotify_status::{
    create_router, drain_then_stop, spawn_cleanup_task, spawn_persist_task, AppState, Config,
};

/// Main entry point for the badge server.
///
/// # Startup Sequence
/// 1. Load `.env` and initialize the tracing subscriber
/// 2. Load configuration from environment variables
/// 3. Restore the cache from disk, if configured
/// 4. Start the sweep and persistence tasks
/// 5. Serve HTTP until Ctrl+C or SIGTERM
/// 6. Once requests have drained, stop the tasks; persistence writes a final snapshot
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spotify_status=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Spotify Status badge server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: cache_expiry={:?}, cache_purge={:?}, cache_persist={:?}, cache_file={:?}, listen_addr={}",
        config.cache_expiry,
        config.cache_purge,
        config.cache_persist,
        config.cache_file,
        config.listen_addr
    );
    if config.client_id.is_empty() || config.client_secret.is_empty() {
        warn!("SPOTIFY_ID or SPOTIFY_SECRET is not set, logins will fail");
    }

    let cache = shared(restore_cache(
        config.cache_file.as_deref(),
        config.default_ttl(),
    ));

    let spotify = SpotifyClient::new(
        &config.client_id,
        &config.client_secret,
        &config.redirect_uri,
    )
    .context("failed to build Spotify client")?;
    let renderer = ShieldsRenderer::new().context("failed to build badge renderer")?;

    let shutdown = CancellationToken::new();
    let cleanup_handle = spawn_cleanup_task(cache.clone(), config.cache_purge, shutdown.clone());
    let persist_handle = spawn_persist_task(
        cache.clone(),
        config.cache_file.clone(),
        config.cache_persist,
        shutdown.clone(),
    );

    let state = AppState::new(cache, &config, Arc::new(spotify), Arc::new(renderer));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!("Server listening on http://{}", config.listen_addr);

    // The token is cancelled only once requests have drained, so the final
    // save includes their writes
    let server = async {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    };
    drain_then_stop(server, shutdown, vec![cleanup_handle, persist_handle])
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
