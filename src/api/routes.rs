//! API Routes
//!
//! Configures the Axum router with all badge server endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    badge_handler, callback_handler, health_handler, link_handler, login_handler, root_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /` - Redirect to the home page
/// - `GET /health` - Health check endpoint
/// - `GET /login` - Start the Spotify authorization flow
/// - `GET /callback` - Finish the Spotify authorization flow
/// - `GET /:id` - Now-playing badge for a user
/// - `GET /:id/link` - Redirect to the track a user is playing
///
/// # Middleware
/// - CORS: Allows any origin so badges embed anywhere
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Static routes take precedence over the `/:id` capture
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/login", get(login_handler))
        .route("/callback", get(callback_handler))
        .route("/:id", get(badge_handler))
        .route("/:id/link", get(link_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
