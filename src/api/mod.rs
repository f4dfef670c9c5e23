//! API Module
//!
//! HTTP handlers and routing for the badge server.
//!
//! # Endpoints
//! - `GET /` - Redirect to the home page
//! - `GET /health` - Health check endpoint
//! - `GET /login` / `GET /callback` - Spotify authorization flow
//! - `GET /:id` - Now-playing badge
//! - `GET /:id/link` - Link to the playing track

pub mod handlers;
pub mod routes;

pub use handlers::{AppState, SPOTIFY_URI, STATE_COOKIE};
pub use routes::create_router;
