//! Spotify Status - a "now playing" badge server
//!
//! Serves an SVG badge showing what a Spotify user is listening to, backed by
//! an expiring cache that is periodically saved to disk.

pub mod api;
pub mod badge;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod spotify;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use tasks::{drain_then_stop, spawn_cleanup_task, spawn_persist_task};
