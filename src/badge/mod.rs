//! Badge Module
//!
//! Turns playback state into badge messages and renders them through an
//! external badge service.

mod shields;

use async_trait::async_trait;

use crate::error::RenderError;
use crate::spotify::Track;

pub use shields::ShieldsRenderer;

/// Message shown while nothing is playing.
pub const IDLE_MESSAGE: &str = "nothing...";

/// Renders a URL-safe message into badge image bytes.
#[async_trait]
pub trait BadgeRenderer: Send + Sync {
    async fn render(&self, message: &str) -> Result<Vec<u8>, RenderError>;
}

/// Builds the URL-encoded badge message for a track, e.g.
/// `Song by Artist A, Artist B; from Album`.
///
/// Spaces are percent-encoded as `%20` rather than form-encoded as `+`;
/// shields.io decodes both the same way.
pub fn track_message(track: &Track) -> String {
    let text = format!(
        "{} by {}; from {}",
        track.name,
        track.artists.join(", "),
        track.album
    );
    urlencoding::encode(&text).into_owned()
}
