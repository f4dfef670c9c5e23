//! Spotify Module
//!
//! The streaming-provider collaborators: the OAuth authorization-code flow
//! and the currently-playing lookup, with the HTTP client implementing both.

mod client;
mod types;

use async_trait::async_trait;

use crate::error::{AuthError, ProviderError};

pub use client::SpotifyClient;
pub use types::{Authorization, Credential, Playback, Track};

/// Issues and refreshes user credentials.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// URL the user is sent to in order to grant access.
    fn authorize_url(&self, state: &str) -> String;

    /// Trades an authorization code for a credential and the user's id.
    async fn exchange(&self, code: &str) -> Result<Authorization, AuthError>;

    /// Obtains a fresh access token for an expired credential.
    async fn refresh(&self, credential: &Credential) -> Result<Credential, AuthError>;
}

/// Reports what a user is currently listening to.
#[async_trait]
pub trait PlaybackProvider: Send + Sync {
    async fn currently_playing(&self, credential: &Credential) -> Result<Playback, ProviderError>;
}
