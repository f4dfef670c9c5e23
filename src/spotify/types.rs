//! Spotify data types
//!
//! The stored credential, the domain view of playback state, and the wire
//! shapes of the Spotify accounts and Web API responses.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Credentials are refreshed this long before they actually expire.
const EXPIRY_LEEWAY_SECS: i64 = 10;

// == Credential ==
/// OAuth token set issued by Spotify for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// When the access token stops being accepted, None = unknown
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

impl Credential {
    /// Returns true if the access token is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => now + TimeDelta::seconds(EXPIRY_LEEWAY_SECS) >= expiry,
            None => false,
        }
    }
}

/// Result of a successful authorization code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    /// Spotify-assigned user id
    pub user_id: String,
    pub credential: Credential,
}

// == Playback ==
/// What a user is listening to right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Playback {
    Idle,
    Playing(Track),
}

/// A playing track with the metadata shown on the badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Stable track identity, used as the badge cache key
    pub id: String,
    pub name: String,
    pub artists: Vec<String>,
    pub album: String,
    /// Link to the track on open.spotify.com
    pub external_url: Option<String>,
}

impl Track {
    /// Public link to the track, falling back to one built from its id.
    pub fn link(&self) -> String {
        self.external_url
            .clone()
            .unwrap_or_else(|| format!("https://open.spotify.com/track/{}", self.id))
    }
}

// == Wire Types ==
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl TokenResponse {
    /// Converts to a credential, keeping `previous_refresh` when Spotify does
    /// not rotate the refresh token.
    pub fn into_credential(self, now: DateTime<Utc>, previous_refresh: Option<String>) -> Credential {
        Credential {
            access_token: self.access_token,
            token_type: self.token_type,
            refresh_token: self.refresh_token.or(previous_refresh),
            expiry: self
                .expires_in
                .and_then(|secs| now.checked_add_signed(TimeDelta::seconds(secs))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserResponse {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CurrentlyPlayingResponse {
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default)]
    pub currently_playing_type: Option<String>,
    #[serde(default)]
    pub item: Option<TrackObject>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackObject {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artists: Vec<NamedObject>,
    #[serde(default)]
    pub album: Option<NamedObject>,
    #[serde(default)]
    pub external_urls: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NamedObject {
    pub name: String,
}

impl CurrentlyPlayingResponse {
    /// Maps the API response onto a playback state.
    ///
    /// Paused playback, podcast episodes and items without any identity are
    /// all reported as idle.
    pub fn into_playback(self) -> Playback {
        if !self.is_playing {
            return Playback::Idle;
        }
        if matches!(self.currently_playing_type.as_deref(), Some(kind) if kind != "track") {
            return Playback::Idle;
        }
        let Some(item) = self.item else {
            return Playback::Idle;
        };
        let Some(id) = item.id.or(item.uri) else {
            return Playback::Idle;
        };

        Playback::Playing(Track {
            id,
            name: item.name,
            artists: item.artists.into_iter().map(|a| a.name).collect(),
            album: item.album.map(|a| a.name).unwrap_or_default(),
            external_url: item.external_urls.get("spotify").cloned(),
        })
    }
}
