//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::cache::Ttl;

/// Prefix of every service option in the environment.
pub const ENV_PREFIX: &str = "SPOTIFYSTATUS_";

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// TTL of cached track badges, zero = never expire
    pub cache_expiry: Duration,
    /// Interval between sweeps of expired entries, zero = no sweep
    pub cache_purge: Duration,
    /// Interval between cache saves, zero = no persistence
    pub cache_persist: Duration,
    /// Cache file location, None = no persistence
    pub cache_file: Option<PathBuf>,
    /// Expiry policy of the "nothing playing" badge
    pub cache_idle_expiry: Ttl,
    /// Public base URL of this server, used for OAuth callbacks and redirects
    pub redirect_uri: String,
    /// Address the HTTP server binds to
    pub listen_addr: String,
    /// Where `GET /` redirects to
    pub home_url: String,
    /// Spotify application client id
    pub client_id: String,
    /// Spotify application client secret
    pub client_secret: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SPOTIFYSTATUS_CACHE_EXPIRY` - Track badge TTL (default: 30m)
    /// - `SPOTIFYSTATUS_CACHE_PURGE` - Sweep interval (default: 60m)
    /// - `SPOTIFYSTATUS_CACHE_PERSIST` - Save interval (default: 60s)
    /// - `SPOTIFYSTATUS_CACHE_FILE` - Cache file path (default: unset)
    /// - `SPOTIFYSTATUS_CACHE_IDLE_EXPIRY` - `never`, `default` or a duration (default: never)
    /// - `SPOTIFYSTATUS_REDIRECT_URI` - Public base URL (default: http://127.0.0.1:3000)
    /// - `SPOTIFYSTATUS_LISTEN_ADDR` - Bind address (default: 0.0.0.0:3000)
    /// - `SPOTIFYSTATUS_HOME_URL` - Root redirect target
    /// - `SPOTIFY_ID` / `SPOTIFY_SECRET` - Spotify application credentials
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let option = |name: &str| {
            lookup(&format!("{ENV_PREFIX}{}", name.to_uppercase()))
                .map(|v| v.trim().to_string())
        };
        let duration = |name: &str, default: Duration| match option(name) {
            Some(raw) => parse_duration(&raw).unwrap_or_else(|| {
                warn!("Invalid duration {:?} for {}, using {:?}", raw, name, default);
                default
            }),
            None => default,
        };

        Self {
            cache_expiry: duration("cache_expiry", defaults.cache_expiry),
            cache_purge: duration("cache_purge", defaults.cache_purge),
            cache_persist: duration("cache_persist", defaults.cache_persist),
            cache_file: option("cache_file")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            cache_idle_expiry: match option("cache_idle_expiry") {
                Some(raw) => parse_ttl(&raw).unwrap_or_else(|| {
                    warn!("Invalid idle badge expiry {:?}, badge will never expire", raw);
                    defaults.cache_idle_expiry
                }),
                None => defaults.cache_idle_expiry,
            },
            redirect_uri: option("redirect_uri")
                .filter(|v| !v.is_empty())
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.redirect_uri),
            listen_addr: option("listen_addr")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.listen_addr),
            home_url: option("home_url")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.home_url),
            client_id: lookup("SPOTIFY_ID").unwrap_or_default(),
            client_secret: lookup("SPOTIFY_SECRET").unwrap_or_default(),
        }
    }

    /// TTL applied to track badges, None when they never expire.
    pub fn default_ttl(&self) -> Option<Duration> {
        (!self.cache_expiry.is_zero()).then_some(self.cache_expiry)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_expiry: Duration::from_secs(30 * 60),
            cache_purge: Duration::from_secs(60 * 60),
            cache_persist: Duration::from_secs(60),
            cache_file: None,
            cache_idle_expiry: Ttl::Never,
            redirect_uri: "http://127.0.0.1:3000".to_string(),
            listen_addr: "0.0.0.0:3000".to_string(),
            home_url: "https://open.spotify.com".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
        }
    }
}

/// Parses `30m`, `60s`, `1h 30m` style durations; a bare `0` is zero.
fn parse_duration(raw: &str) -> Option<Duration> {
    if raw == "0" {
        return Some(Duration::ZERO);
    }
    humantime::parse_duration(raw).ok()
}

fn parse_ttl(raw: &str) -> Option<Ttl> {
    match raw.to_ascii_lowercase().as_str() {
        "never" | "" => Some(Ttl::Never),
        "default" => Some(Ttl::Default),
        other => parse_duration(other).map(|d| {
            if d.is_zero() {
                Ttl::Never
            } else {
                Ttl::After(d)
            }
        }),
    }
}
