//! API Handlers
//!
//! HTTP request handlers for the badge server endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::{distributions::Alphanumeric, Rng};
use tracing::{debug, info, warn};

use crate::badge::{track_message, BadgeRenderer, IDLE_MESSAGE};
use crate::cache::{BadgeKey, BadgeStore, CredentialStore, SharedCache};
use crate::config::Config;
use crate::error::{AppError, AuthError, Result};
use crate::models::{CallbackParams, HealthResponse};
use crate::spotify::{Authenticator, Playback, PlaybackProvider};

/// Cookie carrying the OAuth state between `/login` and `/callback`.
pub const STATE_COOKIE: &str = "spotify-state";

/// Response header linking a badge to the track it shows.
pub const SPOTIFY_URI: HeaderName = HeaderName::from_static("spotify-uri");

const STATE_LEN: usize = 32;
const IDLE_ETAG: &str = "\"idle\"";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The shared cache behind both typed stores
    pub cache: SharedCache,
    pub credentials: CredentialStore,
    pub badges: BadgeStore,
    pub auth: Arc<dyn Authenticator>,
    pub provider: Arc<dyn PlaybackProvider>,
    pub renderer: Arc<dyn BadgeRenderer>,
    /// Public base URL of this server, without trailing slash
    pub redirect_uri: String,
    pub home_url: String,
}

impl AppState {
    /// Creates the handler state around an existing cache.
    ///
    /// # Arguments
    /// * `cache` - The shared cache, possibly restored from disk
    /// * `config` - Server configuration
    /// * `spotify` - Provides both authentication and playback lookups
    /// * `renderer` - Badge image renderer
    pub fn new<S, R>(cache: SharedCache, config: &Config, spotify: Arc<S>, renderer: Arc<R>) -> Self
    where
        S: Authenticator + PlaybackProvider + 'static,
        R: BadgeRenderer + 'static,
    {
        Self {
            credentials: CredentialStore::new(cache.clone()),
            badges: BadgeStore::new(cache.clone(), config.cache_idle_expiry),
            cache,
            auth: spotify.clone(),
            provider: spotify,
            renderer,
            redirect_uri: config.redirect_uri.trim_end_matches('/').to_string(),
            home_url: config.home_url.clone(),
        }
    }
}

/// Handler for GET /
pub async fn root_handler(State(state): State<AppState>) -> Redirect {
    Redirect::permanent(&state.home_url)
}

/// Handler for GET /health
///
/// Returns health status along with cache size and hit rate.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.cache.read().await.stats();
    Json(HealthResponse::healthy(&stats))
}

/// Handler for GET /login
///
/// Stores a random state in a cookie and sends the user to Spotify.
pub async fn login_handler(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let oauth_state: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LEN)
        .map(char::from)
        .collect();

    let cookie = Cookie::build((STATE_COOKIE, oauth_state.clone()))
        .path("/")
        .http_only(true)
        .secure(state.redirect_uri.starts_with("https://"))
        .same_site(SameSite::Lax);

    let url = state.auth.authorize_url(&oauth_state);
    (jar.add(cookie), Redirect::temporary(&url))
}

/// Handler for GET /callback
///
/// Finishes the OAuth flow. Any failure sends the user back to `/login`.
pub async fn callback_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> (CookieJar, Redirect) {
    let expected = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    let jar = jar.remove(Cookie::build(STATE_COOKIE).path("/"));

    match complete_login(&state, expected.as_deref(), params).await {
        Ok(user_id) => {
            info!("Stored credential for user {}", user_id);
            let target = format!("{}/{}", state.redirect_uri, user_id);
            (jar, Redirect::temporary(&target))
        }
        Err(e) => {
            warn!("Login failed: {}", e);
            let target = format!("{}/login", state.redirect_uri);
            (jar, Redirect::temporary(&target))
        }
    }
}

async fn complete_login(
    state: &AppState,
    expected: Option<&str>,
    params: CallbackParams,
) -> std::result::Result<String, AuthError> {
    match (expected, params.state.as_deref()) {
        (Some(expected), Some(received)) if expected == received => {}
        _ => return Err(AuthError::InvalidState),
    }
    if let Some(reason) = params.error {
        return Err(AuthError::Denied(reason));
    }
    let code = params
        .code
        .ok_or_else(|| AuthError::Denied("no authorization code".to_string()))?;

    let authorization = state.auth.exchange(&code).await?;
    state
        .credentials
        .store(&authorization.user_id, authorization.credential)
        .await;

    Ok(authorization.user_id)
}

/// Handler for GET /:id
///
/// Returns the badge for what the user is playing, rendering it on a miss.
pub async fn badge_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Response> {
    let playback = current_playback(&state, &user_id).await?;

    let (key, message, etag, link) = match &playback {
        Playback::Idle => (BadgeKey::Idle, IDLE_MESSAGE.to_string(), IDLE_ETAG.to_string(), None),
        Playback::Playing(track) => (
            BadgeKey::Track(track.id.clone()),
            track_message(track),
            format!("\"{}\"", track.id),
            Some(track.link()),
        ),
    };

    let renderer = state.renderer.clone();
    let svg = state
        .badges
        .get_or_render(&key, || async move { renderer.render(&message).await })
        .await?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/svg+xml"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("private, no-store"));
    if let Ok(value) = HeaderValue::from_str(&etag) {
        headers.insert(header::ETAG, value);
    }
    if let Some(value) = link.and_then(|l| HeaderValue::from_str(&l).ok()) {
        headers.insert(SPOTIFY_URI, value);
    }

    Ok((headers, svg).into_response())
}

/// Handler for GET /:id/link
///
/// Redirects to the track the user is playing.
pub async fn link_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Redirect> {
    match current_playback(&state, &user_id).await? {
        Playback::Playing(track) => Ok(Redirect::temporary(&track.link())),
        Playback::Idle => Err(AppError::NothingPlaying),
    }
}

/// Looks up a user's playback, refreshing their credential when it expired.
async fn current_playback(state: &AppState, user_id: &str) -> Result<Playback> {
    let mut credential = state
        .credentials
        .load(user_id)
        .await
        .ok_or_else(|| AppError::NotFound(user_id.to_string()))?;

    if credential.is_expired() {
        debug!("Refreshing expired credential for user {}", user_id);
        credential = state.auth.refresh(&credential).await?;
        state.credentials.store(user_id, credential.clone()).await;
    }

    Ok(state.provider.currently_playing(&credential).await?)
}
