//! HTTP client for the Spotify accounts service and Web API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use tracing::{debug, error};
use url::form_urlencoded;

use crate::error::{AuthError, ProviderError};
use crate::spotify::types::{CurrentlyPlayingResponse, TokenResponse, UserResponse};
use crate::spotify::{Authenticator, Authorization, Credential, Playback, PlaybackProvider};

const ACCOUNTS_URL: &str = "https://accounts.spotify.com";
const API_URL: &str = "https://api.spotify.com";
const SCOPE: &str = "user-read-currently-playing";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Spotify client implementing both the OAuth flow and playback lookup.
///
/// One `reqwest::Client` is shared by all requests; each request is bounded
/// by a 30-second timeout.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    /// Callback URL registered with the Spotify application
    callback_url: String,
    accounts_url: String,
    api_url: String,
}

impl SpotifyClient {
    /// Creates a client pointing at the production Spotify endpoints.
    ///
    /// # Arguments
    /// * `client_id` / `client_secret` - Spotify application credentials
    /// * `redirect_uri` - Public base URL of this server; `/callback` is appended
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: &str,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            callback_url: format!("{}/callback", redirect_uri.trim_end_matches('/')),
            accounts_url: ACCOUNTS_URL.to_string(),
            api_url: API_URL.to_string(),
        })
    }

    /// Overrides the accounts and API base URLs. Used for testing with wiremock.
    pub fn with_base_urls(mut self, accounts_url: &str, api_url: &str) -> Self {
        self.accounts_url = accounts_url.trim_end_matches('/').to_string();
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let resp = self
            .http
            .post(format!("{}/api/token", self.accounts_url))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("Token request failed with status {}: {}", status, body);
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.json::<TokenResponse>().await?)
    }

    async fn current_user_id(&self, credential: &Credential) -> Result<String, AuthError> {
        let resp = self
            .http
            .get(format!("{}/v1/me", self.api_url))
            .bearer_auth(&credential.access_token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.json::<UserResponse>().await?.id)
    }
}

#[async_trait]
impl Authenticator for SpotifyClient {
    fn authorize_url(&self, state: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &self.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.callback_url)
            .append_pair("scope", SCOPE)
            .append_pair("state", state)
            .finish();

        format!("{}/authorize?{}", self.accounts_url, query)
    }

    async fn exchange(&self, code: &str) -> Result<Authorization, AuthError> {
        let token = self
            .token_request(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.callback_url.as_str()),
            ])
            .await?;
        let credential = token.into_credential(Utc::now(), None);
        let user_id = self.current_user_id(&credential).await?;

        debug!("Exchanged authorization code for user {}", user_id);
        Ok(Authorization {
            user_id,
            credential,
        })
    }

    async fn refresh(&self, credential: &Credential) -> Result<Credential, AuthError> {
        let refresh_token = credential
            .refresh_token
            .as_deref()
            .ok_or(AuthError::NotRefreshable)?;

        let token = self
            .token_request(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .await?;

        Ok(token.into_credential(Utc::now(), credential.refresh_token.clone()))
    }
}

#[async_trait]
impl PlaybackProvider for SpotifyClient {
    async fn currently_playing(&self, credential: &Credential) -> Result<Playback, ProviderError> {
        let resp = self
            .http
            .get(format!("{}/v1/me/player/currently-playing", self.api_url))
            .bearer_auth(&credential.access_token)
            .send()
            .await?;

        let status = resp.status();
        // Nothing has been played recently
        if status == StatusCode::NO_CONTENT {
            return Ok(Playback::Idle);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("Currently-playing request failed with status {}: {}", status, body);
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.json::<CurrentlyPlayingResponse>().await?.into_playback())
    }
}
