//! shields.io static badge renderer.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::badge::BadgeRenderer;
use crate::error::RenderError;

const SHIELDS_URL: &str = "https://img.shields.io";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Renders badges with the shields.io `static/v1` endpoint.
#[derive(Debug, Clone)]
pub struct ShieldsRenderer {
    http: reqwest::Client,
    base_url: String,
}

impl ShieldsRenderer {
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            base_url: SHIELDS_URL.to_string(),
        })
    }

    /// Overrides the service base URL. Used for testing with wiremock.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn badge_url(&self, message: &str) -> String {
        format!(
            "{}/static/v1?style=flat&logo=spotify&label=Now%20Playing&message={}&color=brightgreen",
            self.base_url, message
        )
    }
}

#[async_trait]
impl BadgeRenderer for ShieldsRenderer {
    async fn render(&self, message: &str) -> Result<Vec<u8>, RenderError> {
        let url = self.badge_url(message);
        debug!("Rendering badge: {}", url);

        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            error!("Badge service returned status {}", status);
            return Err(RenderError::Status(status.as_u16()));
        }

        Ok(resp.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_url_format() {
        let renderer = ShieldsRenderer::new()
            .unwrap()
            .with_base_url("http://localhost:9000/");

        assert_eq!(
            renderer.badge_url("nothing..."),
            "http://localhost:9000/static/v1?style=flat&logo=spotify&label=Now%20Playing&message=nothing...&color=brightgreen"
        );
    }
}
