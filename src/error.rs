//! Error types for the badge server
//!
//! One error enum per failure domain, plus `AppError` for the request path.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Authentication Error ==
/// Failures of the OAuth flow with the streaming provider.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The callback state is missing or does not match the login cookie
    #[error("Invalid authorization state")]
    InvalidState,

    /// The user declined access or the callback carried no code
    #[error("Authorization denied: {0}")]
    Denied(String),

    /// The provider rejected the authorization code or refresh token
    #[error("Token request rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The credential carries no refresh token and has expired
    #[error("Credential expired and cannot be refreshed")]
    NotRefreshable,

    /// Network failure or undecodable token response
    #[error("Token request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

// == Provider Error ==
/// Failures fetching data from the streaming provider's API.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Provider returned status {status}: {body}")]
    Status { status: u16, body: String },
}

// == Render Error ==
/// Failures of the external badge rendering service.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Badge service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Badge service returned status {0}")]
    Status(u16),
}

// == Persist Error ==
/// Failures saving or loading the cache file. Never surfaced to clients.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Cache file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache file encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

// == App Error ==
/// Unified error type for request handlers.
#[derive(Error, Debug)]
pub enum AppError {
    /// No credential stored for the requested user
    #[error("not found...")]
    NotFound(String),

    /// The user is not playing anything and a track was required
    #[error("nothing playing...")]
    NothingPlaying,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::NothingPlaying => StatusCode::IM_A_TEAPOT,
            AppError::Auth(_) | AppError::Provider(_) | AppError::Render(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for request handlers.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn status_and_body(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_maps_to_404() {
        let (status, body) = status_and_body(AppError::NotFound("alice".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not found...");
    }

    #[tokio::test]
    async fn test_nothing_playing_maps_to_418() {
        let (status, body) = status_and_body(AppError::NothingPlaying).await;
        assert_eq!(status, StatusCode::IM_A_TEAPOT);
        assert_eq!(body["error"], "nothing playing...");
    }

    #[tokio::test]
    async fn test_upstream_failures_map_to_500() {
        let errors = vec![
            AppError::Render(RenderError::Status(503)),
            AppError::Provider(ProviderError::Status {
                status: 502,
                body: "bad gateway".into(),
            }),
            AppError::Auth(AuthError::NotRefreshable),
        ];

        for error in errors {
            let expected = error.to_string();
            let (status, body) = status_and_body(error).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body["error"].as_str().unwrap(), expected);
        }
    }
}
