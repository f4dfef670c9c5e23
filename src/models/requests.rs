//! Request DTOs for the badge server API
//!
//! Defines the structure of incoming query parameters.

use serde::Deserialize;

/// Query parameters Spotify appends to the OAuth callback (GET /callback)
///
/// # Fields
/// - `code`: Authorization code, absent when the user denied access
/// - `state`: The state value generated at login
/// - `error`: Reason given by Spotify when authorization failed
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_params_deserialize() {
        let params: CallbackParams =
            serde_json::from_str(r#"{"code": "abc", "state": "xyz"}"#).unwrap();
        assert_eq!(params.code.as_deref(), Some("abc"));
        assert_eq!(params.state.as_deref(), Some("xyz"));
        assert!(params.error.is_none());
    }

    #[test]
    fn test_callback_params_denied() {
        let params: CallbackParams =
            serde_json::from_str(r#"{"error": "access_denied", "state": "xyz"}"#).unwrap();
        assert!(params.code.is_none());
        assert_eq!(params.error.as_deref(), Some("access_denied"));
    }
}
