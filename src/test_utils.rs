//! Test utilities for the authorization method editor
//!
//! This module provides common test utilities including temporary directory
//! management, filled-in form states, a recording authorizer and assertion
//! helpers.

use std::sync::Mutex;

use tempfile::TempDir;
use tokio::sync::mpsc;

use crate::authorizer::{Authorizer, OAuth1TokenRequest, OAuth2AuthorizeRequest};
use crate::error::Result;
use crate::method::OAuth2State;
use crate::settings::{OAuth1Token, TokenInfo, GRANT_IMPLICIT};
use std::path::PathBuf;

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// A valid implicit grant form
pub fn filled_implicit() -> OAuth2State {
    OAuth2State {
        grant_type: GRANT_IMPLICIT.to_string(),
        client_id: "test-client".to_string(),
        authorization_uri: "https://auth.example.com/authorize".to_string(),
        redirect_uri: "https://app.example.com/callback".to_string(),
        scopes: vec!["email".to_string()],
        ..OAuth2State::new()
    }
}

/// Authorizer that records requests and answers with fixed tokens
///
/// OAuth 2 answers echo the request `state`. An error can be configured to
/// be returned instead.
pub struct RecordingAuthorizer {
    tx: mpsc::UnboundedSender<OAuth2AuthorizeRequest>,
    error: Mutex<Option<String>>,
}

impl RecordingAuthorizer {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OAuth2AuthorizeRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                error: Mutex::new(None),
            },
            rx,
        )
    }

    pub fn fail_with(&self, message: &str) {
        *self.error.lock().unwrap() = Some(message.to_string());
    }
}

#[async_trait::async_trait]
impl Authorizer for RecordingAuthorizer {
    async fn request_oauth2_token(&self, request: OAuth2AuthorizeRequest) -> Result<TokenInfo> {
        let state = request.state.clone();
        let _ = self.tx.send(request);
        if let Some(message) = self.error.lock().unwrap().clone() {
            return Err(anyhow::anyhow!(message));
        }
        Ok(TokenInfo {
            access_token: "recorded-token".to_string(),
            state: Some(state),
            ..Default::default()
        })
    }

    async fn request_oauth1_token(&self, _request: OAuth1TokenRequest) -> Result<OAuth1Token> {
        if let Some(message) = self.error.lock().unwrap().clone() {
            return Err(anyhow::anyhow!(message));
        }
        Ok(OAuth1Token {
            token: "recorded-token".to_string(),
            token_secret: "recorded-secret".to_string(),
        })
    }
}

/// Create a test configuration YAML string
pub fn test_config_yaml() -> String {
    r#"
ui:
  outlined: true
oauth2:
  base_uri: https://api.domain.com/auth/
  allowed_scopes:
    - email
    - profile
  prevent_custom_scopes: true
  credentials_source:
    - grantType: client_credentials
      credentials:
        - name: My app
          clientId: app-id
          clientSecret: app-secret
demo:
  token_delay_ms: 0
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthMethodError;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.txt", "content");
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "content");
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<()> =
            Err(AuthMethodError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        assert_error_contains(Ok(()), "error");
    }

    #[tokio::test]
    async fn test_recording_authorizer_echoes_state() {
        let (authorizer, mut rx) = RecordingAuthorizer::new();
        let token = authorizer
            .request_oauth2_token(OAuth2AuthorizeRequest {
                settings: Default::default(),
                state: "s".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(token.state.as_deref(), Some("s"));
        assert_eq!(rx.recv().await.unwrap().state, "s");
    }

    #[tokio::test]
    async fn test_recording_authorizer_fails_when_configured() {
        let (authorizer, _rx) = RecordingAuthorizer::new();
        authorizer.fail_with("boom");
        let result = authorizer
            .request_oauth1_token(OAuth1TokenRequest {
                settings: Default::default(),
            })
            .await;
        assert_error_contains(result, "boom");
    }
}
