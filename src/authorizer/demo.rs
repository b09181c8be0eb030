//! Demo authorizer
//!
//! Stands in for the external authorization library in the demo binary:
//! every request is answered with a dummy token after a fixed delay.

use std::time::Duration;

use crate::authorizer::{Authorizer, OAuth1TokenRequest, OAuth2AuthorizeRequest};
use crate::config::DemoConfig;
use crate::error::Result;
use crate::settings::{OAuth1Token, TokenInfo};

/// Answers token requests with configured dummy values.
///
/// # Examples
///
/// ```
/// use authorization_method::authorizer::demo::DemoAuthorizer;
/// use authorization_method::config::DemoConfig;
///
/// let authorizer = DemoAuthorizer::new(&DemoConfig::default());
/// assert_eq!(authorizer.delay().as_millis(), 1000);
/// ```
#[derive(Debug, Clone)]
pub struct DemoAuthorizer {
    delay: Duration,
    access_token: String,
    oauth1_token: String,
    oauth1_token_secret: String,
}

impl DemoAuthorizer {
    pub fn new(config: &DemoConfig) -> Self {
        Self {
            delay: Duration::from_millis(config.token_delay_ms),
            access_token: config.access_token.clone(),
            oauth1_token: config.oauth1_token.clone(),
            oauth1_token_secret: config.oauth1_token_secret.clone(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait::async_trait]
impl Authorizer for DemoAuthorizer {
    async fn request_oauth2_token(&self, request: OAuth2AuthorizeRequest) -> Result<TokenInfo> {
        tracing::info!(
            grant_type = %request.settings.grant_type,
            client_id = %request.settings.client_id,
            "Demo OAuth 2 token requested"
        );
        tokio::time::sleep(self.delay).await;
        Ok(TokenInfo {
            access_token: self.access_token.clone(),
            token_type: None,
            state: Some(request.state),
            expires_in: Some(3600),
            refresh_token: None,
            scope: Some(request.settings.scopes.join(" ")).filter(|s| !s.is_empty()),
        })
    }

    async fn request_oauth1_token(&self, request: OAuth1TokenRequest) -> Result<OAuth1Token> {
        tracing::info!(
            consumer_key = %request.settings.consumer_key,
            "Demo OAuth 1 token requested"
        );
        tokio::time::sleep(self.delay).await;
        Ok(OAuth1Token {
            token: self.oauth1_token.clone(),
            token_secret: self.oauth1_token_secret.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{OAuth1Authorization, OAuth2Authorization};

    fn instant_config() -> DemoConfig {
        DemoConfig {
            token_delay_ms: 0,
            ..DemoConfig::default()
        }
    }

    #[tokio::test]
    async fn test_oauth2_echoes_state() {
        let authorizer = DemoAuthorizer::new(&instant_config());
        let request = OAuth2AuthorizeRequest {
            settings: OAuth2Authorization {
                scopes: vec!["email".to_string(), "profile".to_string()],
                ..Default::default()
            },
            state: "state-1".to_string(),
        };
        let token = authorizer.request_oauth2_token(request).await.unwrap();
        assert_eq!(token.state.as_deref(), Some("state-1"));
        assert_eq!(token.access_token, "demo-access-token");
        assert_eq!(token.scope.as_deref(), Some("email profile"));
        assert!(token.token_type.is_none());
    }

    #[tokio::test]
    async fn test_oauth1_returns_dummy_pair() {
        let authorizer = DemoAuthorizer::new(&instant_config());
        let token = authorizer
            .request_oauth1_token(OAuth1TokenRequest {
                settings: OAuth1Authorization::default(),
            })
            .await
            .unwrap();
        assert_eq!(token.token, "dummy-token");
        assert_eq!(token.token_secret, "dummy-secret");
    }

    #[tokio::test]
    async fn test_waits_for_configured_delay() {
        let authorizer = DemoAuthorizer::new(&DemoConfig {
            token_delay_ms: 20,
            ..DemoConfig::default()
        });
        let started = std::time::Instant::now();
        authorizer
            .request_oauth1_token(OAuth1TokenRequest {
                settings: OAuth1Authorization::default(),
            })
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
