//! Authorization port
//!
//! Token acquisition is performed by an external authorization library. This
//! module defines the [`Authorizer`] trait that library is reached through,
//! and the request types handed to it. The crate never talks to an
//! authorization server itself.
//!
//! # Module Layout
//!
//! - [`demo`] -- a [`DemoAuthorizer`](demo::DemoAuthorizer) answering with
//!   dummy tokens after a fixed delay, used by the demo binary

pub mod demo;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::settings::{OAuth1Authorization, OAuth1Token, OAuth2Authorization, TokenInfo};

/// An OAuth 2 token request.
///
/// Carries the serialized settings with the base URI already applied and the
/// opaque `state` generated for this request. The authorizer is expected to
/// echo `state` back in [`TokenInfo::state`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuth2AuthorizeRequest {
    #[serde(flatten)]
    pub settings: OAuth2Authorization,
    pub state: String,
}

/// An OAuth 1 token request with the base URI already applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuth1TokenRequest {
    #[serde(flatten)]
    pub settings: OAuth1Authorization,
}

/// The external authorization library.
///
/// Implementations perform the actual protocol exchange. They may take
/// arbitrarily long; callers impose no timeout.
#[async_trait::async_trait]
pub trait Authorizer: Send + Sync {
    /// Requests an OAuth 2 access token.
    ///
    /// # Errors
    ///
    /// Any error is surfaced to the user through the method's
    /// `last_error_message` and returned to the caller of `authorize`.
    async fn request_oauth2_token(&self, request: OAuth2AuthorizeRequest) -> Result<TokenInfo>;

    /// Requests an OAuth 1 token pair.
    ///
    /// # Errors
    ///
    /// Same handling as [`Authorizer::request_oauth2_token`].
    async fn request_oauth1_token(&self, request: OAuth1TokenRequest) -> Result<OAuth1Token>;
}

/// Generates an opaque `state` value for an OAuth 2 request.
///
/// 16 random bytes, base64url encoded without padding.
///
/// # Examples
///
/// ```
/// use authorization_method::authorizer::generate_state;
///
/// let state = generate_state();
/// assert_eq!(state.len(), 22);
/// assert_ne!(state, generate_state());
/// ```
pub fn generate_state() -> String {
    use rand::RngCore as _;
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_state_produces_non_empty_string() {
        let state = generate_state();
        assert!(!state.is_empty());
        assert!(state
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_generate_state_produces_unique_values() {
        let states: std::collections::HashSet<String> = (0..50).map(|_| generate_state()).collect();
        assert_eq!(states.len(), 50);
    }

    #[test]
    fn test_oauth2_request_flattens_settings() {
        let request = OAuth2AuthorizeRequest {
            settings: OAuth2Authorization {
                grant_type: "implicit".to_string(),
                client_id: "client".to_string(),
                ..Default::default()
            },
            state: "abc".to_string(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["clientId"], "client");
        assert_eq!(value["grantType"], "implicit");
        assert_eq!(value["state"], "abc");
    }
}
