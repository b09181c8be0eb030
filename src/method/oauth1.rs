//! OAuth 1 form
//!
//! Collects consumer credentials and endpoint URLs. The token pair is
//! obtained from the external authorization library; request signing happens
//! there as well.

use minijinja::{context, Value as TemplateValue};
use serde_json::{Map, Value};

use crate::authorizer::OAuth1TokenRequest;
use crate::error::{AuthMethodError, Result};
use crate::method::fields::{
    expect_text, is_absolute_url, read_url_value, restore_string, url_input_type, ControlKind,
    FieldValue,
};
use crate::method::{failure_message, SchemeForm};
use crate::settings::{AuthorizationConfig, MethodType, OAuth1Authorization, OAuth1Token};

const DEFAULT_AUTH_TOKEN_METHOD: &str = "POST";
const DEFAULT_AUTH_PARAMS_LOCATION: &str = "authorization";
const DEFAULT_SIGNATURE_METHOD: &str = "HMAC-SHA1";

/// OAuth 1 form state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OAuth1State {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub token: String,
    pub token_secret: String,
    pub request_token_uri: String,
    pub access_token_uri: String,
    pub authorization_uri: String,
    pub redirect_uri: String,
    pub auth_token_method: String,
    pub auth_params_location: String,
    pub signature_method: String,
    /// Set while a token request is outstanding.
    pub authorizing: bool,
    /// Message of the last failed token request.
    pub last_error_message: Option<String>,
}

impl OAuth1State {
    /// Creates a form with the default token method, parameter location and
    /// signature method.
    pub fn new() -> Self {
        Self {
            auth_token_method: DEFAULT_AUTH_TOKEN_METHOD.to_string(),
            auth_params_location: DEFAULT_AUTH_PARAMS_LOCATION.to_string(),
            signature_method: DEFAULT_SIGNATURE_METHOD.to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn settings(&self, base_uri: Option<&str>) -> OAuth1Authorization {
        OAuth1Authorization {
            consumer_key: self.consumer_key.clone(),
            consumer_secret: self.consumer_secret.clone(),
            token: self.token.clone(),
            token_secret: self.token_secret.clone(),
            request_token_uri: read_url_value(&self.request_token_uri, base_uri),
            access_token_uri: read_url_value(&self.access_token_uri, base_uri),
            authorization_uri: read_url_value(&self.authorization_uri, base_uri),
            redirect_uri: read_url_value(&self.redirect_uri, base_uri),
            auth_token_method: self.auth_token_method.clone(),
            auth_params_location: self.auth_params_location.clone(),
            signature_method: self.signature_method.clone(),
        }
    }

    /// Stores a token pair received from the authorizer.
    pub(crate) fn apply_token(&mut self, token: OAuth1Token) {
        self.token = token.token;
        self.token_secret = token.token_secret;
    }

    /// Starts a token request.
    ///
    /// Returns `None` without touching the form when it is invalid.
    /// Otherwise clears the last error, sets `authorizing` and returns the
    /// request for the authorizer.
    pub fn begin_authorize(&mut self, base_uri: Option<&str>) -> Option<OAuth1TokenRequest> {
        if !self.validate(base_uri) {
            tracing::debug!("OAuth 1 form is invalid, not authorizing");
            return None;
        }
        self.last_error_message = None;
        self.authorizing = true;
        tracing::info!("Requesting OAuth 1 token");
        Some(OAuth1TokenRequest {
            settings: self.settings(base_uri),
        })
    }

    /// Applies the authorizer's answer to a token request.
    ///
    /// # Errors
    ///
    /// When the authorizer failed, its message (or `"Unknown error"`) is
    /// stored in `last_error_message` and the error is returned as
    /// [`AuthMethodError::Authorization`].
    pub fn complete_authorize(&mut self, result: Result<OAuth1Token>) -> Result<OAuth1Token> {
        self.authorizing = false;
        match result {
            Ok(token) => {
                self.apply_token(token.clone());
                tracing::info!("OAuth 1 token received");
                Ok(token)
            }
            Err(err) => {
                let message = failure_message(&err);
                tracing::warn!(error = %message, "OAuth 1 authorization failed");
                self.last_error_message = Some(message.clone());
                Err(AuthMethodError::Authorization(message).into())
            }
        }
    }

    fn uri_fields(&self) -> [&str; 4] {
        [
            &self.request_token_uri,
            &self.access_token_uri,
            &self.authorization_uri,
            &self.redirect_uri,
        ]
    }
}

impl SchemeForm for OAuth1State {
    fn method_type(&self) -> MethodType {
        MethodType::OAuth1
    }

    fn template(&self) -> &'static str {
        "oauth1.html"
    }

    fn control_kind(&self, field: &str) -> Option<ControlKind> {
        match field {
            "consumerKey" | "consumerSecret" | "token" | "tokenSecret" | "requestTokenUri"
            | "accessTokenUri" | "authorizationUri" | "redirectUri" => Some(ControlKind::Text),
            "authTokenMethod" | "authParamsLocation" | "signatureMethod" => {
                Some(ControlKind::Select)
            }
            _ => None,
        }
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<()> {
        let target = match field {
            "consumerKey" => &mut self.consumer_key,
            "consumerSecret" => &mut self.consumer_secret,
            "token" => &mut self.token,
            "tokenSecret" => &mut self.token_secret,
            "requestTokenUri" => &mut self.request_token_uri,
            "accessTokenUri" => &mut self.access_token_uri,
            "authorizationUri" => &mut self.authorization_uri,
            "redirectUri" => &mut self.redirect_uri,
            "authTokenMethod" => &mut self.auth_token_method,
            "authParamsLocation" => &mut self.auth_params_location,
            "signatureMethod" => &mut self.signature_method,
            _ => {
                return Err(AuthMethodError::UnknownField {
                    method: MethodType::OAuth1.to_string(),
                    field: field.to_string(),
                }
                .into())
            }
        };
        *target = expect_text(field, value)?;
        Ok(())
    }

    fn serialize(&self, base_uri: Option<&str>) -> AuthorizationConfig {
        AuthorizationConfig::OAuth1(self.settings(base_uri))
    }

    fn restore(&mut self, settings: &Map<String, Value>) {
        restore_string(settings, "consumerKey", &mut self.consumer_key);
        restore_string(settings, "consumerSecret", &mut self.consumer_secret);
        restore_string(settings, "token", &mut self.token);
        restore_string(settings, "tokenSecret", &mut self.token_secret);
        restore_string(settings, "requestTokenUri", &mut self.request_token_uri);
        restore_string(settings, "accessTokenUri", &mut self.access_token_uri);
        restore_string(settings, "authorizationUri", &mut self.authorization_uri);
        restore_string(settings, "redirectUri", &mut self.redirect_uri);
        restore_string(settings, "authTokenMethod", &mut self.auth_token_method);
        restore_string(settings, "authParamsLocation", &mut self.auth_params_location);
        restore_string(settings, "signatureMethod", &mut self.signature_method);
    }

    fn validate(&self, base_uri: Option<&str>) -> bool {
        if self.consumer_key.is_empty() || self.consumer_secret.is_empty() {
            return false;
        }
        self.uri_fields()
            .iter()
            .filter(|uri| !uri.is_empty())
            .all(|uri| is_absolute_url(uri, base_uri))
    }

    fn clear(&mut self) {
        let authorizing = self.authorizing;
        *self = Self {
            authorizing,
            ..Self::default()
        };
    }

    fn render_context(&self, base_uri: Option<&str>) -> TemplateValue {
        context! {
            consumer_key => &self.consumer_key,
            consumer_secret => &self.consumer_secret,
            token => &self.token,
            token_secret => &self.token_secret,
            request_token_uri => &self.request_token_uri,
            access_token_uri => &self.access_token_uri,
            authorization_uri => &self.authorization_uri,
            redirect_uri => &self.redirect_uri,
            auth_token_method => &self.auth_token_method,
            auth_params_location => &self.auth_params_location,
            signature_method => &self.signature_method,
            url_type => url_input_type(base_uri),
            authorizing => self.authorizing,
            last_error_message => &self.last_error_message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filled() -> OAuth1State {
        OAuth1State {
            consumer_key: "key".to_string(),
            consumer_secret: "secret".to_string(),
            request_token_uri: "https://api.twitter.com/oauth/request_token".to_string(),
            access_token_uri: "/oauth/access_token".to_string(),
            ..OAuth1State::new()
        }
    }

    #[test]
    fn test_new_applies_defaults() {
        let state = OAuth1State::new();
        assert_eq!(state.auth_token_method, "POST");
        assert_eq!(state.auth_params_location, "authorization");
        assert_eq!(state.signature_method, "HMAC-SHA1");
    }

    #[test]
    fn test_validate_requires_consumer_credentials() {
        let mut state = OAuth1State::new();
        assert!(!state.validate(None));
        state.consumer_key = "key".to_string();
        assert!(!state.validate(None));
        state.consumer_secret = "secret".to_string();
        assert!(state.validate(None));
    }

    #[test]
    fn test_validate_relative_uri_needs_base() {
        let state = filled();
        assert!(!state.validate(None));
        assert!(state.validate(Some("https://api.twitter.com")));
    }

    #[test]
    fn test_serialize_applies_base_uri() {
        let state = filled();
        let config = state.serialize(Some("https://api.twitter.com/"));
        let settings = config.as_oauth1().unwrap();
        assert_eq!(
            settings.access_token_uri,
            "https://api.twitter.com/oauth/access_token"
        );
        assert_eq!(
            settings.request_token_uri,
            "https://api.twitter.com/oauth/request_token"
        );
        assert_eq!(state.access_token_uri, "/oauth/access_token");
    }

    #[test]
    fn test_restore_ignores_unknown_and_malformed_keys() {
        let mut state = filled();
        state.restore(
            json!({ "consumerKey": 12, "tokenSecret": "ts", "grantType": "implicit" })
                .as_object()
                .unwrap(),
        );
        assert_eq!(state.consumer_key, "key");
        assert_eq!(state.token_secret, "ts");
    }

    #[test]
    fn test_apply_token_sets_pair() {
        let mut state = filled();
        state.apply_token(OAuth1Token {
            token: "t".to_string(),
            token_secret: "s".to_string(),
        });
        assert_eq!(state.token, "t");
        assert_eq!(state.token_secret, "s");
    }

    #[test]
    fn test_begin_authorize_invalid_form_is_untouched() {
        let mut state = OAuth1State::new();
        assert!(state.begin_authorize(None).is_none());
        assert!(!state.authorizing);
    }

    #[test]
    fn test_begin_authorize_resolves_uris() {
        let mut state = filled();
        state.last_error_message = Some("old".to_string());
        let request = state.begin_authorize(Some("https://api.twitter.com")).unwrap();
        assert!(state.authorizing);
        assert_eq!(state.last_error_message, None);
        assert_eq!(
            request.settings.access_token_uri,
            "https://api.twitter.com/oauth/access_token"
        );
    }

    #[test]
    fn test_complete_authorize_empty_error_uses_fallback_message() {
        let mut state = filled();
        state.begin_authorize(Some("https://api.twitter.com")).unwrap();
        let err = state
            .complete_authorize(Err(anyhow::anyhow!("")))
            .unwrap_err();
        assert!(err.to_string().contains("Unknown error"));
        assert_eq!(state.last_error_message.as_deref(), Some("Unknown error"));
        assert!(!state.authorizing);
    }
}
