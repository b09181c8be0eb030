//! Serialized authorization settings
//!
//! Plain data types produced by [`AuthorizationMethod::serialize`] and
//! exchanged with the external authorization library. Field names are
//! camelCase on the wire so the objects match what host applications already
//! store for each authorization method.
//!
//! [`AuthorizationMethod::serialize`]: crate::method::AuthorizationMethod::serialize

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AuthMethodError, Result};

// ---------------------------------------------------------------------------
// MethodType
// ---------------------------------------------------------------------------

/// The `type` discriminator selecting the active authorization method.
///
/// # Examples
///
/// ```
/// use authorization_method::settings::MethodType;
///
/// let method: MethodType = "oauth 2".parse().unwrap();
/// assert_eq!(method, MethodType::OAuth2);
/// assert_eq!(method.to_string(), "oauth 2");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MethodType {
    /// HTTP Basic authentication
    #[serde(rename = "basic")]
    Basic,
    /// Bearer token authentication
    #[serde(rename = "bearer")]
    Bearer,
    /// NTLM authentication
    #[serde(rename = "ntlm")]
    Ntlm,
    /// HTTP Digest authentication
    #[serde(rename = "digest")]
    Digest,
    /// OAuth 1.0a
    #[serde(rename = "oauth 1")]
    OAuth1,
    /// OAuth 2.0
    #[serde(rename = "oauth 2")]
    OAuth2,
}

impl MethodType {
    /// All supported method types in display order.
    pub const ALL: [MethodType; 6] = [
        MethodType::Basic,
        MethodType::Bearer,
        MethodType::Ntlm,
        MethodType::Digest,
        MethodType::OAuth1,
        MethodType::OAuth2,
    ];

    /// Canonical discriminator string.
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodType::Basic => "basic",
            MethodType::Bearer => "bearer",
            MethodType::Ntlm => "ntlm",
            MethodType::Digest => "digest",
            MethodType::OAuth1 => "oauth 1",
            MethodType::OAuth2 => "oauth 2",
        }
    }

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            MethodType::Basic => "Basic",
            MethodType::Bearer => "Bearer",
            MethodType::Ntlm => "NTLM",
            MethodType::Digest => "Digest",
            MethodType::OAuth1 => "OAuth 1",
            MethodType::OAuth2 => "OAuth 2",
        }
    }
}

impl fmt::Display for MethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MethodType {
    type Err = anyhow::Error;

    /// Parses a method type, case-insensitively. `oauth1` and `oauth2` are
    /// accepted as aliases for `oauth 1` and `oauth 2`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(MethodType::Basic),
            "bearer" => Ok(MethodType::Bearer),
            "ntlm" => Ok(MethodType::Ntlm),
            "digest" => Ok(MethodType::Digest),
            "oauth 1" | "oauth1" => Ok(MethodType::OAuth1),
            "oauth 2" | "oauth2" => Ok(MethodType::OAuth2),
            _ => Err(AuthMethodError::UnknownMethodType(s.to_string()).into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Per-method settings
// ---------------------------------------------------------------------------

/// Serialized Basic authentication settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicAuthorization {
    pub username: String,
    pub password: String,
}

/// Serialized Bearer authentication settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BearerAuthorization {
    pub token: String,
}

/// Serialized NTLM authentication settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NtlmAuthorization {
    pub username: String,
    pub password: String,
    pub domain: String,
}

/// Serialized Digest authentication settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestAuthorization {
    pub username: String,
    pub password: String,
    pub realm: String,
    pub nonce: String,
    pub opaque: String,
    pub algorithm: String,
    pub request_url: String,
    pub qop: String,
    pub nc: String,
    pub cnonce: String,
}

/// Serialized OAuth 1 settings.
///
/// URI fields carry the base URI already applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuth1Authorization {
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
}

/// Serialized OAuth 2 settings.
///
/// Optional fields are present only when the selected grant type uses them.
/// `delivery_method` carries the client credentials delivery method for the
/// `client_credentials` grant and the token delivery method otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuth2Authorization {
    pub grant_type: String,
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub delivery_method: String,
    #[serde(default)]
    pub delivery_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pkce: Option<bool>,
}

// ---------------------------------------------------------------------------
// AuthorizationConfig
// ---------------------------------------------------------------------------

/// The serialized configuration of the active method.
///
/// Serializes as the bare settings object (no tag); the method type travels
/// separately as the `type` discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AuthorizationConfig {
    Basic(BasicAuthorization),
    Bearer(BearerAuthorization),
    Ntlm(NtlmAuthorization),
    Digest(DigestAuthorization),
    OAuth1(OAuth1Authorization),
    OAuth2(OAuth2Authorization),
}

impl AuthorizationConfig {
    /// The method type this configuration belongs to.
    pub fn method_type(&self) -> MethodType {
        match self {
            AuthorizationConfig::Basic(_) => MethodType::Basic,
            AuthorizationConfig::Bearer(_) => MethodType::Bearer,
            AuthorizationConfig::Ntlm(_) => MethodType::Ntlm,
            AuthorizationConfig::Digest(_) => MethodType::Digest,
            AuthorizationConfig::OAuth1(_) => MethodType::OAuth1,
            AuthorizationConfig::OAuth2(_) => MethodType::OAuth2,
        }
    }

    /// Converts the configuration into a plain JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`AuthMethodError::Serialization`] if encoding fails.
    pub fn to_value(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| AuthMethodError::Serialization(e).into())
    }

    pub fn as_bearer(&self) -> Option<&BearerAuthorization> {
        match self {
            AuthorizationConfig::Bearer(config) => Some(config),
            _ => None,
        }
    }

    pub fn as_oauth1(&self) -> Option<&OAuth1Authorization> {
        match self {
            AuthorizationConfig::OAuth1(config) => Some(config),
            _ => None,
        }
    }

    pub fn as_oauth2(&self) -> Option<&OAuth2Authorization> {
        match self {
            AuthorizationConfig::OAuth2(config) => Some(config),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// OAuth 2 grant types and credential sources
// ---------------------------------------------------------------------------

/// A selectable OAuth 2 grant type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantType {
    /// Grant type value sent to the authorization server.
    #[serde(rename = "type")]
    pub grant_type: String,
    /// Label shown in the grant type selector.
    pub label: String,
}

impl GrantType {
    pub fn new(grant_type: &str, label: &str) -> Self {
        Self {
            grant_type: grant_type.to_string(),
            label: label.to_string(),
        }
    }
}

pub const GRANT_IMPLICIT: &str = "implicit";
pub const GRANT_AUTHORIZATION_CODE: &str = "authorization_code";
pub const GRANT_CLIENT_CREDENTIALS: &str = "client_credentials";
pub const GRANT_PASSWORD: &str = "password";

/// The standard OAuth 2 grant types offered by default.
pub fn oauth2_grant_types() -> Vec<GrantType> {
    vec![
        GrantType::new(GRANT_IMPLICIT, "Access token (browser flow)"),
        GrantType::new(GRANT_AUTHORIZATION_CODE, "Authorization code (server flow)"),
        GrantType::new(GRANT_CLIENT_CREDENTIALS, "Client credentials"),
        GrantType::new(GRANT_PASSWORD, "Password"),
    ]
}

/// A named, pre-configured client id/secret pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCredentials {
    pub name: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
}

/// Client credentials available for one grant type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSource {
    pub grant_type: String,
    #[serde(default)]
    pub credentials: Vec<ClientCredentials>,
}

// ---------------------------------------------------------------------------
// Token responses
// ---------------------------------------------------------------------------

/// The OAuth 2 token returned by the external authorization library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// The `state` echoed back from the authorization request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl TokenInfo {
    /// Absolute expiry time of the token relative to `issued_at`.
    ///
    /// Returns `None` when the response carried no `expires_in` or the
    /// expiry is not representable.
    pub fn expires_at(&self, issued_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.expires_in?).ok()?;
        issued_at.checked_add_signed(chrono::TimeDelta::try_seconds(secs)?)
    }
}

/// The OAuth 1 token pair returned by the external authorization library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth1Token {
    #[serde(rename = "oauth_token")]
    pub token: String,
    #[serde(rename = "oauth_token_secret")]
    pub token_secret: String,
}
