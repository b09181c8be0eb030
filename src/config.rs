//! Configuration management for the authorization method editor
//!
//! This module handles loading, parsing, validating, and applying
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{AuthMethodError, Result};
use crate::method::AuthorizationMethod;
use crate::render::UiFlags;
use crate::settings::CredentialSource;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound for the demo authorizer delay
const MAX_TOKEN_DELAY_MS: u64 = 60_000;

/// Main configuration structure
///
/// Holds the UI flags applied to every form, the OAuth 2 options a host
/// usually sets once, and the demo authorizer settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Visual modes for rendered controls
    #[serde(default)]
    pub ui: UiFlags,

    /// OAuth 2 form options
    #[serde(default)]
    pub oauth2: OAuth2Config,

    /// Demo authorizer settings
    #[serde(default)]
    pub demo: DemoConfig,
}

/// OAuth 2 form options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OAuth2Config {
    /// URI that relative URLs starting with `/` are resolved against
    #[serde(default)]
    pub base_uri: Option<String>,

    /// Hide the PKCE control
    #[serde(default)]
    pub no_pkce: bool,

    /// Hide the grant type selector
    #[serde(default)]
    pub no_grant_type: bool,

    /// Scopes offered by the scope selector
    #[serde(default)]
    pub allowed_scopes: Vec<String>,

    /// Drop scopes outside `allowed_scopes`
    #[serde(default)]
    pub prevent_custom_scopes: bool,

    /// Pre-configured client credentials
    #[serde(default)]
    pub credentials_source: Vec<CredentialSource>,
}

/// Demo authorizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Delay before a token is returned (milliseconds)
    #[serde(default = "default_token_delay_ms")]
    pub token_delay_ms: u64,

    /// OAuth 2 access token returned by the demo authorizer
    #[serde(default = "default_access_token")]
    pub access_token: String,

    /// OAuth 1 token returned by the demo authorizer
    #[serde(default = "default_oauth1_token")]
    pub oauth1_token: String,

    /// OAuth 1 token secret returned by the demo authorizer
    #[serde(default = "default_oauth1_token_secret")]
    pub oauth1_token_secret: String,
}

fn default_token_delay_ms() -> u64 {
    1000
}

fn default_access_token() -> String {
    "demo-access-token".to_string()
}

fn default_oauth1_token() -> String {
    "dummy-token".to_string()
}

fn default_oauth1_token_secret() -> String {
    "dummy-secret".to_string()
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            token_delay_ms: default_token_delay_ms(),
            access_token: default_access_token(),
            oauth1_token: default_oauth1_token(),
            oauth1_token_secret: default_oauth1_token_secret(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error; defaults are used instead.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    /// * `cli` - Parsed command line arguments
    ///
    /// # Errors
    ///
    /// Returns [`AuthMethodError::Config`] if the file exists but cannot be
    /// read or parsed.
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AuthMethodError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| AuthMethodError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_uri) = std::env::var("AUTHORIZATION_METHOD_BASE_URI") {
            self.oauth2.base_uri = Some(base_uri).filter(|base| !base.is_empty());
        }

        if let Ok(scopes) = std::env::var("AUTHORIZATION_METHOD_ALLOWED_SCOPES") {
            self.oauth2.allowed_scopes = scopes
                .split(',')
                .map(str::trim)
                .filter(|scope| !scope.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Ok(value) = std::env::var("AUTHORIZATION_METHOD_COMPATIBILITY") {
            match parse_flag(&value) {
                Some(flag) => self.ui.compatibility = flag,
                None => tracing::warn!("Invalid AUTHORIZATION_METHOD_COMPATIBILITY: {}", value),
            }
        }

        if let Ok(value) = std::env::var("AUTHORIZATION_METHOD_OUTLINED") {
            match parse_flag(&value) {
                Some(flag) => self.ui.outlined = flag,
                None => tracing::warn!("Invalid AUTHORIZATION_METHOD_OUTLINED: {}", value),
            }
        }

        if let Ok(delay) = std::env::var("AUTHORIZATION_METHOD_TOKEN_DELAY_MS") {
            if let Ok(value) = delay.parse() {
                self.demo.token_delay_ms = value;
            } else {
                tracing::warn!("Invalid AUTHORIZATION_METHOD_TOKEN_DELAY_MS: {}", delay);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
        if let Some(base_uri) = &cli.base_uri {
            self.oauth2.base_uri = Some(base_uri.clone()).filter(|base| !base.is_empty());
        }
        if cli.outlined {
            self.ui.outlined = true;
        }
        if cli.compatibility {
            self.ui.compatibility = true;
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`AuthMethodError::Config`] if the base URI is not an absolute
    /// URL or the demo delay is out of range.
    pub fn validate(&self) -> Result<()> {
        if let Some(base_uri) = &self.oauth2.base_uri {
            if url::Url::parse(base_uri).is_err() {
                return Err(AuthMethodError::Config(format!(
                    "oauth2.base_uri must be an absolute URL: {}",
                    base_uri
                ))
                .into());
            }
        }

        if self.demo.token_delay_ms > MAX_TOKEN_DELAY_MS {
            return Err(AuthMethodError::Config(format!(
                "demo.token_delay_ms must be less than or equal to {}",
                MAX_TOKEN_DELAY_MS
            ))
            .into());
        }

        if self.demo.access_token.is_empty() {
            return Err(
                AuthMethodError::Config("demo.access_token cannot be empty".to_string()).into(),
            );
        }

        Ok(())
    }

    /// Applies the UI flags, base URI and OAuth 2 options to `method`.
    ///
    /// OAuth 2 options are only applied while the method is OAuth 2. Nothing
    /// here raises a change event.
    pub fn apply_to(&self, method: &mut AuthorizationMethod) {
        method.set_ui_flags(self.ui);
        method.set_base_uri(self.oauth2.base_uri.clone());
        if let Some(state) = method.as_oauth2_mut() {
            state.no_pkce = self.oauth2.no_pkce;
            state.no_grant_type = self.oauth2.no_grant_type;
            state.allowed_scopes = self.oauth2.allowed_scopes.clone();
            state.prevent_custom_scopes = self.oauth2.prevent_custom_scopes;
            state.credentials_source = self.oauth2.credentials_source.clone();
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
