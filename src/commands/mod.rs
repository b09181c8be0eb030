/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `types`     — List method types and OAuth 2 grant types
- `form`      — Render, serialize and validate a method built from a settings file
- `authorize` — Request a token from the demo authorizer

Every handler builds its editor through [`load_method`], so the settings file,
the configuration and the CLI overrides are applied the same way everywhere.
*/

use std::path::Path;

use crate::config::Config;
use crate::error::{AuthMethodError, Result};
use crate::method::AuthorizationMethod;
use crate::settings::MethodType;

pub mod authorize;
pub mod form;
pub mod types;

/// Read a JSON settings file
///
/// # Errors
///
/// Returns [`AuthMethodError::Config`] if the file cannot be read, and a
/// serialization error if it is not valid JSON.
pub fn read_settings(path: &Path) -> Result<serde_json::Value> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AuthMethodError::Config(format!(
            "Failed to read settings file {}: {}",
            path.display(),
            e
        ))
    })?;
    let value = serde_json::from_str(&contents).map_err(AuthMethodError::Serialization)?;
    Ok(value)
}

/// Build an editor for `method`, restore `settings` into it and apply the
/// configuration
///
/// # Examples
///
/// ```
/// use authorization_method::commands::load_method;
/// use authorization_method::config::Config;
/// use authorization_method::settings::MethodType;
///
/// let method = load_method(&Config::default(), MethodType::Digest, None).unwrap();
/// assert_eq!(method.as_digest().unwrap().qop, "auth");
/// ```
pub fn load_method(
    config: &Config,
    method: MethodType,
    settings: Option<&Path>,
) -> Result<AuthorizationMethod> {
    let mut editor = match settings {
        Some(path) => {
            tracing::debug!("Loading settings from: {}", path.display());
            AuthorizationMethod::with_settings(method, &read_settings(path)?)
        }
        None => AuthorizationMethod::new(method),
    };
    config.apply_to(&mut editor);
    Ok(editor)
}
