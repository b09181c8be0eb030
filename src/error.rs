//! Error types for the authorization method editor
//!
//! This module defines all error types used throughout the crate,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for authorization method operations
///
/// Expected invalid user input is never an error: validation reports a
/// boolean and restoration tolerates malformed data. These variants cover
/// caller mistakes, configuration problems, rendering failures and
/// authorization failures reported by the external authorizer.
#[derive(Error, Debug)]
pub enum AuthMethodError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The `type` discriminator does not name a supported method
    #[error("Unknown authorization method type: {0}")]
    UnknownMethodType(String),

    /// A control name that does not belong to the active method
    #[error("Unknown field '{field}' for method {method}")]
    UnknownField {
        /// The active method type
        method: String,
        /// The field name that was not recognized
        field: String,
    },

    /// A value of the wrong kind was supplied for a field
    #[error("Invalid value for field '{field}': {message}")]
    InvalidFieldValue {
        /// The field name
        field: String,
        /// What was expected
        message: String,
    },

    /// The active method has no authorization flow
    #[error("Authorization is not supported for method {0}")]
    AuthorizationNotSupported(String),

    /// The external authorizer rejected the token request
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// Form markup rendering errors
    #[error("Render error: {0}")]
    Render(#[from] minijinja::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for authorization method operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
