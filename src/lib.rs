//! authorization-method - HTTP authorization method editor library
//!
//! This library holds the state of an authorization method form (Basic,
//! Bearer, NTLM, Digest, OAuth 1 and OAuth 2), renders it, serializes and
//! restores its settings, validates it and runs the OAuth token request flow
//! through an injected authorizer.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `method`: The editor, per-scheme form state and field semantics
//! - `settings`: Method types and serialized settings
//! - `authorizer`: The authorization port and the demo authorizer
//! - `render`: Form markup rendering
//! - `events`: Change notification
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` / `commands`: The demo command-line interface
//!
//! # Example
//!
//! ```
//! use authorization_method::{AuthorizationMethod, MethodType};
//! use serde_json::json;
//!
//! let mut method = AuthorizationMethod::new(MethodType::OAuth2);
//! method.set_base_uri(Some("https://api.domain.com/auth/".to_string()));
//! method.restore(&json!({
//!     "grantType": "client_credentials",
//!     "accessTokenUri": "/token",
//! }));
//!
//! let settings = method.serialize().to_value().unwrap();
//! assert_eq!(settings["accessTokenUri"], "https://api.domain.com/auth/token");
//! assert_eq!(settings["deliveryMethod"], "body");
//! ```

pub mod authorizer;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod method;
pub mod render;
pub mod settings;

// Re-export commonly used types
pub use authorizer::{generate_state, Authorizer};
pub use config::Config;
pub use error::{AuthMethodError, Result};
pub use events::ChangeEvent;
pub use method::{AuthorizationMethod, ControlEvent, FieldValue, SchemeState};
pub use render::{FormRenderer, UiFlags};
pub use settings::{AuthorizationConfig, MethodType, TokenInfo};

#[cfg(test)]
pub mod test_utils;
