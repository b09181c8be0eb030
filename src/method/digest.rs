//! HTTP Digest form

use minijinja::{context, Value as TemplateValue};
use serde_json::{Map, Value};

use crate::error::{AuthMethodError, Result};
use crate::method::fields::{expect_text, restore_string, ControlKind, FieldValue};
use crate::method::SchemeForm;
use crate::settings::{AuthorizationConfig, DigestAuthorization, MethodType};

const DEFAULT_ALGORITHM: &str = "MD5";
const DEFAULT_QOP: &str = "auth";
const DEFAULT_NC: &str = "00000001";

/// Digest form state.
///
/// Computing the digest response is left to the HTTP client; this form only
/// collects the parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestState {
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

impl DigestState {
    /// Creates a form with the default algorithm, quality of protection,
    /// nonce count and a fresh client nonce.
    pub fn new() -> Self {
        Self {
            algorithm: DEFAULT_ALGORITHM.to_string(),
            qop: DEFAULT_QOP.to_string(),
            nc: DEFAULT_NC.to_string(),
            cnonce: generate_cnonce(),
            ..Self::default()
        }
    }
}

/// 16 lowercase hex characters.
fn generate_cnonce() -> String {
    use rand::RngCore as _;
    let mut bytes = [0u8; 8];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

impl SchemeForm for DigestState {
    fn method_type(&self) -> MethodType {
        MethodType::Digest
    }

    fn template(&self) -> &'static str {
        "digest.html"
    }

    fn control_kind(&self, field: &str) -> Option<ControlKind> {
        match field {
            "username" | "password" | "realm" | "nonce" | "opaque" | "requestUrl" | "nc"
            | "cnonce" => Some(ControlKind::Text),
            "algorithm" | "qop" => Some(ControlKind::Select),
            _ => None,
        }
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<()> {
        let target = match field {
            "username" => &mut self.username,
            "password" => &mut self.password,
            "realm" => &mut self.realm,
            "nonce" => &mut self.nonce,
            "opaque" => &mut self.opaque,
            "algorithm" => &mut self.algorithm,
            "requestUrl" => &mut self.request_url,
            "qop" => &mut self.qop,
            "nc" => &mut self.nc,
            "cnonce" => &mut self.cnonce,
            _ => {
                return Err(AuthMethodError::UnknownField {
                    method: MethodType::Digest.to_string(),
                    field: field.to_string(),
                }
                .into())
            }
        };
        *target = expect_text(field, value)?;
        Ok(())
    }

    fn serialize(&self, _base_uri: Option<&str>) -> AuthorizationConfig {
        AuthorizationConfig::Digest(DigestAuthorization {
            username: self.username.clone(),
            password: self.password.clone(),
            realm: self.realm.clone(),
            nonce: self.nonce.clone(),
            opaque: self.opaque.clone(),
            algorithm: self.algorithm.clone(),
            request_url: self.request_url.clone(),
            qop: self.qop.clone(),
            nc: self.nc.clone(),
            cnonce: self.cnonce.clone(),
        })
    }

    fn restore(&mut self, settings: &Map<String, Value>) {
        restore_string(settings, "username", &mut self.username);
        restore_string(settings, "password", &mut self.password);
        restore_string(settings, "realm", &mut self.realm);
        restore_string(settings, "nonce", &mut self.nonce);
        restore_string(settings, "opaque", &mut self.opaque);
        restore_string(settings, "algorithm", &mut self.algorithm);
        restore_string(settings, "requestUrl", &mut self.request_url);
        restore_string(settings, "qop", &mut self.qop);
        restore_string(settings, "nc", &mut self.nc);
        restore_string(settings, "cnonce", &mut self.cnonce);
    }

    fn validate(&self, _base_uri: Option<&str>) -> bool {
        let base = !self.username.is_empty() && !self.realm.is_empty() && !self.nonce.is_empty();
        if self.qop.is_empty() {
            return base;
        }
        base && !self.nc.is_empty() && !self.cnonce.is_empty()
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    fn render_context(&self, _base_uri: Option<&str>) -> TemplateValue {
        context! {
            username => &self.username,
            password => &self.password,
            realm => &self.realm,
            nonce => &self.nonce,
            opaque => &self.opaque,
            algorithm => &self.algorithm,
            request_url => &self.request_url,
            qop => &self.qop,
            nc => &self.nc,
            cnonce => &self.cnonce,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filled() -> DigestState {
        DigestState {
            username: "user".to_string(),
            realm: "testrealm@host.com".to_string(),
            nonce: "dcd98b7102dd2f0e8b11d0f600bfb0c093".to_string(),
            ..DigestState::new()
        }
    }

    #[test]
    fn test_new_applies_defaults() {
        let state = DigestState::new();
        assert_eq!(state.algorithm, "MD5");
        assert_eq!(state.qop, "auth");
        assert_eq!(state.nc, "00000001");
        assert_eq!(state.cnonce.len(), 16);
        assert!(state.cnonce.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_validate_requires_username_realm_nonce() {
        assert!(!DigestState::new().validate(None));
        assert!(filled().validate(None));
        let mut missing_realm = filled();
        missing_realm.realm.clear();
        assert!(!missing_realm.validate(None));
    }

    #[test]
    fn test_validate_requires_counters_only_with_qop() {
        let mut state = filled();
        state.cnonce.clear();
        assert!(!state.validate(None));
        state.qop.clear();
        assert!(state.validate(None));
    }

    #[test]
    fn test_request_url_uses_camel_case_key() {
        let mut state = filled();
        state.restore(json!({ "requestUrl": "https://api.com/x" }).as_object().unwrap());
        assert_eq!(state.request_url, "https://api.com/x");
        let value = state.serialize(None).to_value().unwrap();
        assert_eq!(value["requestUrl"], "https://api.com/x");
    }

    #[test]
    fn test_clear_empties_every_field() {
        let mut state = filled();
        state.clear();
        assert_eq!(state, DigestState::default());
    }
}
