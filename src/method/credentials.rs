//! Basic, Bearer and NTLM credentials forms

use minijinja::{context, Value as TemplateValue};
use serde_json::{Map, Value};

use crate::error::{AuthMethodError, Result};
use crate::method::fields::{expect_text, restore_string, ControlKind, FieldValue};
use crate::method::SchemeForm;
use crate::settings::{
    AuthorizationConfig, BasicAuthorization, BearerAuthorization, MethodType, NtlmAuthorization,
};

fn unknown_field(method: MethodType, field: &str) -> anyhow::Error {
    AuthMethodError::UnknownField {
        method: method.to_string(),
        field: field.to_string(),
    }
    .into()
}

// ---------------------------------------------------------------------------
// Basic
// ---------------------------------------------------------------------------

/// Basic authentication form state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicState {
    pub username: String,
    pub password: String,
}

impl SchemeForm for BasicState {
    fn method_type(&self) -> MethodType {
        MethodType::Basic
    }

    fn template(&self) -> &'static str {
        "basic.html"
    }

    fn control_kind(&self, field: &str) -> Option<ControlKind> {
        match field {
            "username" | "password" => Some(ControlKind::Text),
            _ => None,
        }
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<()> {
        match field {
            "username" => self.username = expect_text(field, value)?,
            "password" => self.password = expect_text(field, value)?,
            _ => return Err(unknown_field(self.method_type(), field)),
        }
        Ok(())
    }

    fn serialize(&self, _base_uri: Option<&str>) -> AuthorizationConfig {
        AuthorizationConfig::Basic(BasicAuthorization {
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }

    fn restore(&mut self, settings: &Map<String, Value>) {
        restore_string(settings, "username", &mut self.username);
        restore_string(settings, "password", &mut self.password);
    }

    fn validate(&self, _base_uri: Option<&str>) -> bool {
        !self.username.is_empty()
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    fn render_context(&self, _base_uri: Option<&str>) -> TemplateValue {
        context! {
            username => &self.username,
            password => &self.password,
        }
    }
}

// ---------------------------------------------------------------------------
// Bearer
// ---------------------------------------------------------------------------

/// Bearer token form state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BearerState {
    pub token: String,
}

impl SchemeForm for BearerState {
    fn method_type(&self) -> MethodType {
        MethodType::Bearer
    }

    fn template(&self) -> &'static str {
        "bearer.html"
    }

    fn control_kind(&self, field: &str) -> Option<ControlKind> {
        (field == "token").then_some(ControlKind::Text)
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<()> {
        match field {
            "token" => self.token = expect_text(field, value)?,
            _ => return Err(unknown_field(self.method_type(), field)),
        }
        Ok(())
    }

    fn serialize(&self, _base_uri: Option<&str>) -> AuthorizationConfig {
        AuthorizationConfig::Bearer(BearerAuthorization {
            token: self.token.clone(),
        })
    }

    fn restore(&mut self, settings: &Map<String, Value>) {
        restore_string(settings, "token", &mut self.token);
    }

    fn validate(&self, _base_uri: Option<&str>) -> bool {
        !self.token.is_empty()
    }

    fn clear(&mut self) {
        self.token.clear();
    }

    fn render_context(&self, _base_uri: Option<&str>) -> TemplateValue {
        context! { token => &self.token }
    }
}

// ---------------------------------------------------------------------------
// NTLM
// ---------------------------------------------------------------------------

/// NTLM form state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NtlmState {
    pub username: String,
    pub password: String,
    pub domain: String,
}

impl SchemeForm for NtlmState {
    fn method_type(&self) -> MethodType {
        MethodType::Ntlm
    }

    fn template(&self) -> &'static str {
        "ntlm.html"
    }

    fn control_kind(&self, field: &str) -> Option<ControlKind> {
        match field {
            "username" | "password" | "domain" => Some(ControlKind::Text),
            _ => None,
        }
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<()> {
        match field {
            "username" => self.username = expect_text(field, value)?,
            "password" => self.password = expect_text(field, value)?,
            "domain" => self.domain = expect_text(field, value)?,
            _ => return Err(unknown_field(self.method_type(), field)),
        }
        Ok(())
    }

    fn serialize(&self, _base_uri: Option<&str>) -> AuthorizationConfig {
        AuthorizationConfig::Ntlm(NtlmAuthorization {
            username: self.username.clone(),
            password: self.password.clone(),
            domain: self.domain.clone(),
        })
    }

    fn restore(&mut self, settings: &Map<String, Value>) {
        restore_string(settings, "username", &mut self.username);
        restore_string(settings, "password", &mut self.password);
        restore_string(settings, "domain", &mut self.domain);
    }

    fn validate(&self, _base_uri: Option<&str>) -> bool {
        !self.username.is_empty()
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    fn render_context(&self, _base_uri: Option<&str>) -> TemplateValue {
        context! {
            username => &self.username,
            password => &self.password,
            domain => &self.domain,
        }
    }
}
