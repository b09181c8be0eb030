//! OAuth 2 form and authorization request state
//!
//! The visible field set depends on the selected grant type:
//!
//! | grant type           | secret | auth URI | token URI | user/pass | redirect |
//! |----------------------|--------|----------|-----------|-----------|----------|
//! | `implicit`           |        | yes      |           |           | yes      |
//! | `authorization_code` | req.   | yes      | yes       |           | yes      |
//! | `client_credentials` | opt.   |          | yes       |           |          |
//! | `password`           | opt.   |          | yes       | yes       |          |
//! | custom               | opt.   | yes      | yes       | yes       | yes      |
//!
//! The client id is required for every grant except `client_credentials`
//! and `password`.
//!
//! # Authorization
//!
//! A token request is split in two halves so that a host can keep editing the
//! form while the external authorizer works:
//!
//! 1. [`OAuth2State::begin_authorize`] validates the form, generates a fresh
//!    `state` and returns a [`PendingAuthorization`].
//! 2. [`OAuth2State::complete_authorize`] applies the authorizer's answer.
//!    Answers whose `state` does not match, or that arrive after an access
//!    token was already set, are ignored.
//!
//! Several requests may be outstanding at once; they are not serialized.

use chrono::{DateTime, Utc};
use minijinja::{context, Value as TemplateValue};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::authorizer::{generate_state, OAuth2AuthorizeRequest};
use crate::error::{AuthMethodError, Result};
use crate::method::fields::{
    expect_flag, expect_list, expect_text, is_absolute_url, read_url_value, restore_bool,
    restore_list, restore_string, url_input_type, ControlKind, FieldValue,
};
use crate::method::{failure_message, SchemeForm};
use crate::settings::{
    oauth2_grant_types, AuthorizationConfig, CredentialSource, GrantType, MethodType,
    OAuth2Authorization, TokenInfo, GRANT_AUTHORIZATION_CODE, GRANT_CLIENT_CREDENTIALS,
    GRANT_IMPLICIT, GRANT_PASSWORD,
};

const DEFAULT_TOKEN_TYPE: &str = "Bearer";
const DEFAULT_DELIVERY_METHOD: &str = "header";
const DEFAULT_DELIVERY_NAME: &str = "authorization";
const DEFAULT_CC_DELIVERY_METHOD: &str = "body";

/// Labels the user can copy to the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyTarget {
    RedirectUri,
    AccessToken,
}

/// A token request handed to the authorizer, awaiting its answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAuthorization {
    request: OAuth2AuthorizeRequest,
}

impl PendingAuthorization {
    /// The `state` generated for this request.
    pub fn state(&self) -> &str {
        &self.request.state
    }

    pub fn request(&self) -> &OAuth2AuthorizeRequest {
        &self.request
    }

    pub fn into_request(self) -> OAuth2AuthorizeRequest {
        self.request
    }
}

/// How an authorizer answer was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationOutcome {
    /// The token was stored on the form.
    Resolved(TokenInfo),
    /// The answer was stale and discarded.
    Ignored,
}

/// OAuth 2 form state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OAuth2State {
    pub grant_type: String,
    pub client_id: String,
    pub client_secret: String,
    pub authorization_uri: String,
    pub access_token_uri: String,
    pub redirect_uri: String,
    /// Resource owner credentials for the `password` grant.
    pub username: String,
    pub password: String,
    /// Requested scopes, in the order the user added them.
    pub scopes: Vec<String>,
    /// Scopes offered by the scope selector.
    pub allowed_scopes: Vec<String>,
    /// Drop scopes that are not in `allowed_scopes`. Has no effect while
    /// `allowed_scopes` is empty.
    pub prevent_custom_scopes: bool,
    pub access_token: String,
    pub token_type: String,
    pub token_expires_at: Option<DateTime<Utc>>,
    /// Grant types offered by the selector.
    pub grant_types: Vec<GrantType>,
    /// Hide the grant type selector.
    pub no_grant_type: bool,
    /// Where the access token is put in the authorized request.
    pub oauth_delivery_method: String,
    /// Name of the header or parameter carrying the access token.
    pub oauth_delivery_name: String,
    /// Where client credentials are sent in the `client_credentials` grant.
    pub cc_delivery_method: String,
    pub pkce: bool,
    /// Hide the PKCE control.
    pub no_pkce: bool,
    pub credentials_source: Vec<CredentialSource>,
    /// Name of the selected pre-configured credentials, empty for custom.
    pub credential_source: String,
    /// Advanced fields are hidden behind a toggle.
    pub advanced: bool,
    pub advanced_opened: bool,
    pub authorizing: bool,
    pub last_error_message: Option<String>,
}

impl OAuth2State {
    /// Creates a form with defaults applied.
    pub fn new() -> Self {
        let mut state = Self::default();
        state.set_defaults();
        state
    }

    /// Fills unset delivery settings, token type and grant types.
    ///
    /// Values already set are kept.
    pub fn set_defaults(&mut self) {
        if self.token_type.is_empty() {
            self.token_type = DEFAULT_TOKEN_TYPE.to_string();
        }
        if self.oauth_delivery_method.is_empty() {
            self.oauth_delivery_method = DEFAULT_DELIVERY_METHOD.to_string();
        }
        if self.oauth_delivery_name.is_empty() {
            self.oauth_delivery_name = DEFAULT_DELIVERY_NAME.to_string();
        }
        if self.cc_delivery_method.is_empty() {
            self.cc_delivery_method = DEFAULT_CC_DELIVERY_METHOD.to_string();
        }
        if self.grant_types.is_empty() {
            self.grant_types = oauth2_grant_types();
        }
    }

    /// Moves pre-filled advanced fields behind a toggle.
    ///
    /// When every advanced field shown for the grant type already has a
    /// value, the advanced section starts collapsed and a toggle is rendered.
    /// Otherwise all fields are shown and no toggle is rendered.
    pub fn auto_hide(&mut self) {
        let mut advanced_values = Vec::new();
        if self.authorization_uri_rendered() {
            advanced_values.push(!self.authorization_uri.is_empty());
        }
        if self.access_token_uri_rendered() {
            advanced_values.push(!self.access_token_uri.is_empty());
        }
        advanced_values.push(!self.scopes.is_empty());

        let filled = advanced_values.iter().all(|filled| *filled);
        self.advanced = filled;
        self.advanced_opened = !filled;
    }

    pub fn toggle_advanced(&mut self) {
        self.advanced_opened = !self.advanced_opened;
    }

    // -----------------------------------------------------------------------
    // Grant type dependent field set
    // -----------------------------------------------------------------------

    pub fn is_custom_grant_type(&self) -> bool {
        !self.grant_type.is_empty()
            && ![
                GRANT_IMPLICIT,
                GRANT_AUTHORIZATION_CODE,
                GRANT_CLIENT_CREDENTIALS,
                GRANT_PASSWORD,
            ]
            .contains(&self.grant_type.as_str())
    }

    pub fn client_id_required(&self) -> bool {
        !matches!(
            self.grant_type.as_str(),
            GRANT_CLIENT_CREDENTIALS | GRANT_PASSWORD
        )
    }

    pub fn client_secret_rendered(&self) -> bool {
        self.is_custom_grant_type()
            || matches!(
                self.grant_type.as_str(),
                GRANT_AUTHORIZATION_CODE | GRANT_CLIENT_CREDENTIALS | GRANT_PASSWORD
            )
    }

    pub fn client_secret_required(&self) -> bool {
        self.grant_type == GRANT_AUTHORIZATION_CODE
    }

    pub fn authorization_uri_rendered(&self) -> bool {
        self.is_custom_grant_type()
            || matches!(
                self.grant_type.as_str(),
                GRANT_IMPLICIT | GRANT_AUTHORIZATION_CODE
            )
    }

    pub fn access_token_uri_rendered(&self) -> bool {
        self.is_custom_grant_type()
            || matches!(
                self.grant_type.as_str(),
                GRANT_AUTHORIZATION_CODE | GRANT_CLIENT_CREDENTIALS | GRANT_PASSWORD
            )
    }

    pub fn password_rendered(&self) -> bool {
        self.is_custom_grant_type() || self.grant_type == GRANT_PASSWORD
    }

    pub fn redirect_rendered(&self) -> bool {
        self.authorization_uri_rendered()
    }

    pub fn pkce_rendered(&self) -> bool {
        self.grant_type == GRANT_AUTHORIZATION_CODE && !self.no_pkce
    }

    pub fn cc_delivery_rendered(&self) -> bool {
        self.grant_type == GRANT_CLIENT_CREDENTIALS
    }

    // -----------------------------------------------------------------------
    // Scopes and credential sources
    // -----------------------------------------------------------------------

    fn set_scopes(&mut self, scopes: Vec<String>) {
        let restrict = self.prevent_custom_scopes && !self.allowed_scopes.is_empty();
        let mut accepted: Vec<String> = Vec::with_capacity(scopes.len());
        for scope in scopes {
            if restrict && !self.allowed_scopes.contains(&scope) {
                tracing::warn!(scope = %scope, "Dropping scope that is not allowed");
                continue;
            }
            if !accepted.contains(&scope) {
                accepted.push(scope);
            }
        }
        self.scopes = accepted;
    }

    /// Selects pre-configured client credentials by name.
    ///
    /// An empty name switches back to custom credentials and keeps the
    /// current client id and secret editable.
    ///
    /// # Errors
    ///
    /// Returns [`AuthMethodError::InvalidFieldValue`] when no credentials with
    /// that name exist for the selected grant type.
    pub fn select_credential_source(&mut self, name: &str) -> Result<()> {
        if name.is_empty() {
            self.credential_source.clear();
            return Ok(());
        }
        let credentials = self
            .credentials_source
            .iter()
            .filter(|source| source.grant_type == self.grant_type)
            .flat_map(|source| source.credentials.iter())
            .find(|credentials| credentials.name == name)
            .cloned()
            .ok_or_else(|| AuthMethodError::InvalidFieldValue {
                field: "credentialSource".to_string(),
                message: format!(
                    "no credentials named '{name}' for grant type '{}'",
                    self.grant_type
                ),
            })?;
        self.client_id = credentials.client_id;
        self.client_secret = credentials.client_secret.unwrap_or_default();
        self.credential_source = name.to_string();
        Ok(())
    }

    fn credential_options(&self) -> Vec<SelectOption> {
        let names: Vec<&str> = self
            .credentials_source
            .iter()
            .filter(|source| source.grant_type == self.grant_type)
            .flat_map(|source| source.credentials.iter())
            .map(|credentials| credentials.name.as_str())
            .collect();
        if names.is_empty() {
            return Vec::new();
        }
        std::iter::once(SelectOption::new("", "Custom"))
            .chain(names.into_iter().map(|name| SelectOption::new(name, name)))
            .collect()
    }

    fn grant_type_options(&self) -> Vec<SelectOption> {
        let mut options: Vec<SelectOption> = self
            .grant_types
            .iter()
            .map(|grant| SelectOption::new(&grant.grant_type, &grant.label))
            .collect();
        if !self.grant_type.is_empty()
            && !self
                .grant_types
                .iter()
                .any(|grant| grant.grant_type == self.grant_type)
        {
            options.push(SelectOption::new(&self.grant_type, &self.grant_type));
        }
        options
    }

    /// Text of a copyable label, when that label is rendered.
    pub fn clipboard_content(&self, target: CopyTarget, base_uri: Option<&str>) -> Option<String> {
        match target {
            CopyTarget::RedirectUri if self.redirect_rendered() && !self.redirect_uri.is_empty() => {
                Some(read_url_value(&self.redirect_uri, base_uri))
            }
            CopyTarget::AccessToken if !self.access_token.is_empty() => {
                Some(self.access_token.clone())
            }
            _ => None,
        }
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    pub(crate) fn settings(&self, base_uri: Option<&str>) -> OAuth2Authorization {
        let delivery_method = if self.cc_delivery_rendered() {
            &self.cc_delivery_method
        } else {
            &self.oauth_delivery_method
        };
        OAuth2Authorization {
            grant_type: self.grant_type.clone(),
            client_id: self.client_id.clone(),
            client_secret: self
                .client_secret_rendered()
                .then(|| self.client_secret.clone()),
            authorization_uri: self
                .authorization_uri_rendered()
                .then(|| read_url_value(&self.authorization_uri, base_uri)),
            access_token_uri: self
                .access_token_uri_rendered()
                .then(|| read_url_value(&self.access_token_uri, base_uri)),
            redirect_uri: self
                .redirect_rendered()
                .then(|| read_url_value(&self.redirect_uri, base_uri)),
            username: self.password_rendered().then(|| self.username.clone()),
            password: self.password_rendered().then(|| self.password.clone()),
            scopes: self.scopes.clone(),
            access_token: self.access_token.clone(),
            token_type: self.token_type.clone(),
            delivery_method: delivery_method.clone(),
            delivery_name: self.oauth_delivery_name.clone(),
            pkce: (self.grant_type == GRANT_AUTHORIZATION_CODE).then_some(self.pkce),
        }
    }

    // -----------------------------------------------------------------------
    // Authorization
    // -----------------------------------------------------------------------

    /// Starts a token request.
    ///
    /// Returns `None` without touching the state when the form is invalid.
    /// Otherwise clears the last error, marks the form as authorizing and
    /// returns the request to hand to the authorizer.
    pub fn begin_authorize(&mut self, base_uri: Option<&str>) -> Option<PendingAuthorization> {
        if !self.validate(base_uri) {
            tracing::debug!(grant_type = %self.grant_type, "OAuth 2 form is invalid, not authorizing");
            return None;
        }
        self.last_error_message = None;
        self.authorizing = true;
        let request = OAuth2AuthorizeRequest {
            settings: self.settings(base_uri),
            state: generate_state(),
        };
        tracing::info!(grant_type = %self.grant_type, "Requesting OAuth 2 token");
        Some(PendingAuthorization { request })
    }

    /// Applies the authorizer's answer to a pending request.
    ///
    /// # Errors
    ///
    /// When the authorizer failed, its message (or `"Unknown error"`) is
    /// stored in `last_error_message` and the error is returned as
    /// [`AuthMethodError::Authorization`].
    pub fn complete_authorize(
        &mut self,
        pending: &PendingAuthorization,
        result: Result<TokenInfo>,
    ) -> Result<AuthorizationOutcome> {
        self.authorizing = false;
        let token = match result {
            Ok(token) => token,
            Err(err) => {
                let message = failure_message(&err);
                tracing::warn!(error = %message, "OAuth 2 authorization failed");
                self.last_error_message = Some(message.clone());
                return Err(AuthMethodError::Authorization(message).into());
            }
        };

        if token.state.as_deref() != Some(pending.state()) {
            tracing::debug!("Ignoring OAuth 2 token response with a different state");
            return Ok(AuthorizationOutcome::Ignored);
        }
        if !self.access_token.is_empty() {
            tracing::debug!("Ignoring OAuth 2 token response, token already set");
            return Ok(AuthorizationOutcome::Ignored);
        }

        self.access_token = token.access_token.clone();
        self.token_type = token
            .token_type
            .clone()
            .filter(|token_type| !token_type.is_empty())
            .unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string());
        self.token_expires_at = token.expires_at(Utc::now());
        tracing::info!(token_type = %self.token_type, "OAuth 2 token received");
        Ok(AuthorizationOutcome::Resolved(token))
    }
}

#[derive(Debug, Clone, Serialize)]
struct SelectOption {
    value: String,
    label: String,
}

impl SelectOption {
    fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

impl SchemeForm for OAuth2State {
    fn method_type(&self) -> MethodType {
        MethodType::OAuth2
    }

    fn template(&self) -> &'static str {
        "oauth2.html"
    }

    fn control_kind(&self, field: &str) -> Option<ControlKind> {
        match field {
            "clientId" | "clientSecret" | "authorizationUri" | "accessTokenUri" | "username"
            | "password" => Some(ControlKind::Text),
            "grantType" | "ccDeliveryMethod" | "credentialSource" => Some(ControlKind::Select),
            "pkce" => Some(ControlKind::Checkbox),
            "scopes" => Some(ControlKind::List),
            _ => None,
        }
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<()> {
        match field {
            "grantType" => self.grant_type = expect_text(field, value)?,
            "clientId" => self.client_id = expect_text(field, value)?,
            "clientSecret" => self.client_secret = expect_text(field, value)?,
            "authorizationUri" => self.authorization_uri = expect_text(field, value)?,
            "accessTokenUri" => self.access_token_uri = expect_text(field, value)?,
            "username" => self.username = expect_text(field, value)?,
            "password" => self.password = expect_text(field, value)?,
            "ccDeliveryMethod" => self.cc_delivery_method = expect_text(field, value)?,
            "credentialSource" => {
                let name = expect_text(field, value)?;
                self.select_credential_source(&name)?;
            }
            "pkce" => self.pkce = expect_flag(field, value)?,
            "scopes" => {
                let scopes = expect_list(field, value)?;
                self.set_scopes(scopes);
            }
            _ => {
                return Err(AuthMethodError::UnknownField {
                    method: MethodType::OAuth2.to_string(),
                    field: field.to_string(),
                }
                .into())
            }
        }
        Ok(())
    }

    fn serialize(&self, base_uri: Option<&str>) -> AuthorizationConfig {
        AuthorizationConfig::OAuth2(self.settings(base_uri))
    }

    fn restore(&mut self, settings: &Map<String, Value>) {
        restore_string(settings, "grantType", &mut self.grant_type);
        restore_string(settings, "clientId", &mut self.client_id);
        restore_string(settings, "clientSecret", &mut self.client_secret);
        restore_string(settings, "authorizationUri", &mut self.authorization_uri);
        restore_string(settings, "accessTokenUri", &mut self.access_token_uri);
        restore_string(settings, "redirectUri", &mut self.redirect_uri);
        restore_string(settings, "username", &mut self.username);
        restore_string(settings, "password", &mut self.password);
        restore_list(settings, "scopes", &mut self.scopes);
        restore_string(settings, "accessToken", &mut self.access_token);
        restore_string(settings, "tokenType", &mut self.token_type);
        restore_string(settings, "deliveryName", &mut self.oauth_delivery_name);
        restore_string(settings, "ccDeliveryMethod", &mut self.cc_delivery_method);
        restore_bool(settings, "pkce", &mut self.pkce);
        if self.cc_delivery_rendered() {
            restore_string(settings, "deliveryMethod", &mut self.cc_delivery_method);
        } else {
            restore_string(settings, "deliveryMethod", &mut self.oauth_delivery_method);
        }
    }

    fn validate(&self, base_uri: Option<&str>) -> bool {
        if self.client_id_required() && self.client_id.is_empty() {
            return false;
        }
        if self.client_secret_required() && self.client_secret.is_empty() {
            return false;
        }
        if self.authorization_uri_rendered() && !is_absolute_url(&self.authorization_uri, base_uri)
        {
            return false;
        }
        if self.access_token_uri_rendered() && !is_absolute_url(&self.access_token_uri, base_uri) {
            return false;
        }
        if self.password_rendered() && (self.username.is_empty() || self.password.is_empty()) {
            return false;
        }
        true
    }

    fn clear(&mut self) {
        self.client_id.clear();
        self.client_secret.clear();
        self.authorization_uri.clear();
        self.access_token_uri.clear();
        self.redirect_uri.clear();
        self.username.clear();
        self.password.clear();
        self.scopes.clear();
        self.access_token.clear();
        self.token_type.clear();
        self.token_expires_at = None;
        self.oauth_delivery_method.clear();
        self.oauth_delivery_name.clear();
        self.cc_delivery_method.clear();
        self.credential_source.clear();
        self.pkce = false;
        self.last_error_message = None;
    }

    fn render_context(&self, base_uri: Option<&str>) -> TemplateValue {
        context! {
            grant_type_rendered => !self.no_grant_type,
            grant_types => self.grant_type_options(),
            grant_type => &self.grant_type,
            credential_sources => self.credential_options(),
            credential_source => &self.credential_source,
            credentials_disabled => !self.credential_source.is_empty(),
            client_id => &self.client_id,
            client_id_required => self.client_id_required(),
            client_secret_rendered => self.client_secret_rendered(),
            client_secret_required => self.client_secret_required(),
            client_secret => &self.client_secret,
            password_rendered => self.password_rendered(),
            username => &self.username,
            password => &self.password,
            advanced => self.advanced,
            advanced_opened => self.advanced_opened,
            authorization_uri_rendered => self.authorization_uri_rendered(),
            authorization_uri => &self.authorization_uri,
            access_token_uri_rendered => self.access_token_uri_rendered(),
            access_token_uri => &self.access_token_uri,
            url_type => url_input_type(base_uri),
            scopes => &self.scopes,
            allowed_scopes => &self.allowed_scopes,
            pkce_rendered => self.pkce_rendered(),
            pkce => self.pkce,
            cc_delivery_rendered => self.cc_delivery_rendered(),
            cc_delivery_method => &self.cc_delivery_method,
            redirect_rendered => self.redirect_rendered(),
            redirect_uri => read_url_value(&self.redirect_uri, base_uri),
            access_token => &self.access_token,
            token_type => &self.token_type,
            token_expires_at => self.token_expires_at.map(|at| at.to_rfc3339()),
            authorizing => self.authorizing,
            last_error_message => &self.last_error_message,
        }
    }
}
