//! Authorization method editor
//!
//! [`AuthorizationMethod`] holds the state of one authorization form. The
//! active scheme is a [`SchemeState`] variant; switching the method type
//! replaces the variant and starts from that scheme's defaults.
//!
//! # Module Layout
//!
//! - [`fields`] -- field values, control semantics and URL helpers
//! - [`credentials`] -- Basic, Bearer and NTLM
//! - [`digest`] -- HTTP Digest
//! - [`oauth1`] -- OAuth 1
//! - [`oauth2`] -- OAuth 2 with its grant types and token request flow

pub mod credentials;
pub mod digest;
pub mod fields;
pub mod oauth1;
pub mod oauth2;

use serde_json::{Map, Value};

use crate::authorizer::{generate_state, Authorizer};
use crate::error::{AuthMethodError, Result};
use crate::events::{ChangeEvent, ChangeNotifier};
use crate::render::{FormRenderer, UiFlags};
use crate::settings::{AuthorizationConfig, MethodType, OAuth1Token, TokenInfo};

pub use credentials::{BasicState, BearerState, NtlmState};
pub use digest::DigestState;
pub use fields::{ControlEvent, ControlKind, FieldValue};
pub use oauth1::OAuth1State;
pub use oauth2::{AuthorizationOutcome, CopyTarget, OAuth2State, PendingAuthorization};

/// Behavior shared by every scheme form.
pub trait SchemeForm {
    fn method_type(&self) -> MethodType;

    /// Name of the template rendering this form.
    fn template(&self) -> &'static str;

    /// How the control bound to `field` delivers its value, or `None` when
    /// the form has no such control.
    fn control_kind(&self, field: &str) -> Option<ControlKind>;

    /// Stores a committed control value.
    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<()>;

    /// Settings of the visible fields with URLs resolved against `base_uri`.
    fn serialize(&self, base_uri: Option<&str>) -> AuthorizationConfig;

    /// Copies recognized keys of the right type from `settings`. Other keys
    /// are ignored and fields without a key keep their value.
    fn restore(&mut self, settings: &Map<String, Value>);

    fn validate(&self, base_uri: Option<&str>) -> bool;

    /// Empties every value field.
    fn clear(&mut self);

    /// Values exposed to the form template as `form`.
    fn render_context(&self, base_uri: Option<&str>) -> minijinja::Value;
}

/// State of the active scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemeState {
    Basic(BasicState),
    Bearer(BearerState),
    Ntlm(NtlmState),
    Digest(DigestState),
    OAuth1(OAuth1State),
    OAuth2(OAuth2State),
}

impl SchemeState {
    /// Creates the scheme's state with its defaults.
    pub fn new(method: MethodType) -> Self {
        match method {
            MethodType::Basic => SchemeState::Basic(BasicState::default()),
            MethodType::Bearer => SchemeState::Bearer(BearerState::default()),
            MethodType::Ntlm => SchemeState::Ntlm(NtlmState::default()),
            MethodType::Digest => SchemeState::Digest(DigestState::new()),
            MethodType::OAuth1 => SchemeState::OAuth1(OAuth1State::new()),
            MethodType::OAuth2 => SchemeState::OAuth2(OAuth2State::new()),
        }
    }

    pub fn method_type(&self) -> MethodType {
        self.form().method_type()
    }

    fn form(&self) -> &dyn SchemeForm {
        match self {
            SchemeState::Basic(state) => state,
            SchemeState::Bearer(state) => state,
            SchemeState::Ntlm(state) => state,
            SchemeState::Digest(state) => state,
            SchemeState::OAuth1(state) => state,
            SchemeState::OAuth2(state) => state,
        }
    }

    fn form_mut(&mut self) -> &mut dyn SchemeForm {
        match self {
            SchemeState::Basic(state) => state,
            SchemeState::Bearer(state) => state,
            SchemeState::Ntlm(state) => state,
            SchemeState::Digest(state) => state,
            SchemeState::OAuth1(state) => state,
            SchemeState::OAuth2(state) => state,
        }
    }
}

/// A token obtained by [`AuthorizationMethod::authorize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizedToken {
    OAuth1(OAuth1Token),
    OAuth2(TokenInfo),
}

macro_rules! scheme_accessors {
    ($($variant:ident => $state:ty, $get:ident, $get_mut:ident;)*) => {
        $(
            pub fn $get(&self) -> Option<&$state> {
                match &self.state {
                    SchemeState::$variant(state) => Some(state),
                    _ => None,
                }
            }

            pub fn $get_mut(&mut self) -> Option<&mut $state> {
                match &mut self.state {
                    SchemeState::$variant(state) => Some(state),
                    _ => None,
                }
            }
        )*
    };
}

/// An authorization method editor.
///
/// Holds the active scheme's form state, the base URI relative URLs are
/// resolved against, the UI flags and the change notifier.
///
/// Programmatic changes (constructors, [`restore`](Self::restore),
/// [`clear`](Self::clear), direct state access) never raise change events.
/// Committed user edits through [`handle_input`](Self::handle_input) and
/// accepted token responses raise exactly one each.
///
/// # Examples
///
/// ```
/// use authorization_method::method::{AuthorizationMethod, ControlEvent};
/// use authorization_method::settings::MethodType;
///
/// let mut method = AuthorizationMethod::new(MethodType::Bearer);
/// assert!(!method.validate());
///
/// let committed = method
///     .handle_input("token", "secret-token", ControlEvent::Input)
///     .unwrap();
/// assert!(committed);
/// assert!(method.validate());
///
/// let settings = method.serialize().to_value().unwrap();
/// assert_eq!(settings["token"], "secret-token");
/// ```
///
/// A clone copies the form but gets its own notifier; subscribers of the
/// original do not see edits made on the clone.
#[derive(Debug)]
pub struct AuthorizationMethod {
    state: SchemeState,
    base_uri: Option<String>,
    ui: UiFlags,
    notifier: ChangeNotifier,
}

impl Clone for AuthorizationMethod {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            base_uri: self.base_uri.clone(),
            ui: self.ui,
            notifier: ChangeNotifier::new(),
        }
    }
}

impl AuthorizationMethod {
    /// Creates an editor for `method` with that scheme's defaults.
    pub fn new(method: MethodType) -> Self {
        Self::from_state(SchemeState::new(method))
    }

    /// Creates an editor for `method` and restores `settings` into it.
    ///
    /// OAuth 2 advanced fields are hidden when the restored settings fill
    /// all of them.
    pub fn with_settings(method: MethodType, settings: &Value) -> Self {
        let mut state = SchemeState::new(method);
        restore_into(&mut state, settings);
        Self::from_state(state)
    }

    /// Wraps an existing scheme state.
    pub fn from_state(mut state: SchemeState) -> Self {
        initialize(&mut state);
        Self {
            state,
            base_uri: None,
            ui: UiFlags::default(),
            notifier: ChangeNotifier::new(),
        }
    }

    pub fn method_type(&self) -> MethodType {
        self.state.method_type()
    }

    /// Switches to another scheme, discarding the current form state.
    ///
    /// Selecting the active type keeps the state.
    pub fn set_method_type(&mut self, method: MethodType) {
        if self.method_type() == method {
            return;
        }
        tracing::debug!(from = %self.method_type(), to = %method, "Switching authorization method");
        let mut state = SchemeState::new(method);
        initialize(&mut state);
        self.state = state;
    }

    pub fn state(&self) -> &SchemeState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SchemeState {
        &mut self.state
    }

    scheme_accessors! {
        Basic => BasicState, as_basic, as_basic_mut;
        Bearer => BearerState, as_bearer, as_bearer_mut;
        Ntlm => NtlmState, as_ntlm, as_ntlm_mut;
        Digest => DigestState, as_digest, as_digest_mut;
        OAuth1 => OAuth1State, as_oauth1, as_oauth1_mut;
        OAuth2 => OAuth2State, as_oauth2, as_oauth2_mut;
    }

    pub fn base_uri(&self) -> Option<&str> {
        self.base_uri.as_deref()
    }

    /// Sets the URI that relative URLs starting with `/` are resolved
    /// against. An empty string behaves like no base URI.
    pub fn set_base_uri(&mut self, base_uri: Option<String>) {
        self.base_uri = base_uri.filter(|base| !base.is_empty());
    }

    pub fn ui_flags(&self) -> UiFlags {
        self.ui
    }

    pub fn set_ui_flags(&mut self, ui: UiFlags) {
        self.ui = ui;
    }

    /// Subscribes to change events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<ChangeEvent> {
        self.notifier.subscribe()
    }

    // -----------------------------------------------------------------------
    // Core operations
    // -----------------------------------------------------------------------

    /// Returns the settings of the visible fields.
    ///
    /// Relative URLs are resolved against the base URI in the output only;
    /// the stored values are left unchanged.
    pub fn serialize(&self) -> AuthorizationConfig {
        self.state.form().serialize(self.base_uri())
    }

    /// Restores previously serialized settings.
    ///
    /// Only keys the active scheme knows, with values of the expected type,
    /// are applied. Anything that is not a JSON object is ignored.
    pub fn restore(&mut self, settings: &Value) {
        restore_into(&mut self.state, settings);
    }

    /// Whether the form is complete enough to authorize a request.
    pub fn validate(&self) -> bool {
        let valid = self.state.form().validate(self.base_uri());
        tracing::debug!(method = %self.method_type(), valid, "Validated authorization method");
        valid
    }

    /// Empties every value field. The method type and the OAuth 2 grant type
    /// are kept.
    pub fn clear(&mut self) {
        self.state.form_mut().clear();
    }

    /// Renders the form markup.
    ///
    /// # Errors
    ///
    /// Returns [`AuthMethodError::Render`] when rendering fails.
    pub fn render(&self, renderer: &FormRenderer) -> Result<String> {
        let form = self.state.form();
        renderer.render(form.template(), &self.ui, form.render_context(self.base_uri()))
    }

    /// Applies a control event to the field it is bound to.
    ///
    /// Text controls commit on [`ControlEvent::Input`]; selects, checkboxes
    /// and lists commit on [`ControlEvent::Change`]. Events that do not
    /// commit are dropped. Returns whether the value was committed; each
    /// commit raises one change event.
    ///
    /// # Errors
    ///
    /// Returns [`AuthMethodError::UnknownField`] if the active form has no
    /// such control, and [`AuthMethodError::InvalidFieldValue`] if the value
    /// does not fit it.
    pub fn handle_input(
        &mut self,
        field: &str,
        value: impl Into<FieldValue>,
        event: ControlEvent,
    ) -> Result<bool> {
        let method = self.method_type();
        let form = self.state.form_mut();
        let Some(kind) = form.control_kind(field) else {
            return Err(AuthMethodError::UnknownField {
                method: method.to_string(),
                field: field.to_string(),
            }
            .into());
        };
        if !kind.commits_on(event) {
            tracing::trace!(field, ?event, "Control event does not commit");
            return Ok(false);
        }
        form.set_field(field, value.into())?;
        tracing::trace!(%method, field, "Field committed");
        self.notifier.notify();
        Ok(true)
    }

    /// Generates an opaque OAuth 2 `state` value.
    pub fn generate_state(&self) -> String {
        generate_state()
    }

    /// Text of a copyable OAuth 2 label.
    ///
    /// Returns `None` for other schemes or when the label is not rendered.
    pub fn clipboard_content(&self, target: CopyTarget) -> Option<String> {
        self.as_oauth2()?
            .clipboard_content(target, self.base_uri())
    }

    // -----------------------------------------------------------------------
    // Authorization
    // -----------------------------------------------------------------------

    /// Starts an OAuth 2 token request. See [`OAuth2State::begin_authorize`].
    ///
    /// # Errors
    ///
    /// Returns [`AuthMethodError::AuthorizationNotSupported`] for schemes
    /// other than OAuth 2.
    pub fn begin_authorize(&mut self) -> Result<Option<PendingAuthorization>> {
        let base_uri = self.base_uri.as_deref();
        match &mut self.state {
            SchemeState::OAuth2(state) => Ok(state.begin_authorize(base_uri)),
            other => {
                Err(AuthMethodError::AuthorizationNotSupported(other.method_type().to_string())
                    .into())
            }
        }
    }

    /// Applies the authorizer's answer to a pending OAuth 2 request.
    ///
    /// Returns the token when it was stored, raising one change event, or
    /// `None` when the answer was ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AuthMethodError::AuthorizationNotSupported`] for schemes
    /// other than OAuth 2, and [`AuthMethodError::Authorization`] when the
    /// authorizer failed.
    pub fn complete_authorize(
        &mut self,
        pending: &PendingAuthorization,
        result: Result<TokenInfo>,
    ) -> Result<Option<TokenInfo>> {
        let method = self.method_type();
        let SchemeState::OAuth2(state) = &mut self.state else {
            return Err(AuthMethodError::AuthorizationNotSupported(method.to_string()).into());
        };
        match state.complete_authorize(pending, result)? {
            AuthorizationOutcome::Resolved(token) => {
                self.notifier.notify();
                Ok(Some(token))
            }
            AuthorizationOutcome::Ignored => Ok(None),
        }
    }

    /// Requests a token through `authorizer` and stores it.
    ///
    /// Supported for OAuth 1 and OAuth 2. Returns `Ok(None)` without calling
    /// the authorizer when the form is invalid, and also when an OAuth 2
    /// answer is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AuthMethodError::AuthorizationNotSupported`] for other
    /// schemes, and [`AuthMethodError::Authorization`] when the authorizer
    /// failed. The failure message is also kept as the form's last error.
    ///
    /// # Examples
    ///
    /// ```
    /// use authorization_method::authorizer::demo::DemoAuthorizer;
    /// use authorization_method::config::DemoConfig;
    /// use authorization_method::{AuthorizationMethod, MethodType};
    /// use serde_json::json;
    ///
    /// # tokio_test::block_on(async {
    /// let mut method = AuthorizationMethod::with_settings(
    ///     MethodType::OAuth2,
    ///     &json!({
    ///         "grantType": "implicit",
    ///         "clientId": "client",
    ///         "authorizationUri": "https://auth.domain.com/authorize",
    ///     }),
    /// );
    /// let authorizer = DemoAuthorizer::new(&DemoConfig {
    ///     token_delay_ms: 0,
    ///     ..DemoConfig::default()
    /// });
    ///
    /// method.authorize(&authorizer).await.unwrap();
    /// assert_eq!(method.as_oauth2().unwrap().access_token, "demo-access-token");
    /// # });
    /// ```
    pub async fn authorize(&mut self, authorizer: &dyn Authorizer) -> Result<Option<AuthorizedToken>> {
        if let SchemeState::OAuth1(state) = &mut self.state {
            let Some(request) = state.begin_authorize(self.base_uri.as_deref()) else {
                return Ok(None);
            };
            let result = authorizer.request_oauth1_token(request).await;
            let token = state.complete_authorize(result)?;
            self.notifier.notify();
            return Ok(Some(AuthorizedToken::OAuth1(token)));
        }

        let Some(pending) = self.begin_authorize()? else {
            return Ok(None);
        };
        let result = authorizer
            .request_oauth2_token(pending.request().clone())
            .await;
        Ok(self
            .complete_authorize(&pending, result)?
            .map(AuthorizedToken::OAuth2))
    }
}

const UNKNOWN_ERROR: &str = "Unknown error";

/// Message recorded for a failed token request.
pub(crate) fn failure_message(err: &anyhow::Error) -> String {
    let message = err.to_string();
    if message.is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        message
    }
}

fn initialize(state: &mut SchemeState) {
    if let SchemeState::OAuth2(oauth2) = state {
        oauth2.set_defaults();
        oauth2.auto_hide();
    }
}

fn restore_into(state: &mut SchemeState, settings: &Value) {
    match settings.as_object() {
        Some(map) => state.form_mut().restore(map),
        None => tracing::debug!("Ignoring settings that are not an object"),
    }
}
