//! Field values, control semantics and helpers shared by all methods

use serde_json::{Map, Value};
use url::Url;

use crate::error::{AuthMethodError, Result};

/// A value delivered by a bound form control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Text inputs and select boxes
    Text(String),
    /// Multi-value controls (scopes)
    List(Vec<String>),
    /// Checkboxes
    Flag(bool),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

/// The DOM-level event a control reported.
///
/// Text inputs commit on every `Input`; selects, checkboxes and the scope
/// list commit on `Change`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    Input,
    Change,
}

/// How a bound control delivers its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Text,
    Select,
    Checkbox,
    List,
}

impl ControlKind {
    pub fn commits_on(self, event: ControlEvent) -> bool {
        match self {
            ControlKind::Text => event == ControlEvent::Input,
            ControlKind::Select | ControlKind::Checkbox | ControlKind::List => {
                event == ControlEvent::Change
            }
        }
    }
}

pub(crate) fn expect_text(field: &str, value: FieldValue) -> Result<String> {
    match value {
        FieldValue::Text(text) => Ok(text),
        _ => Err(AuthMethodError::InvalidFieldValue {
            field: field.to_string(),
            message: "expected a text value".to_string(),
        }
        .into()),
    }
}

pub(crate) fn expect_list(field: &str, value: FieldValue) -> Result<Vec<String>> {
    match value {
        FieldValue::List(items) => Ok(items),
        _ => Err(AuthMethodError::InvalidFieldValue {
            field: field.to_string(),
            message: "expected a list of values".to_string(),
        }
        .into()),
    }
}

pub(crate) fn expect_flag(field: &str, value: FieldValue) -> Result<bool> {
    match value {
        FieldValue::Flag(flag) => Ok(flag),
        _ => Err(AuthMethodError::InvalidFieldValue {
            field: field.to_string(),
            message: "expected a boolean value".to_string(),
        }
        .into()),
    }
}

// ---------------------------------------------------------------------------
// Restore helpers
// ---------------------------------------------------------------------------
//
// Each helper assigns the key only when it is present with the expected JSON
// type. Anything else leaves the target untouched.

pub(crate) fn restore_string(settings: &Map<String, Value>, key: &str, target: &mut String) {
    if let Some(Value::String(value)) = settings.get(key) {
        target.clone_from(value);
    }
}

pub(crate) fn restore_list(settings: &Map<String, Value>, key: &str, target: &mut Vec<String>) {
    if let Some(Value::Array(items)) = settings.get(key) {
        *target = items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect();
    }
}

pub(crate) fn restore_bool(settings: &Map<String, Value>, key: &str, target: &mut bool) {
    if let Some(Value::Bool(value)) = settings.get(key) {
        *target = *value;
    }
}

// ---------------------------------------------------------------------------
// URL handling
// ---------------------------------------------------------------------------

/// Applies the base URI to a relative path.
///
/// When `base_uri` is set and `url` starts with `/`, returns the base URI
/// without its trailing slash followed by `url`. Otherwise `url` is returned
/// unchanged.
///
/// # Examples
///
/// ```
/// use authorization_method::method::fields::read_url_value;
///
/// let base = Some("https://api.domain.com/auth/");
/// assert_eq!(
///     read_url_value("/authorize", base),
///     "https://api.domain.com/auth/authorize"
/// );
/// assert_eq!(read_url_value("https://other.com/x", base), "https://other.com/x");
/// assert_eq!(read_url_value("/authorize", None), "/authorize");
/// ```
pub fn read_url_value(url: &str, base_uri: Option<&str>) -> String {
    match base_uri {
        Some(base) if !base.is_empty() && url.starts_with('/') => {
            let base = base.strip_suffix('/').unwrap_or(base);
            format!("{base}{url}")
        }
        _ => url.to_string(),
    }
}

/// Whether `value` resolves to an absolute URL.
pub(crate) fn is_absolute_url(value: &str, base_uri: Option<&str>) -> bool {
    Url::parse(&read_url_value(value, base_uri)).is_ok()
}

/// Input type for URL controls.
///
/// With a base URI the control must accept relative paths, so it renders as a
/// plain text input instead of a URL input.
pub(crate) fn url_input_type(base_uri: Option<&str>) -> &'static str {
    match base_uri {
        Some(base) if !base.is_empty() => "text",
        _ => "url",
    }
}
