//! Form markup rendering
//!
//! Each authorization method renders through one template in `templates/`.
//! Templates are embedded at compile time and rendered with HTML
//! autoescaping. Every control carries a `name` attribute equal to the field
//! it is bound to, so a host can route control events back through
//! [`AuthorizationMethod::handle_input`].
//!
//! [`AuthorizationMethod::handle_input`]: crate::method::AuthorizationMethod::handle_input

use minijinja::{context, Environment, Value};
use serde::{Deserialize, Serialize};

use crate::error::{AuthMethodError, Result};

/// Embedded templates, keyed by the name used to render them.
const TEMPLATES: &[(&str, &str)] = &[
    ("_macros.html", include_str!("../../templates/_macros.html")),
    ("basic.html", include_str!("../../templates/basic.html")),
    ("bearer.html", include_str!("../../templates/bearer.html")),
    ("ntlm.html", include_str!("../../templates/ntlm.html")),
    ("digest.html", include_str!("../../templates/digest.html")),
    ("oauth1.html", include_str!("../../templates/oauth1.html")),
    ("oauth2.html", include_str!("../../templates/oauth2.html")),
];

/// Visual modes applied to every control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiFlags {
    /// Render controls in the compatibility (Anypoint) style
    #[serde(default)]
    pub compatibility: bool,
    /// Render outlined controls
    #[serde(default)]
    pub outlined: bool,
}

/// Renders authorization forms from the embedded templates.
///
/// # Examples
///
/// ```
/// use authorization_method::method::AuthorizationMethod;
/// use authorization_method::render::FormRenderer;
/// use authorization_method::settings::MethodType;
///
/// let renderer = FormRenderer::new().unwrap();
/// let method = AuthorizationMethod::new(MethodType::Bearer);
/// let markup = method.render(&renderer).unwrap();
/// assert!(markup.contains(r#"name="token""#));
/// ```
pub struct FormRenderer {
    env: Environment<'static>,
}

impl FormRenderer {
    /// Creates a renderer with all method templates loaded.
    ///
    /// # Errors
    ///
    /// Returns [`AuthMethodError::Render`] if a template fails to parse.
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)
                .map_err(AuthMethodError::Render)?;
        }
        Ok(Self { env })
    }

    /// Renders `template` with the UI flags and the method's form context.
    ///
    /// # Errors
    ///
    /// Returns [`AuthMethodError::Render`] if the template is unknown or
    /// rendering fails.
    pub fn render(&self, template: &str, ui: &UiFlags, form: Value) -> Result<String> {
        let tmpl = self
            .env
            .get_template(template)
            .map_err(AuthMethodError::Render)?;
        let markup = tmpl
            .render(context! { ui => ui, form => form })
            .map_err(AuthMethodError::Render)?;
        tracing::trace!(template, bytes = markup.len(), "Rendered form");
        Ok(markup)
    }
}

impl std::fmt::Debug for FormRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormRenderer")
            .field("templates", &TEMPLATES.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renderer_loads_all_templates() {
        let renderer = FormRenderer::new().unwrap();
        for (name, _) in TEMPLATES {
            assert!(renderer.env.get_template(name).is_ok(), "missing {name}");
        }
    }

    #[test]
    fn test_render_unknown_template_is_error() {
        let renderer = FormRenderer::new().unwrap();
        let result = renderer.render("kerberos.html", &UiFlags::default(), Value::from(()));
        assert!(result.is_err());
    }

    #[test]
    fn test_render_escapes_values() {
        let renderer = FormRenderer::new().unwrap();
        let form = context! { token => "\"><script>" };
        let markup = renderer
            .render("bearer.html", &UiFlags::default(), form)
            .unwrap();
        assert!(!markup.contains("<script>"));
        assert!(markup.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_render_applies_ui_flags() {
        let renderer = FormRenderer::new().unwrap();
        let ui = UiFlags {
            compatibility: true,
            outlined: true,
        };
        let markup = renderer
            .render("bearer.html", &ui, context! { token => "" })
            .unwrap();
        assert!(markup.contains("auth-input outlined compatibility"));
    }
}
