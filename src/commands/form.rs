//! Render, serialize and validate handlers

use std::path::Path;

use colored::Colorize;

use crate::commands::load_method;
use crate::config::Config;
use crate::error::Result;
use crate::render::FormRenderer;
use crate::settings::MethodType;

/// Print the form markup of `method`
///
/// # Errors
///
/// Returns an error if the settings file cannot be read or rendering fails.
pub fn render_form(config: &Config, method: MethodType, settings: Option<&Path>) -> Result<()> {
    let editor = load_method(config, method, settings)?;
    let renderer = FormRenderer::new()?;
    println!("{}", editor.render(&renderer)?);
    Ok(())
}

/// Print the serialized settings of `method` as pretty JSON
///
/// # Errors
///
/// Returns an error if the settings file cannot be read.
pub fn serialize_settings(config: &Config, method: MethodType, settings: &Path) -> Result<()> {
    let editor = load_method(config, method, Some(settings))?;
    let serialized = serde_json::to_string_pretty(&editor.serialize())?;
    println!("{}", serialized);
    Ok(())
}

/// Report whether the settings of `method` are valid
///
/// Returns the validation result so the caller can set the exit status.
///
/// # Errors
///
/// Returns an error if the settings file cannot be read.
pub fn validate_settings(config: &Config, method: MethodType, settings: &Path) -> Result<bool> {
    let editor = load_method(config, method, Some(settings))?;
    let valid = editor.validate();
    if valid {
        println!("{} {} settings are valid", "✓".green(), method.label());
    } else {
        println!("{} {} settings are not valid", "✗".red(), method.label());
    }
    Ok(valid)
}
