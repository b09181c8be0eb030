//! Token request against the demo authorizer

use std::path::Path;

use colored::Colorize;

use crate::authorizer::demo::DemoAuthorizer;
use crate::commands::load_method;
use crate::config::Config;
use crate::error::Result;
use crate::method::AuthorizedToken;
use crate::settings::MethodType;

/// Request a token for `method` and print the resulting settings
///
/// Returns `false` when the settings are not valid and no request was made.
///
/// # Errors
///
/// Returns an error if the settings file cannot be read, the method does not
/// support authorization, or the authorizer fails.
///
/// # Examples
///
/// ```no_run
/// use authorization_method::commands::authorize::run_authorize;
/// use authorization_method::config::Config;
/// use authorization_method::settings::MethodType;
/// use std::path::Path;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::default();
/// run_authorize(&config, MethodType::OAuth2, Path::new("oauth2.json")).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_authorize(config: &Config, method: MethodType, settings: &Path) -> Result<bool> {
    let mut editor = load_method(config, method, Some(settings))?;
    let authorizer = DemoAuthorizer::new(&config.demo);
    tracing::info!(
        "Authorizing {} with demo authorizer ({} ms delay)",
        method,
        authorizer.delay().as_millis()
    );

    let token = match editor.authorize(&authorizer).await {
        Ok(token) => token,
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            return Err(e);
        }
    };

    match token {
        Some(AuthorizedToken::OAuth2(info)) => {
            println!("{} access token received", "✓".green());
            if let Some(expires_in) = info.expires_in {
                println!("  expires in {}s", expires_in);
            }
        }
        Some(AuthorizedToken::OAuth1(_)) => {
            println!("{} token pair received", "✓".green());
        }
        None => {
            println!(
                "{} {} settings are not valid, nothing to authorize",
                "✗".red(),
                method.label()
            );
            return Ok(false);
        }
    }

    println!("{}", serde_json::to_string_pretty(&editor.serialize())?);
    Ok(true)
}
