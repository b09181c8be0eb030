//! authorization-method - HTTP authorization method editor
//!
#![doc = "authorization-method - HTTP authorization method editor"]
#![doc = "Main entry point for the demo command-line interface."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use authorization_method::cli::{Cli, Commands};
use authorization_method::commands;
use authorization_method::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose, cli.log_json);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    let success = match cli.command {
        Commands::Types => {
            commands::types::list_types();
            true
        }
        Commands::Render { method, settings } => {
            tracing::debug!("Rendering {} form", method);
            commands::form::render_form(&config, method, settings.as_deref())?;
            true
        }
        Commands::Serialize { method, settings } => {
            tracing::debug!("Serializing {} settings", method);
            commands::form::serialize_settings(&config, method, &settings)?;
            true
        }
        Commands::Validate { method, settings } => {
            tracing::debug!("Validating {} settings", method);
            commands::form::validate_settings(&config, method, &settings)?
        }
        Commands::Authorize { method, settings } => {
            tracing::info!("Starting authorization for method: {}", method);
            commands::authorize::run_authorize(&config, method, &settings).await?
        }
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so command output on stdout stays machine readable.
/// `json` switches to one JSON object per event.
fn init_tracing(verbose: bool, json: bool) {
    let default_filter = if verbose {
        "authorization_method=debug"
    } else {
        "authorization_method=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
