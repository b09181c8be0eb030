//! Command-line interface definition for the authorization method demo
//!
//! This module defines the CLI structure using clap's derive API. Every
//! command builds an authorization method editor from a settings file and
//! prints what the editor produces.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::settings::MethodType;

/// authorization-method - HTTP authorization method editor
///
/// Renders, serializes, validates and authorizes Basic, Bearer, NTLM,
/// Digest, OAuth 1 and OAuth 2 settings.
#[derive(Parser, Debug, Clone)]
#[command(name = "authorization-method")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Write logs as JSON lines
    #[arg(long, env = "AUTHORIZATION_METHOD_LOG_JSON")]
    pub log_json: bool,

    /// Base URI applied to relative OAuth URLs (overrides config)
    #[arg(long, global = true)]
    pub base_uri: Option<String>,

    /// Render outlined controls
    #[arg(long, global = true)]
    pub outlined: bool,

    /// Render controls in compatibility style
    #[arg(long, global = true)]
    pub compatibility: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List authorization method types and OAuth 2 grant types
    Types,

    /// Print the form markup of a method
    Render {
        /// Method type (basic, bearer, ntlm, digest, "oauth 1", "oauth 2")
        #[arg(short = 't', long = "type", value_parser = parse_method_type)]
        method: MethodType,

        /// JSON settings file restored before rendering
        #[arg(short, long)]
        settings: Option<PathBuf>,
    },

    /// Restore settings and print the serialized result as JSON
    Serialize {
        /// Method type (basic, bearer, ntlm, digest, "oauth 1", "oauth 2")
        #[arg(short = 't', long = "type", value_parser = parse_method_type)]
        method: MethodType,

        /// JSON settings file
        #[arg(short, long)]
        settings: PathBuf,
    },

    /// Restore settings and report whether they are valid
    Validate {
        /// Method type (basic, bearer, ntlm, digest, "oauth 1", "oauth 2")
        #[arg(short = 't', long = "type", value_parser = parse_method_type)]
        method: MethodType,

        /// JSON settings file
        #[arg(short, long)]
        settings: PathBuf,
    },

    /// Request a token from the demo authorizer and print the result
    Authorize {
        /// Method type ("oauth 1" or "oauth 2")
        #[arg(short = 't', long = "type", value_parser = parse_method_type)]
        method: MethodType,

        /// JSON settings file
        #[arg(short, long)]
        settings: PathBuf,
    },
}

fn parse_method_type(value: &str) -> std::result::Result<MethodType, String> {
    value.parse().map_err(|e: anyhow::Error| e.to_string())
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            log_json: false,
            base_uri: None,
            outlined: false,
            compatibility: false,
            command: Commands::Types,
        }
    }
}
