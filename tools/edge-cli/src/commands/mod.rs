//! CLI command implementations.

pub mod config;
pub mod explain;

use clap::{Args, Subcommand};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the resolved site configuration (secrets redacted).
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the site configuration.
    Validate,
}

/// Arguments for the explain command.
#[derive(Args)]
pub struct ExplainArgs {
    /// Request path and query, e.g. `/about?x=1`.
    pub path: String,

    /// HTTP method.
    #[arg(short, long, default_value = "GET")]
    pub method: String,

    /// Variant assignment the decision service should answer with,
    /// e.g. `hero=2,banner=0`.
    #[arg(long)]
    pub variants: Option<String>,

    /// Extra request header as `name: value`.
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,
}
