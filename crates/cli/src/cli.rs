//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Content Mixer - slot-based content aggregation over several providers
#[derive(Parser, Debug)]
#[command(
    name = "content-mixer",
    author,
    version,
    about = "Slot-based content aggregation service",
    long_about = "Serves content mixed from several providers.\n\n\
                  A repeating slot template decides which provider fills each \n\
                  position; failed slots fall back to a second provider, and \n\
                  every request runs under a single deadline."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "CONTENT_MIXER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "CONTENT_MIXER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", global = true, env = "CONTENT_MIXER_METRICS_PORT")]
    pub metrics_port: u16,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve content over HTTP
    Serve(ServeArgs),

    /// Validate configuration file without serving
    Validate(ValidateArgs),

    /// Run content requests in-process and print the results
    Fetch(FetchArgs),
}

/// Arguments for the `serve` command
#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    /// Path to configuration file (TOML or JSON); built-in default when omitted
    #[arg(short, long, env = "CONTENT_MIXER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the listen address from configuration
    #[arg(long, env = "CONTENT_MIXER_ADDR")]
    pub addr: Option<String>,

    /// Override the request timeout from configuration
    #[arg(long, env = "CONTENT_MIXER_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml", env = "CONTENT_MIXER_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `fetch` command
#[derive(Parser, Debug, Clone)]
pub struct FetchArgs {
    /// Path to configuration file (TOML or JSON); built-in default when omitted
    #[arg(short, long, env = "CONTENT_MIXER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of items to request
    #[arg(long, allow_negative_numbers = true)]
    pub count: i64,

    /// First slot position to return
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub offset: i64,

    /// How many times to run the request
    #[arg(long, default_value = "1")]
    pub repeat: u32,

    /// Identity hint passed to providers
    #[arg(long, default_value = "127.0.0.1")]
    pub user_ip: String,

    /// Override the request timeout from configuration
    #[arg(long, env = "CONTENT_MIXER_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
