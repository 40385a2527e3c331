//! Error types for CLI operations.

use aggregator::ContentError;
use contracts::ContractError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration could not be loaded or validated
    #[error("Invalid configuration: {0}")]
    Config(#[from] ContractError),

    /// Service could not be built from the configuration
    #[error("Failed to build content service: {0}")]
    Service(#[from] ContentError),

    /// Command-line override that does not parse
    #[error("Invalid value for {flag}: {message}")]
    InvalidOverride { flag: &'static str, message: String },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn invalid_override(flag: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidOverride {
            flag,
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
