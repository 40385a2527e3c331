//! Layered error definitions
//!
//! Categorized by source: config / provider / general

use thiserror::Error;

use crate::Provider;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Provider Errors =====
    /// Provider referenced but never registered
    #[error("no provider registered for '{provider}'")]
    ProviderNotRegistered { provider: Provider },

    /// A provider fetch failed
    #[error("provider '{provider}' fetch error: {message}")]
    ProviderFetch { provider: Provider, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create provider fetch error
    pub fn provider_fetch(provider: impl Into<Provider>, message: impl Into<String>) -> Self {
        Self::ProviderFetch {
            provider: provider.into(),
            message: message.into(),
        }
    }
}
