//! Aggregator error types

use contracts::{ContractError, Provider};
use observability::FetchRound;
use thiserror::Error;

/// Errors surfaced to the caller of the content service
///
/// Per-slot provider failures never appear here; they only show up as a
/// shorter result list.
#[derive(Debug, Error)]
pub enum ContentError {
    /// Misconfiguration detected at construction time
    #[error("configuration error: {0}")]
    Configuration(#[from] ContractError),

    /// Bad `count` / `offset`
    #[error("invalid {field} parameter: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Request deadline elapsed
    #[error("deadline exceeded after {waited_ms}ms waiting on provider '{provider}' ({round} round)")]
    Timeout {
        waited_ms: u64,
        round: FetchRound,
        provider: Provider,
    },

    /// Caller stopped waiting
    #[error("request cancelled while waiting on provider '{provider}' ({round} round)")]
    Cancelled { round: FetchRound, provider: Provider },
}

impl ContentError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Whether the caller is at fault (as opposed to the service)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
