//! Content data model: items produced by providers and the slot template.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Provider;

/// One piece of content produced by a provider.
///
/// Immutable once produced. `source` always names the provider that
/// produced the item, which for a fallback slot is the fallback provider.
/// Serialized field names follow the public response shape
/// (`ID`, `Title`, `Source`, `Expiry`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(rename = "ID")]
    pub id: String,

    #[serde(rename = "Title")]
    pub title: String,

    #[serde(rename = "Source")]
    pub source: Provider,

    #[serde(rename = "Expiry")]
    pub expiry: DateTime<Utc>,
}

/// One entry of the repeating slot template.
///
/// Slot `i` of any request is bound to `configs[i % configs.len()]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Primary provider for the slot
    pub provider: Provider,

    /// Provider consulted only when the primary attempt fails
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Provider>,
}

impl ContentConfig {
    /// Slot served by `provider` alone.
    pub fn new(provider: impl Into<Provider>) -> Self {
        Self {
            provider: provider.into(),
            fallback: None,
        }
    }

    /// Slot served by `provider`, falling back to `fallback`.
    pub fn with_fallback(provider: impl Into<Provider>, fallback: impl Into<Provider>) -> Self {
        Self {
            provider: provider.into(),
            fallback: Some(fallback.into()),
        }
    }

    /// Every provider this entry references (primary first).
    pub fn referenced_providers(&self) -> impl Iterator<Item = &Provider> {
        std::iter::once(&self.provider).chain(self.fallback.iter())
    }
}
