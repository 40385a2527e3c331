//! ContentProvider trait - backend content source abstraction
//!
//! Defines the capability the aggregation engine consumes, plus the
//! immutable registry mapping identifiers to capabilities.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::{ContentItem, ContractError, Provider};

/// Backend content source
///
/// A fetch is synchronous and order-preserving: given an identity hint
/// (the caller's IP address) and a requested count, it returns items in a
/// stable order or fails. Implementations are called from blocking worker
/// threads, so they may block freely.
///
/// # Contract
///
/// On success an implementation MUST return at least `count` items. The
/// engine discards anything past `count` and treats a short answer as a
/// failure of the slots it cannot serve.
///
/// # Example
///
/// ```ignore
/// let provider: Arc<dyn ContentProvider> = Arc::new(SampleProvider::new("1"));
/// let items = provider.fetch("10.0.0.1", 3)?;
/// assert_eq!(items.len(), 3);
/// ```
pub trait ContentProvider: Send + Sync {
    /// Fetch `count` items for the caller identified by `user_ip`.
    fn fetch(&self, user_ip: &str, count: usize) -> Result<Vec<ContentItem>, ContractError>;
}

impl<F> ContentProvider for F
where
    F: Fn(&str, usize) -> Result<Vec<ContentItem>, ContractError> + Send + Sync,
{
    fn fetch(&self, user_ip: &str, count: usize) -> Result<Vec<ContentItem>, ContractError> {
        self(user_ip, count)
    }
}

/// Immutable provider identifier -> capability table
///
/// Built once at service construction and shared read-only by every
/// request, so it needs no locking.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<Provider, Arc<dyn ContentProvider>>,
}

impl ProviderRegistry {
    /// Start building a registry
    pub fn builder() -> ProviderRegistryBuilder {
        ProviderRegistryBuilder::default()
    }

    /// Look up a capability
    pub fn get(&self, provider: &str) -> Option<&Arc<dyn ContentProvider>> {
        self.providers.get(provider)
    }

    /// Look up a capability, failing with `ProviderNotRegistered`
    pub fn require(&self, provider: &Provider) -> Result<&Arc<dyn ContentProvider>, ContractError> {
        self.providers
            .get(provider)
            .ok_or_else(|| ContractError::ProviderNotRegistered {
                provider: provider.clone(),
            })
    }

    /// Whether `provider` has a registered capability
    pub fn contains(&self, provider: &str) -> bool {
        self.providers.contains_key(provider)
    }

    /// Registered identifiers, sorted for stable output
    pub fn providers(&self) -> Vec<Provider> {
        let mut ids: Vec<Provider> = self.providers.keys().cloned().collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.providers())
            .finish()
    }
}

/// Builder for [`ProviderRegistry`]
#[derive(Default)]
pub struct ProviderRegistryBuilder {
    providers: HashMap<Provider, Arc<dyn ContentProvider>>,
}

impl ProviderRegistryBuilder {
    /// Register a capability; fails on a duplicate identifier
    pub fn register(
        mut self,
        provider: impl Into<Provider>,
        capability: Arc<dyn ContentProvider>,
    ) -> Result<Self, ContractError> {
        let provider = provider.into();
        if self.providers.contains_key(&provider) {
            return Err(ContractError::config_validation(
                format!("providers[id={provider}]"),
                "duplicate provider id",
            ));
        }
        self.providers.insert(provider, capability);
        Ok(self)
    }

    pub fn build(self) -> ProviderRegistry {
        ProviderRegistry {
            providers: self.providers,
        }
    }
}
