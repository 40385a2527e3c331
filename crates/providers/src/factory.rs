//! Registry factory
//!
//! Turns `[[providers]]` configuration into the immutable registry.

use std::sync::Arc;

use contracts::{
    ContentProvider, ContractError, ProviderKind, ProviderRegistry, ProviderSpec,
};
use tracing::{info, instrument};

use crate::{SampleProvider, ScriptedProvider};

/// Build a registry from provider definitions
///
/// # Errors
/// Duplicate provider ids.
#[instrument(name = "providers_build_registry", skip(specs), fields(count = specs.len()))]
pub fn build_registry(specs: &[ProviderSpec]) -> Result<ProviderRegistry, ContractError> {
    let mut builder = ProviderRegistry::builder();

    for spec in specs {
        let capability: Arc<dyn ContentProvider> = match spec.kind {
            ProviderKind::Sample => {
                Arc::new(SampleProvider::new(spec.id.clone()).with_latency(spec.latency()))
            }
            ProviderKind::Unavailable => Arc::new(
                ScriptedProvider::new(spec.id.clone())
                    .failing()
                    .with_latency(spec.latency()),
            ),
        };

        info!(
            provider = %spec.id,
            kind = ?spec.kind,
            latency_ms = spec.latency_ms,
            "Provider registered"
        );
        builder = builder.register(spec.id.clone(), capability)?;
    }

    Ok(builder.build())
}
