//! Command implementations.

mod fetch;
mod serve;
mod validate;

pub use fetch::run_fetch;
pub use serve::run_serve;
pub use validate::run_validate;

use std::path::Path;

use aggregator::ContentService;
use config_loader::ConfigLoader;
use contracts::ServiceBlueprint;
use tracing::info;

use crate::error::{CliError, Result};

/// Load a blueprint from `path`, or the built-in default deployment
pub(crate) fn load_blueprint(path: Option<&Path>) -> Result<ServiceBlueprint> {
    let Some(path) = path else {
        info!("No configuration file given, using built-in default");
        return Ok(ServiceBlueprint::default());
    };

    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()));
    }

    info!(config = %path.display(), "Loading configuration");
    Ok(ConfigLoader::load_from_path(path)?)
}

/// Apply a request timeout override and re-validate
pub(crate) fn apply_timeout_override(
    blueprint: &mut ServiceBlueprint,
    timeout_ms: Option<u64>,
) -> Result<()> {
    if let Some(timeout_ms) = timeout_ms {
        if timeout_ms == 0 {
            return Err(CliError::invalid_override("--timeout-ms", "must be > 0"));
        }
        info!(timeout_ms, "Overriding request timeout from CLI");
        blueprint.request.timeout_ms = timeout_ms;
    }
    Ok(())
}

/// Build the provider registry and the service for a blueprint
pub(crate) fn build_service(blueprint: &ServiceBlueprint) -> Result<ContentService> {
    let registry = providers::build_registry(&blueprint.providers)?;
    Ok(ContentService::from_blueprint(blueprint, registry)?)
}
