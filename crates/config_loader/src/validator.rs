//! Configuration validation
//!
//! Rules:
//! - the slot template is non-empty
//! - provider ids are non-empty and unique
//! - every slot provider and fallback is defined
//! - request timeout > 0
//! - request max_window > 0
//! - listen address parses as a socket address

use std::collections::HashSet;
use std::net::SocketAddr;

use contracts::{ContractError, ServiceBlueprint};

/// Validate a ServiceBlueprint
///
/// Returns the first error encountered.
pub fn validate(blueprint: &ServiceBlueprint) -> Result<(), ContractError> {
    validate_provider_ids(blueprint)?;
    validate_slots(blueprint)?;
    validate_request(blueprint)?;
    validate_server(blueprint)?;
    Ok(())
}

fn validate_provider_ids(blueprint: &ServiceBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, spec) in blueprint.providers.iter().enumerate() {
        if spec.id.is_empty() {
            return Err(ContractError::config_validation(
                format!("providers[{idx}].id"),
                "provider id cannot be empty",
            ));
        }
        if !seen.insert(spec.id.as_str()) {
            return Err(ContractError::config_validation(
                format!("providers[id={}]", spec.id),
                "duplicate provider id",
            ));
        }
    }
    Ok(())
}

fn validate_slots(blueprint: &ServiceBlueprint) -> Result<(), ContractError> {
    if blueprint.slots.is_empty() {
        return Err(ContractError::config_validation(
            "slots",
            "at least one slot must be configured",
        ));
    }

    let defined: HashSet<&str> = blueprint.providers.iter().map(|p| p.id.as_str()).collect();

    for (idx, slot) in blueprint.slots.iter().enumerate() {
        if !defined.contains(slot.provider.as_str()) {
            return Err(ContractError::config_validation(
                format!("slots[{idx}].provider"),
                format!("provider '{}' not found in providers", slot.provider),
            ));
        }
        if let Some(fallback) = &slot.fallback {
            if !defined.contains(fallback.as_str()) {
                return Err(ContractError::config_validation(
                    format!("slots[{idx}].fallback"),
                    format!("fallback provider '{fallback}' not found in providers"),
                ));
            }
        }
    }
    Ok(())
}

fn validate_request(blueprint: &ServiceBlueprint) -> Result<(), ContractError> {
    if blueprint.request.timeout_ms == 0 {
        return Err(ContractError::config_validation(
            "request.timeout_ms",
            "timeout_ms must be > 0",
        ));
    }
    if blueprint.request.max_window == 0 {
        return Err(ContractError::config_validation(
            "request.max_window",
            "max_window must be > 0",
        ));
    }
    Ok(())
}

fn validate_server(blueprint: &ServiceBlueprint) -> Result<(), ContractError> {
    blueprint
        .server
        .listen_addr
        .parse::<SocketAddr>()
        .map_err(|e| {
            ContractError::config_validation(
                "server.listen_addr",
                format!("invalid socket address '{}': {e}", blueprint.server.listen_addr),
            )
        })?;
    Ok(())
}
