//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::ServiceBlueprint;

use super::{build_service, load_blueprint};
use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    listen_addr: String,
    timeout_ms: u64,
    slot_count: usize,
    fallback_count: usize,
    provider_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    let checked = load_blueprint(Some(&args.config))
        .and_then(|blueprint| build_service(&blueprint).map(|_| blueprint));

    match checked {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    listen_addr: blueprint.server.listen_addr.clone(),
                    timeout_ms: blueprint.request.timeout_ms,
                    slot_count: blueprint.slots.len(),
                    fallback_count: blueprint
                        .slots
                        .iter()
                        .filter(|slot| slot.fallback.is_some())
                        .count(),
                    provider_count: blueprint.providers.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &ServiceBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    for spec in &blueprint.providers {
        if !blueprint
            .slots
            .iter()
            .any(|slot| slot.referenced_providers().any(|p| *p == spec.id))
        {
            warnings.push(format!("Provider '{}' is not used by any slot", spec.id));
        }

        if spec.latency_ms >= blueprint.request.timeout_ms {
            warnings.push(format!(
                "Provider '{}' latency ({} ms) reaches the request timeout ({} ms)",
                spec.id, spec.latency_ms, blueprint.request.timeout_ms
            ));
        }
    }

    for (index, slot) in blueprint.slots.iter().enumerate() {
        if slot.fallback.as_ref() == Some(&slot.provider) {
            warnings.push(format!(
                "slots[{index}] falls back to its own provider '{}'",
                slot.provider
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Listen address: {}", summary.listen_addr);
            println!("  Timeout: {} ms", summary.timeout_ms);
            println!(
                "  Slots: {} ({} with fallback)",
                summary.slot_count, summary.fallback_count
            );
            println!("  Providers: {}", summary.provider_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
