//! `fetch` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Instant;
use tracing::{info, warn};

use contracts::ContentItem;
use observability::LatencyAggregator;

use super::{apply_timeout_override, build_service, load_blueprint};
use crate::cli::FetchArgs;

/// Fetch report for JSON output
#[derive(Serialize)]
struct FetchReport {
    items: Vec<ContentItem>,
    succeeded: u64,
    failed: u64,
    latency_ms: LatencyReport,
}

#[derive(Serialize)]
struct LatencyReport {
    min: f64,
    max: f64,
    mean: f64,
    std_dev: f64,
}

/// Execute the `fetch` command
pub async fn run_fetch(args: &FetchArgs) -> Result<()> {
    let mut blueprint = load_blueprint(args.config.as_deref())?;
    apply_timeout_override(&mut blueprint, args.timeout_ms)?;
    let service = build_service(&blueprint)?;

    let repeat = args.repeat.max(1);
    let mut stats = LatencyAggregator::new();
    let mut last_items = Vec::new();

    for attempt in 1..=repeat {
        let started = Instant::now();
        let result = service
            .get_content(&args.user_ip, args.count, args.offset)
            .await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(items) => {
                info!(attempt, items = items.len(), elapsed_ms, "Request succeeded");
                stats.record_success(elapsed_ms, items.len());
                last_items = items;
            }
            Err(e) if e.is_client_error() => {
                return Err(e).context("Invalid request");
            }
            Err(e) => {
                warn!(attempt, error = %e, elapsed_ms, "Request failed");
                stats.record_failure(elapsed_ms);
            }
        }
    }

    if args.json {
        let summary = stats.summary();
        let report = FetchReport {
            items: last_items,
            succeeded: stats.succeeded,
            failed: stats.failed,
            latency_ms: LatencyReport {
                min: summary.min,
                max: summary.max,
                mean: summary.mean,
                std_dev: summary.std_dev,
            },
        };
        let json =
            serde_json::to_string_pretty(&report).context("Failed to serialize fetch report")?;
        println!("{}", json);
    } else {
        print_items(&last_items);
        println!("\n{}", stats);
    }

    if stats.succeeded == 0 {
        anyhow::bail!("All {} request(s) failed", repeat);
    }
    Ok(())
}

fn print_items(items: &[ContentItem]) {
    if items.is_empty() {
        println!("(no items)");
        return;
    }

    for (position, item) in items.iter().enumerate() {
        println!(
            "{:>4}  [{}] {}  {}  expires {}",
            position,
            item.source,
            item.id,
            item.title,
            item.expiry.to_rfc3339()
        );
    }
}
