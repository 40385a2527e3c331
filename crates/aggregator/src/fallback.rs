//! Fallback coordinator
//!
//! Two rounds at most. The primary round covers every slot. The fallback
//! round covers failed slots that have a fallback configured, scanning in
//! slot order and stopping at the first failed slot without one: the
//! assembler truncates there, so anything later would be discarded.
//! If truncation ever stops being prefix-based, that early exit must go.

use std::sync::Arc;

use contracts::{ContentConfig, Provider, ProviderRegistry};
use observability::FetchRound;
use tracing::{debug, instrument};

use crate::round::{Demand, RoundDispatcher, SlotOutcome};
use crate::{ContentError, Deadline};

/// Resolve every slot through the primary round and, if needed, one fallback round
///
/// # Errors
/// Deadline expiry or cancellation during either round. Nothing observed
/// before that point is returned.
#[instrument(
    name = "resolve_slots",
    skip(registry, user_ip, slots, deadline),
    fields(slots = slots.len())
)]
pub async fn resolve_slots(
    registry: &ProviderRegistry,
    user_ip: &Arc<str>,
    slots: &[&ContentConfig],
    deadline: &Deadline,
) -> Result<Vec<SlotOutcome>, ContentError> {
    let mut outcomes = primary_round(registry, user_ip, slots, deadline).await?;

    let plan = plan_fallback(slots, &outcomes);
    if plan.is_empty() {
        return Ok(outcomes);
    }

    observability::record_fallback_slots(plan.len());
    debug!(fallback_slots = plan.len(), "Starting fallback round");

    let demand = Demand::tally(plan.iter().map(|(_, provider)| provider));
    let mut batches = RoundDispatcher::new(registry, FetchRound::Fallback).dispatch(user_ip, &demand);

    for (index, provider) in plan {
        let outcome = batches.claim(&provider, deadline).await?;
        // A slot failing again keeps its primary failure
        if !outcome.is_failed() {
            outcomes[index] = outcome;
        }
    }

    Ok(outcomes)
}

async fn primary_round(
    registry: &ProviderRegistry,
    user_ip: &Arc<str>,
    slots: &[&ContentConfig],
    deadline: &Deadline,
) -> Result<Vec<SlotOutcome>, ContentError> {
    let demand = Demand::tally(slots.iter().map(|cfg| &cfg.provider));
    let mut batches = RoundDispatcher::new(registry, FetchRound::Primary).dispatch(user_ip, &demand);

    let mut outcomes = Vec::with_capacity(slots.len());
    for cfg in slots {
        outcomes.push(batches.claim(&cfg.provider, deadline).await?);
    }
    Ok(outcomes)
}

/// Slots to retry, as `(slot index, fallback provider)` in slot order
pub fn plan_fallback(slots: &[&ContentConfig], outcomes: &[SlotOutcome]) -> Vec<(usize, Provider)> {
    let mut plan = Vec::new();

    for (index, (cfg, outcome)) in slots.iter().zip(outcomes).enumerate() {
        let SlotOutcome::Failed(failure) = outcome else {
            continue;
        };
        match &cfg.fallback {
            Some(fallback) => {
                debug!(slot = index, failed = %failure.provider(), %fallback, "Slot falls back");
                plan.push((index, fallback.clone()));
            }
            None => {
                debug!(slot = index, failed = %failure.provider(), "No fallback, later slots dropped");
                break;
            }
        }
    }

    plan
}
