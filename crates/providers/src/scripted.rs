//! Scripted provider for tests and demos
//!
//! Supports injected failures, latency and short answers, and records
//! every call so tests can assert batching behaviour.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use contracts::{ContentItem, ContentProvider, ContractError, Provider};
use tracing::debug;

/// Deterministic provider with injectable behaviour
///
/// Item ids are `<source>-<n>` where `n` counts up across calls, so the
/// order in which items were handed out is observable.
#[derive(Debug)]
pub struct ScriptedProvider {
    source: Provider,
    fail: bool,
    latency: Duration,
    max_items: Option<usize>,
    calls: AtomicUsize,
    requested: Mutex<Vec<usize>>,
    next_id: AtomicU64,
}

impl ScriptedProvider {
    pub fn new(source: impl Into<Provider>) -> Self {
        Self {
            source: source.into(),
            fail: false,
            latency: Duration::ZERO,
            max_items: None,
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Fail every fetch
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Sleep for `latency` before answering
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Never return more than `max` items, whatever was requested
    pub fn delivering_at_most(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    /// Number of fetches received so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requested counts, one entry per fetch, in arrival order
    pub fn requested_counts(&self) -> Vec<usize> {
        self.requested
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn source(&self) -> &Provider {
        &self.source
    }
}

impl ContentProvider for ScriptedProvider {
    fn fetch(&self, user_ip: &str, count: usize) -> Result<Vec<ContentItem>, ContractError> {
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }

        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requested) = self.requested.lock() {
            requested.push(count);
        }

        debug!(provider = %self.source, user_ip, count, fail = self.fail, "Scripted fetch");

        if self.fail {
            return Err(ContractError::provider_fetch(
                self.source.clone(),
                "scripted failure",
            ));
        }

        let produced = self.max_items.map_or(count, |max| count.min(max));
        let expiry = Utc::now() + TimeDelta::minutes(5);
        let items = (0..produced)
            .map(|_| {
                let n = self.next_id.fetch_add(1, Ordering::SeqCst);
                ContentItem {
                    id: format!("{}-{n}", self.source),
                    title: "scripted title".to_string(),
                    source: self.source.clone(),
                    expiry,
                }
            })
            .collect();

        Ok(items)
    }
}
