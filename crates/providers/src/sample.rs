//! Sample provider producing synthetic content

use std::time::Duration;

use chrono::{TimeDelta, Utc};
use contracts::{ContentItem, ContentProvider, ContractError, Provider};
use rand::Rng;
use tracing::trace;

/// Generates `count` synthetic items tagged with its own source
#[derive(Debug, Clone)]
pub struct SampleProvider {
    source: Provider,
    latency: Duration,
}

impl SampleProvider {
    pub fn new(source: impl Into<Provider>) -> Self {
        Self {
            source: source.into(),
            latency: Duration::ZERO,
        }
    }

    /// Sleep for `latency` before answering
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn source(&self) -> &Provider {
        &self.source
    }
}

impl ContentProvider for SampleProvider {
    fn fetch(&self, user_ip: &str, count: usize) -> Result<Vec<ContentItem>, ContractError> {
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }

        trace!(provider = %self.source, user_ip, count, "Generating sample content");

        let mut rng = rand::rng();
        let expiry = Utc::now() + TimeDelta::hours(1);
        let items = (0..count)
            .map(|_| ContentItem {
                id: rng.random::<u64>().to_string(),
                title: format!("content from provider {}", self.source),
                source: self.source.clone(),
                expiry,
            })
            .collect();

        Ok(items)
    }
}
