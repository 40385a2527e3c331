//! Content mixer metrics
//!
//! Thin helpers over the `metrics` facade plus in-memory latency statistics.

use metrics::{counter, histogram};

/// Which round a provider fetch belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchRound {
    Primary,
    Fallback,
}

impl FetchRound {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for FetchRound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one provider fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Ok,
    /// Provider returned fewer items than demanded
    Short,
    Error,
}

impl FetchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Short => "short",
            Self::Error => "error",
        }
    }
}

/// Outcome of one whole request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Ok,
    Invalid,
    Timeout,
    Cancelled,
}

impl RequestOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Invalid => "invalid",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Record one provider fetch and the number of items it yielded
pub fn record_provider_fetch(provider: &str, round: FetchRound, outcome: FetchOutcome, items: usize) {
    counter!(
        "content_mixer_provider_fetch_total",
        "provider" => provider.to_string(),
        "round" => round.as_str(),
        "outcome" => outcome.as_str()
    )
    .increment(1);

    histogram!(
        "content_mixer_provider_fetch_items",
        "provider" => provider.to_string()
    )
    .record(items as f64);
}

/// Record a provider answering with fewer items than demanded
pub fn record_under_delivery(provider: &str) {
    counter!(
        "content_mixer_under_delivery_total",
        "provider" => provider.to_string()
    )
    .increment(1);
}

/// Record slots sent to the fallback round
pub fn record_fallback_slots(slots: usize) {
    counter!("content_mixer_fallback_slots_total").increment(slots as u64);
}

/// Record a response cut short by an unresolved slot
pub fn record_truncated_response() {
    counter!("content_mixer_truncated_responses_total").increment(1);
}

pub fn record_request(outcome: RequestOutcome) {
    counter!("content_mixer_requests_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_request_latency_ms(latency_ms: f64) {
    histogram!("content_mixer_request_latency_ms").record(latency_ms);
}

/// Request latency aggregator
///
/// Aggregates in memory for end-of-run summaries.
#[derive(Debug, Clone, Default)]
pub struct LatencyAggregator {
    pub succeeded: u64,
    pub failed: u64,
    /// Total items returned across successful requests
    pub items: u64,
    pub latency_ms: RunningStats,
}

impl LatencyAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, latency_ms: f64, items: usize) {
        self.succeeded += 1;
        self.items += items as u64;
        self.latency_ms.push(latency_ms);
    }

    pub fn record_failure(&mut self, latency_ms: f64) {
        self.failed += 1;
        self.latency_ms.push(latency_ms);
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary::from(&self.latency_ms)
    }
}

impl std::fmt::Display for LatencyAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Request Summary ===")?;
        writeln!(f, "Succeeded: {}", self.succeeded)?;
        writeln!(f, "Failed: {}", self.failed)?;
        writeln!(f, "Items returned: {}", self.items)?;
        writeln!(f, "Latency (ms): {}", self.summary())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
