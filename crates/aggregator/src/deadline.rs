//! Deadline guard
//!
//! One deadline per request, shared by both rounds. Every suspension point
//! races the awaited result against the deadline and the caller's
//! cancellation token. Firing only stops the waiting; provider calls that
//! are already running are left to finish and their results are dropped.

use std::future::Future;
use std::time::Duration;

use contracts::Provider;
use observability::FetchRound;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::ContentError;

/// Request-wide deadline plus caller cancellation
#[derive(Debug, Clone)]
pub struct Deadline {
    started: Instant,
    expires_at: Instant,
    cancel: CancellationToken,
}

impl Deadline {
    /// Deadline `timeout` from now, never cancelled by the caller
    pub fn after(timeout: Duration) -> Self {
        Self::with_cancel(timeout, CancellationToken::new())
    }

    /// Deadline `timeout` from now that also fires when `cancel` is cancelled
    pub fn with_cancel(timeout: Duration, cancel: CancellationToken) -> Self {
        let started = Instant::now();
        Self {
            started,
            expires_at: started + timeout,
            cancel,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Wait for `fut`, or fail when the deadline or the cancellation fires first
    ///
    /// `round` and `provider` only describe what was being waited on, for the error.
    pub async fn wait<F>(
        &self,
        fut: F,
        round: FetchRound,
        provider: &Provider,
    ) -> Result<F::Output, ContentError>
    where
        F: Future,
    {
        tokio::select! {
            // A result that is already available wins over a deadline firing at the same time
            biased;
            output = fut => Ok(output),
            _ = sleep_until(self.expires_at) => Err(ContentError::Timeout {
                waited_ms: u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX),
                round,
                provider: provider.clone(),
            }),
            _ = self.cancel.cancelled() => Err(ContentError::Cancelled {
                round,
                provider: provider.clone(),
            }),
        }
    }
}
