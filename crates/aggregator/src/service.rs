//! ContentService - request entry point

use std::sync::Arc;
use std::time::Duration;

use contracts::{
    ContentConfig, ContentItem, ContractError, ProviderRegistry, ServiceBlueprint,
    DEFAULT_MAX_WINDOW,
};
use observability::RequestOutcome;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::assembler::assemble;
use crate::fallback::resolve_slots;
use crate::{ContentError, Deadline, RequestWindow, SlotSequencer};

/// Aggregates content from the registered providers
///
/// Cheap to clone; clones share the registry and template.
#[derive(Debug, Clone)]
pub struct ContentService {
    registry: Arc<ProviderRegistry>,
    sequencer: SlotSequencer,
    timeout: Duration,
    max_window: usize,
}

impl ContentService {
    /// Build a service
    ///
    /// # Errors
    /// - empty slot template
    /// - any slot provider or fallback without a registered capability
    /// - zero timeout
    #[instrument(name = "content_service_build", skip(configs, registry), fields(slots = configs.len()))]
    pub fn build(
        configs: Vec<ContentConfig>,
        registry: ProviderRegistry,
        timeout: Duration,
    ) -> Result<Self, ContentError> {
        for cfg in &configs {
            for provider in cfg.referenced_providers() {
                registry.require(provider)?;
            }
        }

        if timeout.is_zero() {
            return Err(ContractError::config_validation("timeout", "must be > 0").into());
        }

        let sequencer = SlotSequencer::new(configs)?;

        info!(
            slots = sequencer.configs().len(),
            providers = registry.len(),
            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            "Content service ready"
        );

        Ok(Self {
            registry: Arc::new(registry),
            sequencer,
            timeout,
            max_window: DEFAULT_MAX_WINDOW,
        })
    }

    /// Cap `count + offset` per request; larger windows are rejected as invalid
    ///
    /// # Errors
    /// A zero cap.
    pub fn with_max_window(mut self, max_window: usize) -> Result<Self, ContentError> {
        if max_window == 0 {
            return Err(ContractError::config_validation("max_window", "must be > 0").into());
        }
        self.max_window = max_window;
        Ok(self)
    }

    /// Build from a loaded blueprint and an already-built registry
    pub fn from_blueprint(
        blueprint: &ServiceBlueprint,
        registry: ProviderRegistry,
    ) -> Result<Self, ContentError> {
        Self::build(blueprint.slots.clone(), registry, blueprint.request.timeout())?
            .with_max_window(blueprint.request.max_window)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_window(&self) -> usize {
        self.max_window
    }

    pub fn configs(&self) -> &[ContentConfig] {
        self.sequencer.configs()
    }

    /// `count` items starting at slot `offset`
    ///
    /// # Errors
    /// - `Validation` for `count <= 0` or `offset < 0`
    /// - `Timeout` when the deadline elapses before the needed slots resolve
    pub async fn get_content(
        &self,
        user_ip: &str,
        count: i64,
        offset: i64,
    ) -> Result<Vec<ContentItem>, ContentError> {
        self.get_content_with_cancel(user_ip, count, offset, CancellationToken::new())
            .await
    }

    /// Like [`get_content`](Self::get_content), also giving up when `cancel` fires
    #[instrument(name = "get_content", skip(self, user_ip, cancel), fields(user_ip = %user_ip))]
    pub async fn get_content_with_cancel(
        &self,
        user_ip: &str,
        count: i64,
        offset: i64,
        cancel: CancellationToken,
    ) -> Result<Vec<ContentItem>, ContentError> {
        let deadline = Deadline::with_cancel(self.timeout, cancel);

        let result = self.run(user_ip, count, offset, &deadline).await;

        let latency_ms = deadline.elapsed().as_secs_f64() * 1000.0;
        observability::record_request_latency_ms(latency_ms);

        match &result {
            Ok(items) => {
                observability::record_request(RequestOutcome::Ok);
                debug!(items = items.len(), latency_ms, "Request served");
            }
            Err(e @ ContentError::Validation { .. }) => {
                observability::record_request(RequestOutcome::Invalid);
                debug!(error = %e, "Request rejected");
            }
            Err(e @ ContentError::Timeout { .. }) => {
                observability::record_request(RequestOutcome::Timeout);
                error!(error = %e, latency_ms, "Request timed out");
            }
            Err(e @ ContentError::Cancelled { .. }) => {
                observability::record_request(RequestOutcome::Cancelled);
                info!(error = %e, latency_ms, "Request cancelled");
            }
            Err(e @ ContentError::Configuration(_)) => {
                error!(error = %e, "Configuration error at request time");
            }
        }

        result
    }

    async fn run(
        &self,
        user_ip: &str,
        count: i64,
        offset: i64,
        deadline: &Deadline,
    ) -> Result<Vec<ContentItem>, ContentError> {
        let window = RequestWindow::new(count, offset, self.max_window)?;
        let slots = self.sequencer.expand(window);
        let user_ip: Arc<str> = Arc::from(user_ip);

        let outcomes = resolve_slots(&self.registry, &user_ip, &slots, deadline).await?;
        let assembled = assemble(outcomes, window.offset);

        if let Some(position) = assembled.truncated_at {
            observability::record_truncated_response();
            debug!(
                truncated_at = position,
                offset = window.offset,
                returned = assembled.items.len(),
                "Response truncated at unresolved slot"
            );
        }

        Ok(assembled.items)
    }
}
