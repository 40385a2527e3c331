//! Round dispatcher
//!
//! Within one round every provider with positive demand gets exactly one
//! fetch, sized to that demand, running as its own blocking task. Slots
//! then claim items from their provider's batch in slot order: the k-th
//! item of a batch goes to the k-th slot waiting on that provider.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use contracts::{ContentItem, ContractError, Provider, ProviderRegistry};
use observability::{FetchOutcome, FetchRound};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, instrument, warn};

use crate::{ContentError, Deadline};

/// Outcome of one slot: an item or a failure, never both
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotOutcome {
    Filled(ContentItem),
    Failed(SlotFailure),
}

impl SlotOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Why a slot could not be filled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotFailure {
    /// The provider call returned an error
    Fetch { provider: Provider, message: String },
    /// The provider returned fewer items than the round demanded
    UnderDelivered {
        provider: Provider,
        requested: usize,
        delivered: usize,
    },
    /// The provider call panicked
    Aborted { provider: Provider, message: String },
    /// No fetch was issued for this provider in this round
    NotDispatched { provider: Provider },
}

impl SlotFailure {
    pub fn provider(&self) -> &Provider {
        match self {
            Self::Fetch { provider, .. }
            | Self::UnderDelivered { provider, .. }
            | Self::Aborted { provider, .. }
            | Self::NotDispatched { provider } => provider,
        }
    }
}

/// Number of slots needing each provider in one round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Demand {
    counts: HashMap<Provider, usize>,
}

impl Demand {
    /// Tally one slot per provider occurrence
    pub fn tally<'a>(providers: impl IntoIterator<Item = &'a Provider>) -> Self {
        let mut counts = HashMap::new();
        for provider in providers {
            *counts.entry(provider.clone()).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn get(&self, provider: &str) -> usize {
        self.counts.get(provider).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Distinct providers with positive demand
    pub fn providers(&self) -> usize {
        self.counts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Provider, usize)> {
        self.counts.iter().map(|(p, n)| (p, *n))
    }
}

/// Issues the fetches of one round
pub struct RoundDispatcher<'a> {
    registry: &'a ProviderRegistry,
    round: FetchRound,
}

impl<'a> RoundDispatcher<'a> {
    pub fn new(registry: &'a ProviderRegistry, round: FetchRound) -> Self {
        Self { registry, round }
    }

    /// Start one concurrent fetch per provider in `demand`
    ///
    /// Returns immediately; results are claimed through [`RoundBatches::claim`].
    #[instrument(
        name = "round_dispatch",
        skip(self, user_ip, demand),
        fields(round = %self.round, providers = demand.providers())
    )]
    pub fn dispatch(&self, user_ip: &Arc<str>, demand: &Demand) -> RoundBatches {
        let mut batches = HashMap::with_capacity(demand.providers());

        for (provider, count) in demand.iter() {
            let batch = match self.registry.get(provider) {
                Some(capability) => {
                    let task = spawn_fetch(
                        Arc::clone(capability),
                        provider.clone(),
                        Arc::clone(user_ip),
                        count,
                        self.round,
                    );
                    Batch::Pending {
                        requested: count,
                        task,
                    }
                }
                // Construction checks make this unreachable in a built service
                None => Batch::Failed(SlotFailure::NotDispatched {
                    provider: provider.clone(),
                }),
            };
            batches.insert(provider.clone(), batch);
        }

        RoundBatches {
            round: self.round,
            batches,
        }
    }
}

fn spawn_fetch(
    capability: Arc<dyn contracts::ContentProvider>,
    provider: Provider,
    user_ip: Arc<str>,
    count: usize,
    round: FetchRound,
) -> JoinHandle<Result<Vec<ContentItem>, ContractError>> {
    debug!(%provider, %round, count, "Dispatching provider fetch");

    // Blocking tasks cannot be aborted: once started, a fetch runs to
    // completion even if nobody waits for it any more.
    tokio::task::spawn_blocking(move || {
        let started = Instant::now();
        let result = capability.fetch(&user_ip, count);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(items) if items.len() >= count => {
                debug!(%provider, %round, count, elapsed_ms, "Fetched data");
                observability::record_provider_fetch(&provider, round, FetchOutcome::Ok, items.len());
            }
            Ok(items) => {
                warn!(
                    %provider,
                    %round,
                    requested = count,
                    delivered = items.len(),
                    elapsed_ms,
                    "Provider returned fewer items than requested"
                );
                observability::record_provider_fetch(&provider, round, FetchOutcome::Short, items.len());
                observability::record_under_delivery(&provider);
            }
            Err(e) => {
                warn!(%provider, %round, count, elapsed_ms, error = %e, "Fetch data failed");
                observability::record_provider_fetch(&provider, round, FetchOutcome::Error, 0);
            }
        }

        result
    })
}

/// State of one provider's batch within a round
enum Batch {
    /// Fetch still running
    Pending {
        requested: usize,
        task: JoinHandle<Result<Vec<ContentItem>, ContractError>>,
    },
    /// Items not yet claimed, in provider order
    Ready {
        requested: usize,
        delivered: usize,
        items: std::vec::IntoIter<ContentItem>,
    },
    /// Every remaining claim fails with this
    Failed(SlotFailure),
}

impl Batch {
    fn settle(
        provider: &Provider,
        requested: usize,
        joined: Result<Result<Vec<ContentItem>, ContractError>, JoinError>,
    ) -> Self {
        match joined {
            Ok(Ok(mut items)) => {
                // Excess is never handed to slots
                items.truncate(requested);
                Batch::Ready {
                    requested,
                    delivered: items.len(),
                    items: items.into_iter(),
                }
            }
            Ok(Err(e)) => Batch::Failed(SlotFailure::Fetch {
                provider: provider.clone(),
                message: e.to_string(),
            }),
            Err(e) => Batch::Failed(SlotFailure::Aborted {
                provider: provider.clone(),
                message: e.to_string(),
            }),
        }
    }

    fn take(&mut self, provider: &Provider) -> SlotOutcome {
        match self {
            Batch::Ready {
                requested,
                delivered,
                items,
            } => match items.next() {
                Some(item) => SlotOutcome::Filled(item),
                None => SlotOutcome::Failed(SlotFailure::UnderDelivered {
                    provider: provider.clone(),
                    requested: *requested,
                    delivered: *delivered,
                }),
            },
            Batch::Failed(failure) => SlotOutcome::Failed(failure.clone()),
            Batch::Pending { .. } => SlotOutcome::Failed(SlotFailure::NotDispatched {
                provider: provider.clone(),
            }),
        }
    }
}

/// In-flight and settled batches of one round
pub struct RoundBatches {
    round: FetchRound,
    batches: HashMap<Provider, Batch>,
}

impl RoundBatches {
    /// Claim the next item of `provider`'s batch for the next waiting slot
    ///
    /// Suspends until the batch has settled, bounded by `deadline`.
    ///
    /// # Errors
    /// Only deadline expiry or cancellation; provider failures come back
    /// as [`SlotOutcome::Failed`].
    pub async fn claim(
        &mut self,
        provider: &Provider,
        deadline: &Deadline,
    ) -> Result<SlotOutcome, ContentError> {
        let Some(batch) = self.batches.get_mut(provider.as_str()) else {
            return Ok(SlotOutcome::Failed(SlotFailure::NotDispatched {
                provider: provider.clone(),
            }));
        };

        if let Batch::Pending { requested, task } = batch {
            let requested = *requested;
            let joined = deadline.wait(task, self.round, provider).await?;
            *batch = Batch::settle(provider, requested, joined);
        }

        Ok(batch.take(provider))
    }
}
