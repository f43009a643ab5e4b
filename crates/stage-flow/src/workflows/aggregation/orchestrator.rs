use async_trait::async_trait;
use futures_util::future::join_all;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::policy::LookupPolicy;
use crate::workflows::gateway::GatewayError;

/// One kind of derived fact, fetched per parent key.
#[async_trait]
pub trait DependentLookup: Send + Sync {
    type Key: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static;
    type Fact: Clone + fmt::Debug + Send + Sync + 'static;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn lookup(&self, key: &Self::Key) -> Result<Self::Fact, LookupError>;

    /// Fact published for a key whose lookup failed or timed out.
    fn fallback(&self, key: &Self::Key) -> Self::Fact;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("lookup timed out after {0:?}")]
    TimedOut(Duration),
}

impl LookupError {
    pub fn is_retryable(&self) -> bool {
        match self {
            LookupError::Gateway(err) => err.is_retryable(),
            LookupError::TimedOut(_) => true,
        }
    }
}

/// What observers of an orchestrator can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    /// Nothing dispatched yet, or reset.
    Idle,
    /// A batch is in flight and no facts are visible.
    Loading,
    /// A batch is in flight; the previous generation's facts are still visible.
    Partial,
    /// The latest settled batch is published.
    Ready,
}

/// Snapshot of an orchestrator's published state.
#[derive(Debug, Clone)]
pub struct Published<K, F> {
    /// Most recently dispatched generation.
    pub dispatched: u64,
    /// Generation the visible facts belong to.
    pub generation: Option<u64>,
    pub state: BatchState,
    pub facts: Arc<HashMap<K, F>>,
}

impl<K, F> Published<K, F> {
    fn idle() -> Self {
        Self {
            dispatched: 0,
            generation: None,
            state: BatchState::Idle,
            facts: Arc::new(HashMap::new()),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == BatchState::Ready
    }
}

impl<K: Eq + Hash, F> Published<K, F> {
    pub fn fact(&self, key: &K) -> Option<&F> {
        self.facts.get(key)
    }
}

/// Result of one [`AggregationOrchestrator::refresh`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    Published { generation: u64, entries: usize },
    /// A newer batch was dispatched before this one settled; its results were dropped.
    Superseded { generation: u64, latest: u64 },
}

pub struct AggregationOrchestrator<L: DependentLookup> {
    lookup: Arc<L>,
    policy: LookupPolicy,
    retain_previous: bool,
    state: watch::Sender<Published<L::Key, L::Fact>>,
}

impl<L: DependentLookup> AggregationOrchestrator<L> {
    pub fn new(lookup: Arc<L>, policy: LookupPolicy) -> Self {
        let (state, _) = watch::channel(Published::idle());
        Self {
            lookup,
            policy,
            retain_previous: true,
            state,
        }
    }

    /// Keep the previous facts visible (`Partial`) while a new batch loads.
    pub fn retain_previous(mut self, retain: bool) -> Self {
        self.retain_previous = retain;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<Published<L::Key, L::Fact>> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> Published<L::Key, L::Fact> {
        self.state.borrow().clone()
    }

    /// Looks up every parent key concurrently and publishes the consolidated map, unless a newer
    /// batch was dispatched in the meantime. Never fails: a failed lookup contributes its
    /// fallback fact.
    pub async fn refresh(&self, parents: &[L::Key]) -> BatchOutcome {
        let generation = self.begin();
        self.refresh_at(generation, parents).await
    }

    /// Reserves the next generation. Callers that fetch the parent list themselves reserve it
    /// before the fetch, so a slow older fetch can never be dispatched after a newer one.
    pub fn begin(&self) -> u64 {
        let retain = self.retain_previous;
        let mut generation = 0;
        self.state.send_modify(|current| {
            current.dispatched += 1;
            generation = current.dispatched;
            if retain && current.generation.is_some() {
                current.state = BatchState::Partial;
            } else {
                current.generation = None;
                current.state = BatchState::Loading;
                current.facts = Arc::new(HashMap::new());
            }
        });
        generation
    }

    /// Runs the batch for a generation reserved with [`Self::begin`]. A generation that is no
    /// longer the latest is dropped without issuing any lookup.
    pub async fn refresh_at(&self, generation: u64, parents: &[L::Key]) -> BatchOutcome {
        let latest = self.latest();
        if latest != generation {
            debug!(
                lookup = self.lookup.name(),
                generation,
                latest,
                "dropping superseded batch before dispatch"
            );
            return BatchOutcome::Superseded { generation, latest };
        }

        let mut seen = HashSet::with_capacity(parents.len());
        let keys: Vec<L::Key> = parents
            .iter()
            .filter(|key| seen.insert(*key))
            .cloned()
            .collect();

        debug!(lookup = self.lookup.name(), generation, parents = keys.len(), "dispatching batch");

        let facts = join_all(keys.iter().map(|key| self.resolve(key))).await;
        let entries: HashMap<L::Key, L::Fact> = keys.into_iter().zip(facts).collect();

        self.publish(generation, entries)
    }

    /// Most recently reserved generation.
    pub fn latest(&self) -> u64 {
        self.state.borrow().dispatched
    }

    /// Releases a reserved generation whose parent list could not be fetched. Whatever was
    /// published before stays visible; a newer reservation is left alone.
    pub fn abandon(&self, generation: u64) {
        let abandoned = self.state.send_if_modified(|current| {
            if current.dispatched != generation {
                return false;
            }
            current.state = if current.generation.is_some() {
                BatchState::Ready
            } else {
                BatchState::Idle
            };
            true
        });
        if abandoned {
            debug!(lookup = self.lookup.name(), generation, "batch abandoned before dispatch");
        }
    }

    /// Forgets published facts (logout) and orphans any batch still in flight.
    pub fn reset(&self) {
        self.state.send_modify(|current| {
            current.dispatched += 1;
            current.generation = None;
            current.state = BatchState::Idle;
            current.facts = Arc::new(HashMap::new());
        });
    }

    fn publish(&self, generation: u64, entries: HashMap<L::Key, L::Fact>) -> BatchOutcome {
        let count = entries.len();
        let mut latest = generation;
        let published = self.state.send_if_modified(|current| {
            if current.dispatched != generation {
                latest = current.dispatched;
                return false;
            }
            current.generation = Some(generation);
            current.state = BatchState::Ready;
            current.facts = Arc::new(entries);
            true
        });

        if published {
            debug!(lookup = self.lookup.name(), generation, entries = count, "batch published");
            BatchOutcome::Published {
                generation,
                entries: count,
            }
        } else {
            debug!(lookup = self.lookup.name(), generation, latest, "discarding superseded batch");
            BatchOutcome::Superseded { generation, latest }
        }
    }

    async fn resolve(&self, key: &L::Key) -> L::Fact {
        let mut attempt = 0;
        loop {
            let outcome =
                match tokio::time::timeout(self.policy.timeout, self.lookup.lookup(key)).await {
                    Ok(result) => result,
                    Err(_) => Err(LookupError::TimedOut(self.policy.timeout)),
                };

            match outcome {
                Ok(fact) => return fact,
                Err(err) if err.is_retryable() && attempt < self.policy.max_retries => {
                    let delay = self.policy.backoff_delay(attempt);
                    debug!(
                        lookup = self.lookup.name(),
                        ?key,
                        attempt,
                        ?delay,
                        error = %err,
                        "retrying dependent lookup"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    warn!(
                        lookup = self.lookup.name(),
                        ?key,
                        error = %err,
                        "dependent lookup failed; publishing fallback"
                    );
                    return self.lookup.fallback(key);
                }
            }
        }
    }
}
