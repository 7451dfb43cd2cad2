//! The arbitrage engine: sharded ingestion, detection, and lifecycle
//! tracking behind one handle.

mod dispatcher;
mod events;
mod lifecycle;
mod shared;
mod store;

pub use events::{DetectionReport, EventStream, ExpiryReason, LifecycleEvent, MarketFilter};
pub use store::QuoteStore;

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::domain::{
    allocate, evaluate, select_best, Detection, EventId, MarketKey, MarketType, Opportunity,
    Quote,
};
use crate::error::{Error, Result};

use dispatcher::{ShardMessage, ShardWorker};
use shared::EngineShared;

/// Handle to a running arbitrage engine.
///
/// Quotes go in through [`Engine::ingest`]; lifecycle transitions come out
/// through [`Engine::subscribe`]; [`Engine::query`] reads the current
/// detection state of one market on demand.
pub struct Engine {
    shared: Arc<EngineShared>,
    shards: Vec<mpsc::UnboundedSender<ShardMessage>>,
    workers: Vec<JoinHandle<()>>,
}

impl Engine {
    /// Spawn shard workers and return the handle.
    pub fn spawn(config: EngineConfig) -> Self {
        let shard_count = config.shards.max(1);
        let shared = Arc::new(EngineShared::new(config));

        let mut shards = Vec::with_capacity(shard_count);
        let mut workers = Vec::with_capacity(shard_count);
        for shard_id in 0..shard_count {
            let (tx, rx) = mpsc::unbounded_channel();
            let worker = ShardWorker::new(shard_id, rx, shared.clone());
            shards.push(tx);
            workers.push(tokio::spawn(worker.run()));
        }

        info!(shards = shard_count, "engine started");
        Self {
            shared,
            shards,
            workers,
        }
    }

    /// Route a quote to its market's shard.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOdds`-class errors for malformed prices (the quote
    /// is rejected, not stored) and `EngineClosed` after shutdown. Both
    /// are local to the one quote.
    pub fn ingest(&self, quote: Quote) -> Result<()> {
        if let Err(error) = quote.decimal_price() {
            debug!(market = %quote.market_key(), %error, "quote rejected");
            return Err(error.into());
        }
        let shard = self.shard_for(&quote.market_key());
        self.shards[shard]
            .send(ShardMessage::Quote(quote))
            .map_err(|_| Error::EngineClosed)
    }

    /// Signal that the opportunity for a market was placed externally.
    ///
    /// Routed through the market's shard so it serializes with quote
    /// updates. Only an active opportunity executes; otherwise the signal
    /// is ignored.
    pub fn confirm_execution(
        &self,
        event: impl Into<EventId>,
        market: impl Into<MarketType>,
    ) -> Result<()> {
        let key = MarketKey::new(event.into(), market.into());
        let shard = self.shard_for(&key);
        self.shards[shard]
            .send(ShardMessage::Confirm(key))
            .map_err(|_| Error::EngineClosed)
    }

    /// Read-only detection result for one market, computed on demand.
    pub fn query(
        &self,
        event: impl Into<EventId>,
        market: impl Into<MarketType>,
    ) -> DetectionReport {
        let key = MarketKey::new(event.into(), market.into());

        if let Some(live) = self.shared.book.get(&key) {
            return DetectionReport::Opportunity {
                opportunity: live.value().clone(),
            };
        }

        let Some(group) = self.shared.store.snapshot(&key) else {
            return DetectionReport::InsufficientData;
        };
        let now = Utc::now();
        let Some(best) = select_best(&group, now, self.shared.config.max_quote_age()) else {
            return DetectionReport::InsufficientData;
        };

        match evaluate(&best, self.shared.config.min_profit_threshold) {
            Detection::Arb(figures) => {
                match allocate(&best, self.shared.config.total_stake) {
                    Ok(stakes) => {
                        let risk = self.shared.assess_risk(&key, &best);
                        let window = self.shared.config.opportunity_window();
                        DetectionReport::Opportunity {
                            opportunity: Opportunity::candidate(
                                key,
                                figures.margin,
                                figures.implied_total,
                                stakes,
                                best.sources(),
                                risk,
                                now,
                                now + window,
                            ),
                        }
                    }
                    // Degenerate prices suppress the candidate
                    Err(_) => DetectionReport::InsufficientData,
                }
            }
            Detection::Thin(figures) => DetectionReport::Thin {
                implied_total: figures.implied_total,
                margin: figures.margin,
            },
            Detection::Overround(efficiency) => DetectionReport::Efficiency(efficiency),
        }
    }

    /// Subscribe to lifecycle transitions for the markets a filter
    /// matches.
    ///
    /// The sequence is lazy and restartable: it observes transitions
    /// published after the call, and a dropped stream can simply be
    /// replaced by subscribing again.
    pub fn subscribe(&self, filter: MarketFilter) -> EventStream {
        EventStream::new(self.shared.events.subscribe(), filter)
    }

    /// Number of markets with at least one stored quote.
    pub fn market_count(&self) -> usize {
        self.shared.store.market_count()
    }

    /// Quotes dropped for arriving out of order.
    pub fn late_drop_count(&self) -> u64 {
        self.shared.store.late_drop_count()
    }

    /// Drain the shard workers and wait for them to stop.
    pub async fn shutdown(mut self) {
        self.shards.clear();
        for worker in self.workers.drain(..) {
            let _ = worker.await;
        }
        info!("engine stopped");
    }

    fn shard_for(&self, key: &MarketKey) -> usize {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards.len()
    }
}
