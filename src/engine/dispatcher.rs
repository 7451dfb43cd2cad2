//! Shard workers: per-key serialized ingestion with update coalescing.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::domain::{
    allocate, evaluate, select_best, Detection, MarketKey, PriceHistory, Quote,
};
use crate::engine::events::LifecycleEvent;
use crate::engine::lifecycle::{Assessment, CandidateFigures, LifecycleManager, Shortfall};
use crate::engine::shared::EngineShared;

/// Work routed to a shard. Quotes for the same market always land on the
/// same shard, so mutation per key is serialized by construction.
#[derive(Debug)]
pub(crate) enum ShardMessage {
    Quote(Quote),
    Confirm(MarketKey),
}

/// One shard's worker loop.
///
/// Each iteration drains everything queued, applies all upserts, then
/// recomputes once per touched market: a queued-and-superseded
/// intermediate state is coalesced away and never surfaces.
pub(crate) struct ShardWorker {
    shard_id: usize,
    rx: mpsc::UnboundedReceiver<ShardMessage>,
    shared: Arc<EngineShared>,
    lifecycle: LifecycleManager,
}

impl ShardWorker {
    pub(crate) fn new(
        shard_id: usize,
        rx: mpsc::UnboundedReceiver<ShardMessage>,
        shared: Arc<EngineShared>,
    ) -> Self {
        let lifecycle = LifecycleManager::new(shared.lifecycle_config(), shared.book.clone());
        Self {
            shard_id,
            rx,
            shared,
            lifecycle,
        }
    }

    pub(crate) async fn run(mut self) {
        debug!(shard = self.shard_id, "shard worker started");
        while self.run_once().await {}
        debug!(shard = self.shard_id, "shard worker stopped");
    }

    /// Process one coalesced batch. Returns false once the channel closes.
    pub(crate) async fn run_once(&mut self) -> bool {
        let Some(first) = self.rx.recv().await else {
            return false;
        };
        let mut batch = vec![first];
        while let Ok(message) = self.rx.try_recv() {
            batch.push(message);
        }
        self.process(batch, Utc::now());
        true
    }

    pub(crate) fn process(&self, batch: Vec<ShardMessage>, now: DateTime<Utc>) {
        let mut touched: Vec<MarketKey> = Vec::new();

        for message in batch {
            match message {
                ShardMessage::Quote(quote) => {
                    let key = quote.market_key();
                    if self.shared.store.upsert(quote).stored() && !touched.contains(&key) {
                        touched.push(key);
                    }
                }
                ShardMessage::Confirm(key) => {
                    // Flush any pending recompute so the confirmation sees
                    // the latest state for this market
                    if let Some(position) = touched.iter().position(|k| k == &key) {
                        touched.remove(position);
                        self.recompute(&key, now);
                    }
                    self.publish(self.lifecycle.confirm_execution(&key));
                }
            }
        }

        for key in touched {
            self.recompute(&key, now);
        }
    }

    fn recompute(&self, key: &MarketKey, now: DateTime<Utc>) {
        let assessment = self.assess_market(key, now);
        self.publish(self.lifecycle.observe(key, assessment, now));
    }

    /// The full synchronous pipeline for one market: snapshot, best-price
    /// selection, detection, allocation, risk. Pure computation; no I/O.
    fn assess_market(&self, key: &MarketKey, now: DateTime<Utc>) -> Assessment {
        let Some(group) = self.shared.store.snapshot(key) else {
            return Assessment::NoCandidate(Shortfall::InsufficientData);
        };
        let max_age = self.shared.config.max_quote_age();
        let Some(best) = select_best(&group, now, max_age) else {
            return Assessment::NoCandidate(Shortfall::InsufficientData);
        };

        {
            let mut history = self
                .shared
                .histories
                .entry(key.clone())
                .or_insert_with(|| PriceHistory::new(self.shared.config.volatility_window));
            history.record(&best);
        }

        let detection = evaluate(&best, self.shared.config.min_profit_threshold);
        self.shared.stats.lock().record(now, detection.is_arb());

        match detection {
            Detection::Arb(figures) => {
                match allocate(&best, self.shared.config.total_stake) {
                    Ok(stakes) => {
                        let risk = self.shared.assess_risk(key, &best);
                        Assessment::Candidate(CandidateFigures {
                            margin: figures.margin,
                            implied_total: figures.implied_total,
                            stakes,
                            sources: best.sources(),
                            risk,
                        })
                    }
                    Err(error) => {
                        warn!(market = %key, %error, "stake allocation failed; candidate suppressed");
                        Assessment::NoCandidate(Shortfall::AllocationFailed)
                    }
                }
            }
            Detection::Thin(figures) => {
                debug!(
                    market = %key,
                    implied_total = %figures.implied_total,
                    margin = %figures.margin,
                    "sub-threshold margin"
                );
                Assessment::NoCandidate(Shortfall::BelowThreshold)
            }
            Detection::Overround(_) => Assessment::NoCandidate(Shortfall::Overround),
        }
    }

    fn publish(&self, events: Vec<LifecycleEvent>) {
        for event in events {
            match &event {
                LifecycleEvent::Detected { opportunity } => info!(
                    market = %opportunity.market(),
                    margin = %opportunity.margin(),
                    "opportunity detected"
                ),
                LifecycleEvent::Confirmed { opportunity } => info!(
                    market = %opportunity.market(),
                    margin = %opportunity.margin(),
                    "opportunity confirmed"
                ),
                LifecycleEvent::Expired {
                    opportunity,
                    reason,
                } => info!(
                    market = %opportunity.market(),
                    ?reason,
                    "opportunity expired"
                ),
                LifecycleEvent::Executed { opportunity } => info!(
                    market = %opportunity.market(),
                    payout = %opportunity.stakes().payout(),
                    "opportunity executed"
                ),
            }
            // Nobody listening is fine; events are fire-and-forget
            let _ = self.shared.events.send(event);
        }
    }
}
