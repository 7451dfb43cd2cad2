//! State shared between the engine handle and its shard workers.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::config::EngineConfig;
use crate::domain::{
    assess, BestPriceSet, MarketKey, Opportunity, PriceHistory, RiskProfile, ScanStats,
};
use crate::engine::events::LifecycleEvent;
use crate::engine::lifecycle::LifecycleConfig;
use crate::engine::store::QuoteStore;

/// Size of the lifecycle event replay buffer per subscriber.
const EVENT_BUFFER: usize = 1024;

/// Everything the shard workers and the public handle both touch.
///
/// Mutation of per-market entries (store groups, histories, book records)
/// only ever happens inside that market's serialized shard section; reads
/// may come from any thread.
pub(crate) struct EngineShared {
    pub config: EngineConfig,
    pub store: QuoteStore,
    pub book: Arc<DashMap<MarketKey, Opportunity>>,
    pub histories: DashMap<MarketKey, PriceHistory>,
    pub stats: Mutex<ScanStats>,
    pub events: broadcast::Sender<LifecycleEvent>,
}

impl EngineShared {
    pub(crate) fn new(config: EngineConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let stats = Mutex::new(ScanStats::new(config.rarity_period()));
        Self {
            config,
            store: QuoteStore::new(),
            book: Arc::new(DashMap::new()),
            histories: DashMap::new(),
            stats,
            events,
        }
    }

    pub(crate) fn lifecycle_config(&self) -> LifecycleConfig {
        LifecycleConfig {
            opportunity_window: self.config.opportunity_window(),
            confirmation_grace: self.config.confirmation_grace(),
        }
    }

    /// Risk profile for a best-price set, from the market's trailing
    /// history and the engine-wide scan statistics.
    pub(crate) fn assess_risk(&self, key: &MarketKey, best: &BestPriceSet) -> RiskProfile {
        let rarity = self.stats.lock().rarity();
        match self.histories.get(key) {
            Some(history) => assess(best, &history, rarity, self.config.source_cap),
            None => assess(
                best,
                &PriceHistory::new(self.config.volatility_window),
                rarity,
                self.config.source_cap,
            ),
        }
    }
}
