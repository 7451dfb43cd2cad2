//! Sharded storage of the latest quote per (market, selection, source).

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::domain::{MarketGroup, MarketKey, Quote, UpsertOutcome};

/// Latest-quote store, sharded by market key.
///
/// Writes go through the dispatcher, which serializes mutation per key;
/// readers take cheap cloned snapshots and never observe a half-applied
/// update.
#[derive(Debug, Default)]
pub struct QuoteStore {
    groups: DashMap<MarketKey, MarketGroup>,
    late_drops: AtomicU64,
}

impl QuoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a quote to its market group. Out-of-order late arrivals are
    /// dropped silently and counted.
    pub fn upsert(&self, quote: Quote) -> UpsertOutcome {
        let key = quote.market_key();
        let mut group = self
            .groups
            .entry(key.clone())
            .or_insert_with(|| MarketGroup::new(key));
        let outcome = group.upsert(quote);
        if outcome == UpsertOutcome::StaleDropped {
            self.late_drops.fetch_add(1, Ordering::Relaxed);
        }
        outcome
    }

    /// Immutable snapshot of a market group.
    pub fn snapshot(&self, key: &MarketKey) -> Option<MarketGroup> {
        self.groups.get(key).map(|group| group.value().clone())
    }

    /// Number of markets with at least one stored quote.
    pub fn market_count(&self) -> usize {
        self.groups.len()
    }

    /// Quotes dropped for arriving out of order.
    pub fn late_drop_count(&self) -> u64 {
        self.late_drops.load(Ordering::Relaxed)
    }
}
