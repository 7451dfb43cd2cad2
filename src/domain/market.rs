//! Market groups: all quotes for one (event, market type) pair.

use std::collections::BTreeMap;

use crate::domain::{MarketKey, Quote, Selection, SourceId};

/// Outcome of offering a quote to a market group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// First quote seen for this (selection, source).
    Inserted,
    /// Strictly newer than the stored quote; replaced it.
    Replaced,
    /// Not strictly newer than the stored quote; dropped silently.
    StaleDropped,
}

impl UpsertOutcome {
    /// Whether the group changed.
    pub fn stored(&self) -> bool {
        !matches!(self, UpsertOutcome::StaleDropped)
    }
}

/// All latest quotes for one market, selection by selection, source by
/// source.
///
/// Exclusively owned and mutated by the quote store under per-key
/// serialization; readers get clones. BTree maps keep iteration order
/// deterministic, which the best-price tie-break relies on.
#[derive(Debug, Clone)]
pub struct MarketGroup {
    key: MarketKey,
    quotes: BTreeMap<Selection, BTreeMap<SourceId, Quote>>,
}

impl MarketGroup {
    /// Create an empty group for a market.
    pub fn new(key: MarketKey) -> Self {
        Self {
            key,
            quotes: BTreeMap::new(),
        }
    }

    /// The market this group covers.
    pub fn key(&self) -> &MarketKey {
        &self.key
    }

    /// Store the quote unless a strictly newer one is already present for
    /// the same (selection, source). Out-of-order late arrivals are dropped
    /// to prevent regressions from delayed network responses.
    pub fn upsert(&mut self, quote: Quote) -> UpsertOutcome {
        let per_source = self.quotes.entry(quote.selection().clone()).or_default();
        match per_source.get(quote.source()) {
            None => {
                per_source.insert(quote.source().clone(), quote);
                UpsertOutcome::Inserted
            }
            Some(existing) if quote.observed_at() > existing.observed_at() => {
                per_source.insert(quote.source().clone(), quote);
                UpsertOutcome::Replaced
            }
            Some(_) => UpsertOutcome::StaleDropped,
        }
    }

    /// Selections that have quoted at least once in this market.
    pub fn selections(&self) -> impl Iterator<Item = &Selection> {
        self.quotes.keys()
    }

    /// Number of selections that have quoted.
    pub fn selection_count(&self) -> usize {
        self.quotes.len()
    }

    /// Latest quotes for one selection, keyed by source.
    pub fn quotes_for(&self, selection: &Selection) -> Option<&BTreeMap<SourceId, Quote>> {
        self.quotes.get(selection)
    }

    /// Latest quote for one (selection, source).
    pub fn quote(&self, selection: &Selection, source: &SourceId) -> Option<&Quote> {
        self.quotes.get(selection).and_then(|m| m.get(source))
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}
