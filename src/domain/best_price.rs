//! Best-price selection over a market group snapshot.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{MarketGroup, Selection, SourceId};

/// The winning quote for one selection: the source offering the highest
/// decimal price among eligible quotes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestQuote {
    pub source: SourceId,
    pub price: Decimal,
    pub observed_at: DateTime<Utc>,
}

/// Per-market consolidated best prices, one source per selection.
///
/// Derived on demand from a [`MarketGroup`] snapshot; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestPriceSet {
    prices: BTreeMap<Selection, BestQuote>,
}

impl BestPriceSet {
    /// Best quote per selection.
    pub fn prices(&self) -> &BTreeMap<Selection, BestQuote> {
        &self.prices
    }

    /// Sum of implied probabilities across selections.
    pub fn implied_total(&self) -> Decimal {
        self.prices
            .values()
            .map(|best| Decimal::ONE / best.price)
            .sum()
    }

    /// Distinct sources contributing a best price.
    pub fn sources(&self) -> Vec<SourceId> {
        let mut sources: Vec<SourceId> =
            self.prices.values().map(|best| best.source.clone()).collect();
        sources.sort();
        sources.dedup();
        sources
    }

    /// Observation time of the freshest contributing quote.
    pub fn freshest(&self) -> Option<DateTime<Utc>> {
        self.prices.values().map(|best| best.observed_at).max()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// Pick the best eligible price per selection.
///
/// A quote is eligible when its source still honors it (live) and it is no
/// older than `max_age` at the evaluation instant. Ties on price break
/// toward the most recent observation, then the lexicographically smallest
/// source id.
///
/// Returns `None` when any selection lacks an eligible quote, or when the
/// group covers fewer than two selections: a one-sided market cannot span
/// an event's outcomes, so detection would be meaningless. Both cases are
/// insufficient data, not errors.
pub fn select_best(
    group: &MarketGroup,
    now: DateTime<Utc>,
    max_age: Duration,
) -> Option<BestPriceSet> {
    if group.selection_count() < 2 {
        return None;
    }

    let mut prices = BTreeMap::new();
    for selection in group.selections() {
        let quotes = group.quotes_for(selection)?;
        let mut best: Option<BestQuote> = None;

        for (source, quote) in quotes {
            if !quote.is_live() || quote.age(now) > max_age {
                continue;
            }
            let Ok(price) = quote.decimal_price() else {
                // Malformed odds are rejected at ingestion; skip defensively
                continue;
            };
            let candidate = BestQuote {
                source: source.clone(),
                price,
                observed_at: quote.observed_at(),
            };
            best = match best {
                None => Some(candidate),
                Some(current) if beats(&candidate, &current) => Some(candidate),
                Some(current) => Some(current),
            };
        }

        prices.insert(selection.clone(), best?);
    }

    Some(BestPriceSet { prices })
}

/// Strict ordering for best-quote selection: higher price wins, then more
/// recent observation, then smaller source id.
fn beats(candidate: &BestQuote, current: &BestQuote) -> bool {
    (
        candidate.price,
        candidate.observed_at,
        std::cmp::Reverse(&candidate.source),
    ) > (
        current.price,
        current.observed_at,
        std::cmp::Reverse(&current.source),
    )
}
