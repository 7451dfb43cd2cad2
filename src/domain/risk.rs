//! Descriptive risk metrics for detected opportunities.
//!
//! Everything here is advisory: volatility, restriction heuristics, and
//! rarity describe an opportunity but never gate detection.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{BestPriceSet, Selection};

/// Trailing best-price history for one market, selection by selection.
///
/// Backs the per-selection volatility metric. The window is bounded; the
/// oldest samples fall off as new best prices are recorded.
#[derive(Debug, Clone)]
pub struct PriceHistory {
    window: usize,
    series: BTreeMap<Selection, VecDeque<Decimal>>,
}

impl PriceHistory {
    /// Create a history keeping at most `window` samples per selection.
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            series: BTreeMap::new(),
        }
    }

    /// Record the current best price per selection.
    pub fn record(&mut self, best: &BestPriceSet) {
        for (selection, quote) in best.prices() {
            let samples = self.series.entry(selection.clone()).or_default();
            if samples.len() == self.window {
                samples.pop_front();
            }
            samples.push_back(quote.price);
        }
    }

    /// Population variance of the recorded prices for one selection.
    ///
    /// Zero when fewer than two samples exist.
    pub fn variance(&self, selection: &Selection) -> Decimal {
        let Some(samples) = self.series.get(selection) else {
            return Decimal::ZERO;
        };
        if samples.len() < 2 {
            return Decimal::ZERO;
        }

        let count = Decimal::from(samples.len());
        let mean: Decimal = samples.iter().sum::<Decimal>() / count;
        samples
            .iter()
            .map(|price| {
                let delta = *price - mean;
                delta * delta
            })
            .sum::<Decimal>()
            / count
    }
}

/// Rolling detection statistics across all markets: how often scans find
/// an opportunity.
#[derive(Debug)]
pub struct ScanStats {
    period: Duration,
    scans: VecDeque<(DateTime<Utc>, bool)>,
}

impl ScanStats {
    /// Track scans within the trailing `period`.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            scans: VecDeque::new(),
        }
    }

    /// Record one market scan and whether it found an opportunity.
    pub fn record(&mut self, now: DateTime<Utc>, found: bool) {
        self.scans.push_back((now, found));
        let cutoff = now - self.period;
        while let Some((at, _)) = self.scans.front() {
            if *at < cutoff {
                self.scans.pop_front();
            } else {
                break;
            }
        }
    }

    /// Opportunities found per market scanned over the rolling period.
    ///
    /// Zero when nothing has been scanned yet.
    pub fn rarity(&self) -> Decimal {
        if self.scans.is_empty() {
            return Decimal::ZERO;
        }
        let found = self.scans.iter().filter(|(_, hit)| *hit).count();
        Decimal::from(found) / Decimal::from(self.scans.len())
    }

    /// Markets scanned within the rolling period.
    pub fn scanned(&self) -> usize {
        self.scans.len()
    }
}

/// Descriptive risk metadata attached to an opportunity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskProfile {
    /// Best-price variance per selection over the trailing window.
    pub volatility: BTreeMap<Selection, Decimal>,
    /// True when the stake spreads across more distinct sources than the
    /// configured cap; wide spreads draw bookmaker scrutiny.
    pub restricted: bool,
    /// Opportunities found per market scanned over the rolling period.
    pub rarity: Decimal,
}

/// Assess a best-price set against its trailing history.
pub fn assess(
    best: &BestPriceSet,
    history: &PriceHistory,
    rarity: Decimal,
    source_cap: usize,
) -> RiskProfile {
    let volatility = best
        .prices()
        .keys()
        .map(|selection| (selection.clone(), history.variance(selection)))
        .collect();

    RiskProfile {
        volatility,
        restricted: best.sources().len() > source_cap,
        rarity,
    }
}
