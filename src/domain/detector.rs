//! Arbitrage detection over a consolidated best-price set.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::BestPriceSet;

/// Margin figures for a market whose combined implied probability is
/// below 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbFigures {
    /// Sum of implied probabilities across selections.
    pub implied_total: Decimal,
    /// Guaranteed profit per unit staked: `(1 - implied) / implied`.
    pub margin: Decimal,
}

/// Efficiency figures for a market priced at or above fair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Efficiency {
    /// Combined implied probability; 1.0 is a perfectly efficient book.
    pub market_efficiency: Decimal,
    /// Bookmaker take in percent: `(implied - 1) * 100`.
    pub house_edge: Decimal,
}

/// Outcome of evaluating one best-price set.
///
/// Purely deterministic: identical input always yields identical output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// Guaranteed-profit condition with margin above the configured
    /// minimum.
    Arb(ArbFigures),
    /// Implied total below 1 but margin under the minimum; a near-miss
    /// worth surfacing to diagnostics, never a candidate.
    Thin(ArbFigures),
    /// No edge: the book keeps its overround.
    Overround(Efficiency),
}

impl Detection {
    pub fn is_arb(&self) -> bool {
        matches!(self, Detection::Arb(_))
    }
}

/// Evaluate a best-price set against the minimum profit margin.
pub fn evaluate(best: &BestPriceSet, min_margin: Decimal) -> Detection {
    let implied_total = best.implied_total();

    if implied_total >= Decimal::ONE {
        return Detection::Overround(Efficiency {
            market_efficiency: implied_total,
            house_edge: (implied_total - Decimal::ONE) * Decimal::ONE_HUNDRED,
        });
    }

    let figures = ArbFigures {
        implied_total,
        margin: (Decimal::ONE - implied_total) / implied_total,
    };

    if figures.margin > min_margin {
        Detection::Arb(figures)
    } else {
        Detection::Thin(figures)
    }
}
