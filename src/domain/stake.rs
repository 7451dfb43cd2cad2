//! Payout-equalizing stake allocation.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::{BestPriceSet, Selection, SourceId};
use crate::error::AllocationError;

/// One leg of a stake plan: how much to place, where, at what price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeLeg {
    pub selection: Selection,
    pub source: SourceId,
    pub price: Decimal,
    pub stake: Decimal,
}

impl StakeLeg {
    /// Payout if this selection is realized: `stake * price`.
    pub fn payout(&self) -> Decimal {
        self.stake * self.price
    }
}

/// A stake split across a market's selections.
///
/// Stakes are non-negative, rounded to cents, and sum exactly to the
/// requested total; payouts are equal across selections within rounding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePlan {
    legs: Vec<StakeLeg>,
    total: Decimal,
    payout: Decimal,
}

impl StakePlan {
    /// Stake legs, one per selection, in selection order.
    pub fn legs(&self) -> &[StakeLeg] {
        &self.legs
    }

    /// The full amount staked across all legs.
    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Expected payout under every outcome: `total / implied_total`.
    pub fn payout(&self) -> Decimal {
        self.payout
    }
}

/// Split `total_stake` across the best prices so every outcome pays the
/// same: `stake(sel) = total * (1/price(sel)) / implied_total`.
///
/// Residual rounding cents are assigned to the largest stake so the sum is
/// exact.
///
/// # Errors
///
/// Returns `AllocationError` when the implied total is non-positive, any
/// price is at or below 1, or the stake itself is non-positive. Failure
/// suppresses the candidate; it never aborts processing.
pub fn allocate(best: &BestPriceSet, total_stake: Decimal) -> Result<StakePlan, AllocationError> {
    if total_stake <= Decimal::ZERO {
        return Err(AllocationError::NonPositiveStake(total_stake));
    }

    let implied_total = best.implied_total();
    if implied_total <= Decimal::ZERO {
        return Err(AllocationError::NonPositiveImplied(implied_total));
    }

    let mut legs = Vec::with_capacity(best.len());
    for (selection, quote) in best.prices() {
        if quote.price <= Decimal::ONE {
            return Err(AllocationError::DegeneratePrice {
                selection: selection.to_string(),
                price: quote.price,
            });
        }
        let raw = total_stake * (Decimal::ONE / quote.price) / implied_total;
        legs.push(StakeLeg {
            selection: selection.clone(),
            source: quote.source.clone(),
            price: quote.price,
            stake: raw.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        });
    }

    // Push the rounding residual into the largest leg; it dominates the
    // residual magnitude, so stakes stay non-negative.
    let allocated: Decimal = legs.iter().map(|leg| leg.stake).sum();
    let residual = total_stake - allocated;
    if !residual.is_zero() {
        if let Some(largest) = legs.iter_mut().max_by_key(|leg| leg.stake) {
            largest.stake += residual;
        }
    }

    let payout = (total_stake / implied_total)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    Ok(StakePlan {
        legs,
        total: total_stake,
        payout,
    })
}
