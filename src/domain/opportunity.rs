//! Opportunity records and their lifecycle status.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{MarketKey, RiskProfile, SourceId, StakePlan};

/// Where an opportunity sits in its lifecycle.
///
/// `Candidate` and `Active` are live; `Expired` and `Executed` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityStatus {
    /// Margin just crossed the threshold; awaiting confirmation.
    Candidate,
    /// Margin held across at least one subsequent recomputation inside the
    /// grace window.
    Active,
    /// Margin fell away, supporting quotes went stale, or the opportunity
    /// window elapsed.
    Expired,
    /// Externally confirmed as placed.
    Executed,
}

impl OpportunityStatus {
    /// Whether the opportunity can still transition.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Candidate | Self::Active)
    }
}

/// A detected arbitrage opportunity for one market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    id: Uuid,
    market: MarketKey,
    margin: Decimal,
    implied_total: Decimal,
    stakes: StakePlan,
    sources: Vec<SourceId>,
    risk: RiskProfile,
    status: OpportunityStatus,
    detected_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Opportunity {
    /// Create a fresh candidate.
    pub fn candidate(
        market: MarketKey,
        margin: Decimal,
        implied_total: Decimal,
        stakes: StakePlan,
        sources: Vec<SourceId>,
        risk: RiskProfile,
        detected_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            market,
            margin,
            implied_total,
            stakes,
            sources,
            risk,
            status: OpportunityStatus::Candidate,
            detected_at,
            expires_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn market(&self) -> &MarketKey {
        &self.market
    }

    /// Guaranteed profit per unit staked.
    pub fn margin(&self) -> Decimal {
        self.margin
    }

    pub fn implied_total(&self) -> Decimal {
        self.implied_total
    }

    pub fn stakes(&self) -> &StakePlan {
        &self.stakes
    }

    /// Distinct sources the stake split spreads across.
    pub fn sources(&self) -> &[SourceId] {
        &self.sources
    }

    pub fn risk(&self) -> &RiskProfile {
        &self.risk
    }

    pub fn status(&self) -> OpportunityStatus {
        self.status
    }

    pub fn detected_at(&self) -> DateTime<Utc> {
        self.detected_at
    }

    /// When the opportunity window closes, measured from detection.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Promote a confirmed candidate, refreshing its figures from the
    /// latest recomputation.
    pub(crate) fn promote(
        &mut self,
        margin: Decimal,
        implied_total: Decimal,
        stakes: StakePlan,
        sources: Vec<SourceId>,
        risk: RiskProfile,
    ) {
        self.status = OpportunityStatus::Active;
        self.refresh(margin, implied_total, stakes, sources, risk);
    }

    /// Refresh figures without changing status.
    pub(crate) fn refresh(
        &mut self,
        margin: Decimal,
        implied_total: Decimal,
        stakes: StakePlan,
        sources: Vec<SourceId>,
        risk: RiskProfile,
    ) {
        self.margin = margin;
        self.implied_total = implied_total;
        self.stakes = stakes;
        self.sources = sources;
        self.risk = risk;
    }

    pub(crate) fn expire(&mut self) {
        self.status = OpportunityStatus::Expired;
    }

    pub(crate) fn execute(&mut self) {
        self.status = OpportunityStatus::Executed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{allocate, select_best, MarketGroup, MarketType, Odds, Quote};
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn make_candidate() -> Opportunity {
        let mut group = MarketGroup::new(MarketKey::new("derby", "match_winner"));
        for (sel, price) in [("home", dec!(2.20)), ("away", dec!(2.10))] {
            group.upsert(Quote::new(
                "derby",
                "match_winner",
                sel,
                "pinnacle",
                Odds::decimal(price),
                ts(0),
            ));
        }
        let best = select_best(&group, ts(1), Duration::seconds(30)).unwrap();
        let plan = allocate(&best, dec!(1000)).unwrap();
        let risk = RiskProfile {
            volatility: BTreeMap::new(),
            restricted: false,
            rarity: Decimal::ZERO,
        };
        Opportunity::candidate(
            MarketKey::new("derby", "match_winner"),
            dec!(0.0744),
            best.implied_total(),
            plan,
            best.sources(),
            risk,
            ts(1),
            ts(121),
        )
    }

    #[test]
    fn candidate_starts_live() {
        let opp = make_candidate();
        assert_eq!(opp.status(), OpportunityStatus::Candidate);
        assert!(opp.status().is_live());
        assert_eq!(opp.market().market(), &MarketType::from("match_winner"));
    }

    #[test]
    fn terminal_states_are_not_live() {
        assert!(!OpportunityStatus::Expired.is_live());
        assert!(!OpportunityStatus::Executed.is_live());
    }

    #[test]
    fn unique_ids_per_candidate() {
        let a = make_candidate();
        let b = make_candidate();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn serializes_with_status_tag() {
        let opp = make_candidate();
        let json = serde_json::to_string(&opp).unwrap();
        assert!(json.contains("\"candidate\""));
    }
}
