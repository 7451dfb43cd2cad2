//! Opportunity lifecycle management.
//!
//! Transitions are pure functions of (current status, latest assessment,
//! evaluation instant); there are no background timers. Window checks run
//! at each recomputation.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;

use crate::domain::{MarketKey, Opportunity, OpportunityStatus, RiskProfile, SourceId, StakePlan};
use crate::engine::events::{ExpiryReason, LifecycleEvent};

/// Window configuration for lifecycle transitions.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// How long an opportunity may live after detection.
    pub opportunity_window: Duration,
    /// How long a candidate has to confirm before it is superseded.
    pub confirmation_grace: Duration,
}

/// Figures backing a candidate-grade detection.
#[derive(Debug, Clone)]
pub struct CandidateFigures {
    pub margin: Decimal,
    pub implied_total: Decimal,
    pub stakes: StakePlan,
    pub sources: Vec<SourceId>,
    pub risk: RiskProfile,
}

/// Why a recomputation produced no candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortfall {
    /// Implied total below 1 but margin under the threshold.
    BelowThreshold,
    /// The book keeps its overround.
    Overround,
    /// Eligible quotes are missing for at least one selection.
    InsufficientData,
    /// Degenerate prices prevented a stake split.
    AllocationFailed,
}

/// The lifecycle-relevant summary of one recomputation.
#[derive(Debug, Clone)]
pub enum Assessment {
    Candidate(CandidateFigures),
    NoCandidate(Shortfall),
}

/// Apply one recomputation to a market's live opportunity.
///
/// Returns the opportunity to keep live (if any) plus the transitions to
/// publish, in order.
pub fn transition(
    current: Option<Opportunity>,
    key: &MarketKey,
    assessment: Assessment,
    now: DateTime<Utc>,
    config: &LifecycleConfig,
) -> (Option<Opportunity>, Vec<LifecycleEvent>) {
    match (current, assessment) {
        (None, Assessment::Candidate(figures)) => {
            let fresh = new_candidate(key, figures, now, config);
            let events = vec![LifecycleEvent::Detected {
                opportunity: fresh.clone(),
            }];
            (Some(fresh), events)
        }

        (None, Assessment::NoCandidate(_)) => (None, Vec::new()),

        (Some(mut opp), Assessment::Candidate(figures)) => {
            if now >= opp.expires_at() {
                // The old window closed; the persisting margin starts a
                // fresh candidate rather than extending the record
                return supersede(opp, key, figures, now, config, ExpiryReason::WindowElapsed);
            }
            match opp.status() {
                OpportunityStatus::Candidate => {
                    if now <= opp.detected_at() + config.confirmation_grace {
                        opp.promote(
                            figures.margin,
                            figures.implied_total,
                            figures.stakes,
                            figures.sources,
                            figures.risk,
                        );
                        let events = vec![LifecycleEvent::Confirmed {
                            opportunity: opp.clone(),
                        }];
                        (Some(opp), events)
                    } else {
                        supersede(opp, key, figures, now, config, ExpiryReason::ConfirmationLapsed)
                    }
                }
                OpportunityStatus::Active => {
                    opp.refresh(
                        figures.margin,
                        figures.implied_total,
                        figures.stakes,
                        figures.sources,
                        figures.risk,
                    );
                    (Some(opp), Vec::new())
                }
                // Terminal records never stay live; treat as absent
                OpportunityStatus::Expired | OpportunityStatus::Executed => {
                    let fresh = new_candidate(key, figures, now, config);
                    let events = vec![LifecycleEvent::Detected {
                        opportunity: fresh.clone(),
                    }];
                    (Some(fresh), events)
                }
            }
        }

        (Some(mut opp), Assessment::NoCandidate(shortfall)) => {
            let reason = if now >= opp.expires_at() {
                ExpiryReason::WindowElapsed
            } else if shortfall == Shortfall::InsufficientData {
                ExpiryReason::QuotesStale
            } else {
                ExpiryReason::MarginGone
            };
            opp.expire();
            let events = vec![LifecycleEvent::Expired {
                opportunity: opp,
                reason,
            }];
            (None, events)
        }
    }
}

/// Apply an external execution confirmation.
///
/// Only an active opportunity can be executed; a bare candidate has not
/// survived its noise filter yet and the signal is ignored.
pub fn confirm(
    current: Option<Opportunity>,
) -> (Option<Opportunity>, Vec<LifecycleEvent>) {
    match current {
        Some(mut opp) if opp.status() == OpportunityStatus::Active => {
            opp.execute();
            let events = vec![LifecycleEvent::Executed { opportunity: opp }];
            (None, events)
        }
        other => (other, Vec::new()),
    }
}

fn new_candidate(
    key: &MarketKey,
    figures: CandidateFigures,
    now: DateTime<Utc>,
    config: &LifecycleConfig,
) -> Opportunity {
    Opportunity::candidate(
        key.clone(),
        figures.margin,
        figures.implied_total,
        figures.stakes,
        figures.sources,
        figures.risk,
        now,
        now + config.opportunity_window,
    )
}

fn supersede(
    mut old: Opportunity,
    key: &MarketKey,
    figures: CandidateFigures,
    now: DateTime<Utc>,
    config: &LifecycleConfig,
    reason: ExpiryReason,
) -> (Option<Opportunity>, Vec<LifecycleEvent>) {
    old.expire();
    let fresh = new_candidate(key, figures, now, config);
    let events = vec![
        LifecycleEvent::Expired {
            opportunity: old,
            reason,
        },
        LifecycleEvent::Detected {
            opportunity: fresh.clone(),
        },
    ];
    (Some(fresh), events)
}

/// Tracks live opportunities across markets.
///
/// Mutation for one key only ever happens inside that key's serialized
/// shard section; reads may come from anywhere.
pub struct LifecycleManager {
    config: LifecycleConfig,
    book: Arc<DashMap<MarketKey, Opportunity>>,
}

impl LifecycleManager {
    pub fn new(config: LifecycleConfig, book: Arc<DashMap<MarketKey, Opportunity>>) -> Self {
        Self { config, book }
    }

    /// Fold one recomputation into the book, returning the transitions to
    /// publish.
    pub fn observe(
        &self,
        key: &MarketKey,
        assessment: Assessment,
        now: DateTime<Utc>,
    ) -> Vec<LifecycleEvent> {
        let current = self.book.remove(key).map(|(_, opp)| opp);
        let (next, events) = transition(current, key, assessment, now, &self.config);
        if let Some(opp) = next {
            self.book.insert(key.clone(), opp);
        }
        events
    }

    /// Fold an external execution confirmation into the book.
    pub fn confirm_execution(&self, key: &MarketKey) -> Vec<LifecycleEvent> {
        let current = self.book.remove(key).map(|(_, opp)| opp);
        let (next, events) = confirm(current);
        if let Some(opp) = next {
            self.book.insert(key.clone(), opp);
        }
        events
    }
}
