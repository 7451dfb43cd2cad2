//! Lifecycle transition events and subscription filtering.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::domain::{Efficiency, EventId, MarketKey, Opportunity};

/// Why an opportunity left the live set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryReason {
    /// Margin recomputed at or below the threshold.
    MarginGone,
    /// No supporting quote refreshed within the maximum age.
    QuotesStale,
    /// The opportunity window elapsed since detection.
    WindowElapsed,
    /// The candidate was not confirmed within the grace window.
    ConfirmationLapsed,
}

/// A lifecycle transition, published on every status change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "transition", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// A candidate crossed the margin threshold.
    Detected { opportunity: Opportunity },
    /// The candidate held its margin and became active.
    Confirmed { opportunity: Opportunity },
    /// The opportunity left the live set.
    Expired {
        opportunity: Opportunity,
        reason: ExpiryReason,
    },
    /// An external confirmation marked the opportunity as placed.
    Executed { opportunity: Opportunity },
}

impl LifecycleEvent {
    /// The opportunity this transition concerns.
    pub fn opportunity(&self) -> &Opportunity {
        match self {
            Self::Detected { opportunity }
            | Self::Confirmed { opportunity }
            | Self::Expired { opportunity, .. }
            | Self::Executed { opportunity } => opportunity,
        }
    }

    /// The market this transition concerns.
    pub fn market(&self) -> &MarketKey {
        self.opportunity().market()
    }
}

/// Which markets a subscriber wants to hear about.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MarketFilter {
    /// Every market.
    #[default]
    All,
    /// Every market of one event.
    Event(EventId),
    /// Exactly one market.
    Market(MarketKey),
}

impl MarketFilter {
    pub fn matches(&self, key: &MarketKey) -> bool {
        match self {
            Self::All => true,
            Self::Event(event) => key.event() == event,
            Self::Market(market) => key == market,
        }
    }
}

/// A lazy, restartable sequence of lifecycle transitions.
///
/// Each subscription observes transitions published after it was created;
/// dropping the stream and subscribing again restarts the sequence from
/// the current state of the world. A slow consumer that lags behind the
/// buffer skips the overwritten transitions rather than stalling the
/// engine.
pub struct EventStream {
    rx: broadcast::Receiver<LifecycleEvent>,
    filter: MarketFilter,
}

impl EventStream {
    pub(crate) fn new(rx: broadcast::Receiver<LifecycleEvent>, filter: MarketFilter) -> Self {
        Self { rx, filter }
    }

    /// Next matching transition, or `None` once the engine shuts down.
    pub async fn recv(&mut self) -> Option<LifecycleEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if self.filter.matches(event.market()) => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event subscriber lagged; transitions skipped");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Read-only detection result for one market, as returned by queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectionReport {
    /// A live (or freshly computed) opportunity.
    Opportunity { opportunity: Opportunity },
    /// Implied total below 1 but margin under the threshold.
    Thin {
        implied_total: Decimal,
        margin: Decimal,
    },
    /// An efficient or overround book.
    Efficiency(Efficiency),
    /// The market lacks eligible quotes for every selection.
    InsufficientData,
}
