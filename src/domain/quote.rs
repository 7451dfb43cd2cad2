//! Quote records pushed by upstream price sources.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::OddsError;

use super::ids::{EventId, MarketKey, MarketType, Selection, SourceId};
use super::odds::Odds;

/// One observed price for (event, market type, selection, source).
///
/// Quotes are immutable; a newer quote for the same key supersedes the old
/// one in the store. A quote flagged not-live stays in the store but never
/// participates in best-price selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    event: EventId,
    market: MarketType,
    selection: Selection,
    source: SourceId,
    odds: Odds,
    observed_at: DateTime<Utc>,
    #[serde(default = "default_live")]
    live: bool,
}

fn default_live() -> bool {
    true
}

impl Quote {
    /// Create a new quote.
    pub fn new(
        event: impl Into<EventId>,
        market: impl Into<MarketType>,
        selection: impl Into<Selection>,
        source: impl Into<SourceId>,
        odds: Odds,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event: event.into(),
            market: market.into(),
            selection: selection.into(),
            source: source.into(),
            odds,
            observed_at,
            live: true,
        }
    }

    /// Mark the quote as suspended by its source.
    #[must_use]
    pub fn suspended(mut self) -> Self {
        self.live = false;
        self
    }

    /// The market this quote belongs to.
    pub fn market_key(&self) -> MarketKey {
        MarketKey::new(self.event.clone(), self.market.clone())
    }

    pub fn event(&self) -> &EventId {
        &self.event
    }

    pub fn market(&self) -> &MarketType {
        &self.market
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn source(&self) -> &SourceId {
        &self.source
    }

    pub fn odds(&self) -> Odds {
        self.odds
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    /// Whether the source currently honors this price.
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// The quote's normalized decimal price.
    ///
    /// # Errors
    ///
    /// Returns `OddsError` when the carried odds are malformed; such quotes
    /// are rejected at ingestion and never stored.
    pub fn decimal_price(&self) -> Result<Decimal, OddsError> {
        self.odds.to_decimal()
    }

    /// Age of the quote relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.observed_at
    }
}
