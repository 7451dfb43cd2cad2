//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        ///
        /// The inner String is private to ensure all construction goes through
        /// the defined constructors.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }
    };
}

string_id! {
    /// Event identifier - newtype for type safety.
    EventId
}

string_id! {
    /// Market type identifier (e.g. "match_winner", "total_over_under").
    MarketType
}

string_id! {
    /// Selection identifier - one outcome within a market.
    Selection
}

string_id! {
    /// Quote source identifier - one bookmaker.
    SourceId
}

/// The comparison unit: one event, one market type, across all selections
/// and sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarketKey {
    event: EventId,
    market: MarketType,
}

impl MarketKey {
    /// Create a new market key.
    pub fn new(event: impl Into<EventId>, market: impl Into<MarketType>) -> Self {
        Self {
            event: event.into(),
            market: market.into(),
        }
    }

    /// Get the event identifier.
    pub fn event(&self) -> &EventId {
        &self.event
    }

    /// Get the market type.
    pub fn market(&self) -> &MarketType {
        &self.market
    }
}

impl fmt::Display for MarketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.event, self.market)
    }
}
