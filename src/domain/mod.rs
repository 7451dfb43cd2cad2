//! Source-agnostic domain logic: odds math, market state, detection,
//! allocation, and risk metrics.

mod best_price;
mod detector;
mod ids;
mod market;
mod odds;
mod opportunity;
mod quote;
mod risk;
mod stake;

// Identifiers
pub use ids::{EventId, MarketKey, MarketType, Selection, SourceId};

// Prices and quotes
pub use odds::{Odds, OddsFormat};
pub use quote::Quote;

// Market state
pub use market::{MarketGroup, UpsertOutcome};

// Best-price selection
pub use best_price::{select_best, BestPriceSet, BestQuote};

// Detection
pub use detector::{evaluate, ArbFigures, Detection, Efficiency};

// Stake allocation
pub use stake::{allocate, StakeLeg, StakePlan};

// Risk metrics
pub use risk::{assess, PriceHistory, RiskProfile, ScanStats};

// Opportunities
pub use opportunity::{Opportunity, OpportunityStatus};
