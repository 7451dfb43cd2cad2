use rust_decimal::Decimal;
use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// A price that cannot be interpreted as valid odds.
///
/// Quotes carrying such a price are rejected at the ingestion boundary
/// and never reach the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OddsError {
    #[error("american odds cannot be zero")]
    ZeroAmerican,

    #[error("decimal odds must exceed 1, got {0}")]
    SubUnityDecimal(Decimal),

    #[error("fractional denominator must be positive")]
    ZeroDenominator,

    #[error("cannot parse '{input}' as {format} odds")]
    Unparseable { format: String, input: String },
}

/// Degenerate prices that prevent a payout-equalizing stake split.
///
/// Allocation failure suppresses the candidate for that market; it never
/// halts processing of other markets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("implied probability total must be positive, got {0}")]
    NonPositiveImplied(Decimal),

    #[error("price for selection '{selection}' must exceed 1, got {price}")]
    DegeneratePrice { selection: String, price: Decimal },

    #[error("total stake must be positive, got {0}")]
    NonPositiveStake(Decimal),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Odds(#[from] OddsError),

    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("engine is shut down")]
    EngineClosed,
}

pub type Result<T> = std::result::Result<T, Error>;
