//! Configuration loading from TOML files.

use std::path::Path;

use chrono::Duration;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ConfigError, Result};

/// Main configuration: engine tuning plus logging.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Self = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

/// Engine tuning knobs. Every value has a sensible default; all are
/// overridable from the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Minimum profit margin for a candidate opportunity.
    #[serde(default = "default_min_profit_threshold")]
    pub min_profit_threshold: Decimal,

    /// Reference stake to split across a market's selections.
    #[serde(default = "default_total_stake")]
    pub total_stake: Decimal,

    /// Quotes older than this never enter best-price selection.
    #[serde(default = "default_max_quote_age_secs")]
    pub max_quote_age_secs: u64,

    /// How long an opportunity may live after detection.
    #[serde(default = "default_opportunity_window_secs")]
    pub opportunity_window_secs: u64,

    /// How long a candidate has to confirm before it is superseded.
    #[serde(default = "default_confirmation_grace_secs")]
    pub confirmation_grace_secs: u64,

    /// Spreading stake across more distinct sources than this flags the
    /// opportunity as restriction-prone.
    #[serde(default = "default_source_cap")]
    pub source_cap: usize,

    /// Number of market shards; updates to different shards proceed in
    /// parallel.
    #[serde(default = "default_shards")]
    pub shards: usize,

    /// Best-price samples kept per selection for volatility.
    #[serde(default = "default_volatility_window")]
    pub volatility_window: usize,

    /// Rolling period for the rarity ratio, in seconds.
    #[serde(default = "default_rarity_period_secs")]
    pub rarity_period_secs: u64,
}

fn default_min_profit_threshold() -> Decimal {
    dec!(0.042)
}

fn default_total_stake() -> Decimal {
    dec!(1000)
}

fn default_max_quote_age_secs() -> u64 {
    30
}

fn default_opportunity_window_secs() -> u64 {
    120
}

fn default_confirmation_grace_secs() -> u64 {
    10
}

fn default_source_cap() -> usize {
    4
}

fn default_shards() -> usize {
    num_cpus::get().max(2)
}

fn default_volatility_window() -> usize {
    32
}

fn default_rarity_period_secs() -> u64 {
    900
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_profit_threshold: default_min_profit_threshold(),
            total_stake: default_total_stake(),
            max_quote_age_secs: default_max_quote_age_secs(),
            opportunity_window_secs: default_opportunity_window_secs(),
            confirmation_grace_secs: default_confirmation_grace_secs(),
            source_cap: default_source_cap(),
            shards: default_shards(),
            volatility_window: default_volatility_window(),
            rarity_period_secs: default_rarity_period_secs(),
        }
    }
}

impl EngineConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.min_profit_threshold <= Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "min_profit_threshold",
                reason: "must be positive".into(),
            }
            .into());
        }
        if self.total_stake <= Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "total_stake",
                reason: "must be positive".into(),
            }
            .into());
        }
        if self.shards == 0 {
            return Err(ConfigError::InvalidValue {
                field: "shards",
                reason: "at least one shard is required".into(),
            }
            .into());
        }
        if self.max_quote_age_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_quote_age_secs",
                reason: "must be positive".into(),
            }
            .into());
        }
        Ok(())
    }

    pub fn max_quote_age(&self) -> Duration {
        Duration::seconds(self.max_quote_age_secs as i64)
    }

    pub fn opportunity_window(&self) -> Duration {
        Duration::seconds(self.opportunity_window_secs as i64)
    }

    pub fn confirmation_grace(&self) -> Duration {
        Duration::seconds(self.confirmation_grace_secs as i64)
    }

    pub fn rarity_period(&self) -> Duration {
        Duration::seconds(self.rarity_period_secs as i64)
    }
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl LoggingConfig {
    /// Initialize the tracing subscriber with this logging configuration.
    ///
    /// Logs go to stderr; stdout stays reserved for event output.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt()
                    .json()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .init();
            }
            _ => {
                fmt()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .init();
            }
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}
