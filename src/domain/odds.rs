//! Odds representations and conversions.
//!
//! Three price formats are supported: american (+150 / -200), decimal
//! (2.50), and fractional (3/2). Decimal is the normalized intermediate
//! for every conversion, and all arithmetic stays in [`Decimal`] so stake
//! amounts below one currency unit are exact.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::OddsError;

/// Largest denominator considered when approximating a decimal price as a
/// fraction.
const MAX_FRACTIONAL_DENOMINATOR: u32 = 100;

/// The three supported price formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OddsFormat {
    American,
    Decimal,
    Fractional,
}

impl fmt::Display for OddsFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::American => "american",
            Self::Decimal => "decimal",
            Self::Fractional => "fractional",
        };
        write!(f, "{name}")
    }
}

impl FromStr for OddsFormat {
    type Err = OddsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "american" => Ok(Self::American),
            "decimal" => Ok(Self::Decimal),
            "fractional" => Ok(Self::Fractional),
            other => Err(OddsError::Unparseable {
                format: "odds format".into(),
                input: other.into(),
            }),
        }
    }
}

/// A price in one of the supported formats.
///
/// Construction does not validate; call [`Odds::to_decimal`] or
/// [`Odds::convert`] to surface `InvalidOdds`-class errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum Odds {
    American { value: Decimal },
    Decimal { value: Decimal },
    Fractional { num: u32, den: u32 },
}

impl Odds {
    /// American odds, e.g. `+150` or `-200`.
    pub fn american(value: Decimal) -> Self {
        Self::American { value }
    }

    /// Decimal odds: payout multiple per unit stake, stake inclusive.
    pub fn decimal(value: Decimal) -> Self {
        Self::Decimal { value }
    }

    /// Fractional odds, e.g. `3/2`.
    pub fn fractional(num: u32, den: u32) -> Self {
        Self::Fractional { num, den }
    }

    /// The format this price is expressed in.
    pub fn format(&self) -> OddsFormat {
        match self {
            Self::American { .. } => OddsFormat::American,
            Self::Decimal { .. } => OddsFormat::Decimal,
            Self::Fractional { .. } => OddsFormat::Fractional,
        }
    }

    /// Normalize to a decimal price.
    ///
    /// # Errors
    ///
    /// Returns `OddsError` when the price is malformed: american zero,
    /// decimal at or below 1, or a zero fractional denominator.
    pub fn to_decimal(&self) -> Result<Decimal, OddsError> {
        let hundred = Decimal::ONE_HUNDRED;
        let decimal = match *self {
            Self::American { value } => {
                if value.is_zero() {
                    return Err(OddsError::ZeroAmerican);
                }
                if value > Decimal::ZERO {
                    value / hundred + Decimal::ONE
                } else {
                    hundred / value.abs() + Decimal::ONE
                }
            }
            Self::Decimal { value } => value,
            Self::Fractional { num, den } => {
                if den == 0 {
                    return Err(OddsError::ZeroDenominator);
                }
                Decimal::from(num) / Decimal::from(den) + Decimal::ONE
            }
        };

        if decimal <= Decimal::ONE {
            return Err(OddsError::SubUnityDecimal(decimal));
        }
        Ok(decimal)
    }

    /// Implied probability of this price: `1 / decimal`.
    pub fn implied_probability(&self) -> Result<Decimal, OddsError> {
        Ok(Decimal::ONE / self.to_decimal()?)
    }

    /// Convert to another format, via decimal as the intermediate.
    pub fn convert(&self, to: OddsFormat) -> Result<Odds, OddsError> {
        let decimal = self.to_decimal()?;
        Ok(match to {
            OddsFormat::Decimal => Odds::Decimal { value: decimal },
            OddsFormat::American => Odds::American {
                value: decimal_to_american(decimal),
            },
            OddsFormat::Fractional => {
                let (num, den) = decimal_to_fractional(decimal);
                Odds::Fractional { num, den }
            }
        })
    }
}

impl fmt::Display for Odds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::American { value } => {
                if value > Decimal::ZERO {
                    write!(f, "+{value}")
                } else {
                    write!(f, "{value}")
                }
            }
            Self::Decimal { value } => write!(f, "{value}"),
            Self::Fractional { num, den } => write!(f, "{num}/{den}"),
        }
    }
}

/// Convert a validated decimal price to american odds.
///
/// `d >= 2` maps to the positive range, `1 < d < 2` to the negative range.
fn decimal_to_american(decimal: Decimal) -> Decimal {
    let hundred = Decimal::ONE_HUNDRED;
    if decimal >= Decimal::TWO {
        (decimal - Decimal::ONE) * hundred
    } else {
        -hundred / (decimal - Decimal::ONE)
    }
}

/// Approximate a validated decimal price as a fraction with denominator
/// at most [`MAX_FRACTIONAL_DENOMINATOR`].
fn decimal_to_fractional(decimal: Decimal) -> (u32, u32) {
    let target = decimal - Decimal::ONE;
    let mut best = (1u32, 1u32);
    let mut best_error = Decimal::MAX;

    for den in 1..=MAX_FRACTIONAL_DENOMINATOR {
        let den_dec = Decimal::from(den);
        let num_dec = (target * den_dec).round();
        let Some(num) = num_dec.to_u32() else {
            continue;
        };
        if num == 0 {
            continue;
        }
        let error = (target - Decimal::from(num) / den_dec).abs();
        if error < best_error {
            best = (num, den);
            best_error = error;
            if error.is_zero() {
                break;
            }
        }
    }

    best
}
