//! Odds conversion command.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::domain::{Odds, OddsFormat};
use crate::error::{Error, OddsError, Result};

/// Convert a price between formats and print the result.
pub fn execute(value: &str, from: &str, to: &str) -> Result<()> {
    let from = OddsFormat::from_str(from)?;
    let to = OddsFormat::from_str(to)?;

    let odds = parse_odds(value, from)?;
    let converted = odds.convert(to)?;

    println!("{odds} ({from}) = {converted} ({to})");
    Ok(())
}

/// Parse a price literal in the given format. Fractional odds are written
/// "num/den"; the other formats are plain decimals.
fn parse_odds(value: &str, format: OddsFormat) -> Result<Odds> {
    let unparseable = || {
        Error::Odds(OddsError::Unparseable {
            format: format.to_string(),
            input: value.to_string(),
        })
    };

    match format {
        OddsFormat::Fractional => {
            let (num, den) = value.split_once('/').ok_or_else(unparseable)?;
            let num = num.trim().parse::<u32>().map_err(|_| unparseable())?;
            let den = den.trim().parse::<u32>().map_err(|_| unparseable())?;
            Ok(Odds::fractional(num, den))
        }
        OddsFormat::American => {
            let parsed = Decimal::from_str(value.trim().trim_start_matches('+'))
                .map_err(|_| unparseable())?;
            Ok(Odds::american(parsed))
        }
        OddsFormat::Decimal => {
            let parsed = Decimal::from_str(value.trim()).map_err(|_| unparseable())?;
            Ok(Odds::decimal(parsed))
        }
    }
}
