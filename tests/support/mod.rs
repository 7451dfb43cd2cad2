#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use oddsmith::domain::{MarketGroup, MarketKey, Odds, Quote};
use rust_decimal::Decimal;

/// Fixed base instant for deterministic tests.
pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

pub fn quote(
    event: &str,
    market: &str,
    selection: &str,
    source: &str,
    price: Decimal,
    at: DateTime<Utc>,
) -> Quote {
    Quote::new(event, market, selection, source, Odds::decimal(price), at)
}

/// A quote observed right now, for tests that run against the wall clock.
pub fn fresh_quote(
    event: &str,
    market: &str,
    selection: &str,
    source: &str,
    price: Decimal,
) -> Quote {
    quote(event, market, selection, source, price, Utc::now())
}

/// Build a market group from (selection, source, price) triples observed
/// at one instant.
pub fn group(
    event: &str,
    market: &str,
    quotes: &[(&str, &str, Decimal)],
    at: DateTime<Utc>,
) -> MarketGroup {
    let mut group = MarketGroup::new(MarketKey::new(event, market));
    for (selection, source, price) in quotes {
        group.upsert(quote(event, market, selection, source, *price, at));
    }
    group
}
