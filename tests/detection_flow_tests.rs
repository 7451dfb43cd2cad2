//! End-to-end detection flows over the pure domain pipeline.

mod support;

use chrono::Duration;
use oddsmith::domain::{allocate, evaluate, select_best, Detection, Selection};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use support::{group, ts};

fn max_age() -> Duration {
    Duration::seconds(30)
}

#[test]
fn two_way_arbitrage_end_to_end() {
    // Three sources quoting both sides; the best cross-source pair is
    // 2.20 / 2.10
    let group = group(
        "derby",
        "match_winner",
        &[
            ("x", "betway", dec!(2.05)),
            ("x", "pinnacle", dec!(2.10)),
            ("x", "betfair", dec!(2.20)),
            ("y", "betway", dec!(2.10)),
            ("y", "pinnacle", dec!(1.95)),
            ("y", "betfair", dec!(1.90)),
        ],
        ts(0),
    );

    let best = select_best(&group, ts(1), max_age()).unwrap();
    assert_eq!(best.prices()[&Selection::from("x")].price, dec!(2.20));
    assert_eq!(best.prices()[&Selection::from("x")].source.as_str(), "betfair");
    assert_eq!(best.prices()[&Selection::from("y")].price, dec!(2.10));
    assert_eq!(best.prices()[&Selection::from("y")].source.as_str(), "betway");

    let Detection::Arb(figures) = evaluate(&best, dec!(0.042)) else {
        panic!("expected an arbitrage");
    };
    assert!(figures.implied_total > dec!(0.9307) && figures.implied_total < dec!(0.9308));
    assert!(figures.margin > dec!(0.0744) && figures.margin < dec!(0.0745));

    let plan = allocate(&best, dec!(1000)).unwrap();
    let x = plan.legs().iter().find(|l| l.selection.as_str() == "x").unwrap();
    let y = plan.legs().iter().find(|l| l.selection.as_str() == "y").unwrap();

    assert!((x.stake - dec!(488.3)).abs() < dec!(0.2));
    assert!((y.stake - dec!(511.7)).abs() < dec!(0.2));
    assert_eq!(x.stake + y.stake, dec!(1000));

    // Equal payout either way, around 1074.4
    assert!((x.payout() - y.payout()).abs() < dec!(0.5));
    assert!((plan.payout() - dec!(1074.4)).abs() < dec!(0.5));
}

#[test]
fn efficient_market_reports_house_edge() {
    // 2/1.94 implies ~1.031: a ~3% overround, no opportunity
    let group = group(
        "derby",
        "match_winner",
        &[("x", "pinnacle", dec!(1.94)), ("y", "pinnacle", dec!(1.94))],
        ts(0),
    );

    let best = select_best(&group, ts(1), max_age()).unwrap();
    let Detection::Overround(efficiency) = evaluate(&best, dec!(0.042)) else {
        panic!("expected an overround book");
    };

    assert!(efficiency.market_efficiency > Decimal::ONE);
    assert!(efficiency.house_edge > dec!(3.0) && efficiency.house_edge < dec!(3.2));
}

#[test]
fn detection_is_deterministic_for_identical_snapshots() {
    let group = group(
        "derby",
        "match_winner",
        &[("x", "betfair", dec!(2.20)), ("y", "betway", dec!(2.10))],
        ts(0),
    );

    let first = select_best(&group, ts(1), max_age()).unwrap();
    let second = select_best(&group, ts(1), max_age()).unwrap();
    assert_eq!(first, second);
    assert_eq!(evaluate(&first, dec!(0.042)), evaluate(&second, dec!(0.042)));
}

#[test]
fn stale_best_quote_downgrades_market() {
    // betfair's 2.20 would make this an arb, but it is 40s old
    let mut market = group(
        "derby",
        "match_winner",
        &[("x", "betfair", dec!(2.20)), ("y", "betway", dec!(2.10))],
        ts(0),
    );
    market.upsert(support::quote("derby", "match_winner", "x", "betway", dec!(1.95), ts(35)));
    market.upsert(support::quote("derby", "match_winner", "y", "pinnacle", dec!(1.90), ts(35)));

    let best = select_best(&market, ts(40), max_age()).unwrap();
    assert_eq!(best.prices()[&Selection::from("x")].price, dec!(1.95));

    // Without the stale 2.20 there is no edge left
    assert!(!evaluate(&best, dec!(0.042)).is_arb());
}

#[test]
fn market_missing_a_selection_is_skipped() {
    let market = group(
        "derby",
        "match_winner",
        &[("x", "betfair", dec!(2.20))],
        ts(0),
    );
    assert!(select_best(&market, ts(1), max_age()).is_none());
}

#[test]
fn stakes_sum_exactly_for_many_stake_sizes() {
    let group = group(
        "derby",
        "match_winner",
        &[("x", "betfair", dec!(2.20)), ("y", "betway", dec!(2.10))],
        ts(0),
    );
    let best = select_best(&group, ts(1), max_age()).unwrap();

    for total in [dec!(1), dec!(10), dec!(99.99), dec!(1000), dec!(123456.78)] {
        let plan = allocate(&best, total).unwrap();
        let sum: Decimal = plan.legs().iter().map(|l| l.stake).sum();
        assert_eq!(sum, total, "stakes must sum exactly for total {total}");
    }
}
