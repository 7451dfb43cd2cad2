//! Engine-level behavior: sharded ingestion, subscriptions, lifecycle.

mod support;

use std::time::Duration;

use oddsmith::config::EngineConfig;
use oddsmith::domain::{EventId, Odds, OpportunityStatus, Quote};
use oddsmith::engine::{DetectionReport, Engine, EventStream, LifecycleEvent, MarketFilter};
use rust_decimal_macros::dec;
use support::fresh_quote;

async fn next_event(stream: &mut EventStream) -> LifecycleEvent {
    tokio::time::timeout(Duration::from_secs(5), stream.recv())
        .await
        .expect("timed out waiting for lifecycle event")
        .expect("event channel closed")
}

#[tokio::test]
async fn concurrent_markets_detect_independently() {
    let engine = Engine::spawn(EngineConfig::default());
    let mut events = engine.subscribe(MarketFilter::All);

    // Two distinct markets, both arbitrageable
    for (event, market) in [("derby", "match_winner"), ("cup-final", "total_goals")] {
        engine
            .ingest(fresh_quote(event, market, "x", "betfair", dec!(2.20)))
            .unwrap();
        engine
            .ingest(fresh_quote(event, market, "y", "betway", dec!(2.10)))
            .unwrap();
    }

    let first = next_event(&mut events).await;
    let second = next_event(&mut events).await;

    let mut markets = vec![
        first.market().event().to_string(),
        second.market().event().to_string(),
    ];
    markets.sort();
    assert_eq!(markets, ["cup-final", "derby"]);
    assert!(matches!(first, LifecycleEvent::Detected { .. }));
    assert!(matches!(second, LifecycleEvent::Detected { .. }));

    for (event, market) in [("derby", "match_winner"), ("cup-final", "total_goals")] {
        let report = engine.query(event, market);
        let DetectionReport::Opportunity { opportunity } = report else {
            panic!("expected live opportunity for {event}");
        };
        assert_eq!(opportunity.status(), OpportunityStatus::Candidate);
    }

    engine.shutdown().await;
}

#[tokio::test]
async fn candidate_confirms_then_executes() {
    let engine = Engine::spawn(EngineConfig::default());
    let mut events = engine.subscribe(MarketFilter::All);

    engine
        .ingest(fresh_quote("derby", "match_winner", "x", "betfair", dec!(2.20)))
        .unwrap();
    engine
        .ingest(fresh_quote("derby", "match_winner", "y", "betway", dec!(2.10)))
        .unwrap();
    let detected = next_event(&mut events).await;
    assert!(matches!(detected, LifecycleEvent::Detected { .. }));

    // A refreshed quote recomputes the still-present margin: confirmation
    engine
        .ingest(fresh_quote("derby", "match_winner", "x", "betfair", dec!(2.21)))
        .unwrap();
    let confirmed = next_event(&mut events).await;
    let LifecycleEvent::Confirmed { opportunity } = &confirmed else {
        panic!("expected confirmation, got {confirmed:?}");
    };
    assert_eq!(opportunity.status(), OpportunityStatus::Active);

    engine.confirm_execution("derby", "match_winner").unwrap();
    let executed = next_event(&mut events).await;
    let LifecycleEvent::Executed { opportunity } = &executed else {
        panic!("expected execution, got {executed:?}");
    };
    assert_eq!(opportunity.status(), OpportunityStatus::Executed);

    engine.shutdown().await;
}

#[tokio::test]
async fn margin_collapse_expires_opportunity() {
    let engine = Engine::spawn(EngineConfig::default());
    let mut events = engine.subscribe(MarketFilter::All);

    engine
        .ingest(fresh_quote("derby", "match_winner", "x", "betfair", dec!(2.20)))
        .unwrap();
    engine
        .ingest(fresh_quote("derby", "match_winner", "y", "betway", dec!(2.10)))
        .unwrap();
    assert!(matches!(
        next_event(&mut events).await,
        LifecycleEvent::Detected { .. }
    ));

    engine
        .ingest(fresh_quote("derby", "match_winner", "x", "betfair", dec!(1.80)))
        .unwrap();
    let expired = next_event(&mut events).await;
    assert!(matches!(expired, LifecycleEvent::Expired { .. }));

    // With the margin gone the market reads as an ordinary book
    let report = engine.query("derby", "match_winner");
    assert!(!matches!(report, DetectionReport::Opportunity { .. }));

    engine.shutdown().await;
}

#[tokio::test]
async fn event_filter_narrows_to_one_event() {
    let engine = Engine::spawn(EngineConfig::default());
    let mut filtered = engine.subscribe(MarketFilter::Event(EventId::from("derby")));

    engine
        .ingest(fresh_quote("cup-final", "match_winner", "x", "betfair", dec!(2.20)))
        .unwrap();
    engine
        .ingest(fresh_quote("cup-final", "match_winner", "y", "betway", dec!(2.10)))
        .unwrap();
    engine
        .ingest(fresh_quote("derby", "match_winner", "x", "betfair", dec!(2.20)))
        .unwrap();
    engine
        .ingest(fresh_quote("derby", "match_winner", "y", "betway", dec!(2.10)))
        .unwrap();

    // Only derby transitions pass the filter, however the shards interleave
    let event = next_event(&mut filtered).await;
    assert_eq!(event.market().event().as_str(), "derby");

    engine.shutdown().await;
}

#[tokio::test]
async fn subscription_restarts_from_the_present() {
    let engine = Engine::spawn(EngineConfig::default());

    let mut first = engine.subscribe(MarketFilter::All);
    engine
        .ingest(fresh_quote("derby", "match_winner", "x", "betfair", dec!(2.20)))
        .unwrap();
    engine
        .ingest(fresh_quote("derby", "match_winner", "y", "betway", dec!(2.10)))
        .unwrap();
    assert!(matches!(
        next_event(&mut first).await,
        LifecycleEvent::Detected { .. }
    ));
    drop(first);

    // A fresh subscription observes only transitions from now on
    let mut second = engine.subscribe(MarketFilter::All);
    engine
        .ingest(fresh_quote("cup-final", "total_goals", "x", "betfair", dec!(2.20)))
        .unwrap();
    engine
        .ingest(fresh_quote("cup-final", "total_goals", "y", "betway", dec!(2.10)))
        .unwrap();

    let event = next_event(&mut second).await;
    assert_eq!(event.market().event().as_str(), "cup-final");

    engine.shutdown().await;
}

#[tokio::test]
async fn invalid_odds_rejected_at_ingestion() {
    let engine = Engine::spawn(EngineConfig::default());

    let bad = Quote::new(
        "derby",
        "match_winner",
        "x",
        "betfair",
        Odds::decimal(dec!(0.95)),
        chrono::Utc::now(),
    );
    assert!(engine.ingest(bad).is_err());

    // Nothing was stored
    assert_eq!(engine.market_count(), 0);
    assert!(matches!(
        engine.query("derby", "match_winner"),
        DetectionReport::InsufficientData
    ));

    engine.shutdown().await;
}

#[tokio::test]
async fn query_reports_thin_margin_without_candidate() {
    let engine = Engine::spawn(EngineConfig::default());
    let mut events = engine.subscribe(MarketFilter::All);

    // Implied ~0.985: positive edge, under the 4.2% threshold
    engine
        .ingest(fresh_quote("derby", "match_winner", "x", "betfair", dec!(2.03)))
        .unwrap();
    engine
        .ingest(fresh_quote("derby", "match_winner", "y", "betway", dec!(2.03)))
        .unwrap();

    // No transition is ever published for a sub-threshold margin; give the
    // shard a moment to process, then query directly
    let quiet = tokio::time::timeout(Duration::from_millis(200), events.recv()).await;
    assert!(quiet.is_err(), "no event expected for thin margin");

    let report = engine.query("derby", "match_winner");
    let DetectionReport::Thin { margin, .. } = report else {
        panic!("expected thin report, got {report:?}");
    };
    assert!(margin > dec!(0.0) && margin < dec!(0.042));

    engine.shutdown().await;
}
