//! Oddsmith - Real-time sports odds arbitrage detection.
//!
//! This crate maintains a consolidated best-price view per market from
//! continuously updated bookmaker quotes, detects guaranteed-profit
//! conditions (combined implied probability below 1), computes
//! payout-equalizing stake splits, and tracks each opportunity through a
//! candidate → active → expired/executed lifecycle.
//!
//! # Architecture
//!
//! - **[`domain`]** - Pure computation: odds conversion, market state,
//!   best-price selection, detection, stake allocation, risk metrics
//! - **[`engine`]** - The running system: a sharded dispatcher that
//!   serializes updates per market key, coalesces bursts, and publishes
//!   lifecycle transitions
//! - **[`config`]** - Configuration loading from TOML files
//! - **[`error`]** - Error types for the crate
//!
//! Fetching quotes from bookmakers, persistence, and notification delivery
//! are upstream/downstream concerns; the engine's authoritative state is
//! in-memory and fully reconstructible by replaying the latest quote per
//! key.
//!
//! # Example
//!
//! ```no_run
//! use chrono::Utc;
//! use oddsmith::config::EngineConfig;
//! use oddsmith::domain::{Odds, Quote};
//! use oddsmith::engine::{Engine, MarketFilter};
//! use rust_decimal_macros::dec;
//!
//! # async fn run() {
//! let engine = Engine::spawn(EngineConfig::default());
//! let mut events = engine.subscribe(MarketFilter::All);
//!
//! engine
//!     .ingest(Quote::new(
//!         "derby",
//!         "match_winner",
//!         "home",
//!         "pinnacle",
//!         Odds::decimal(dec!(2.20)),
//!         Utc::now(),
//!     ))
//!     .unwrap();
//!
//! while let Some(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
