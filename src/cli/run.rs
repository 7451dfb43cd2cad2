//! The `run` command: feed the engine from stdin, print transitions.

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::config::Config;
use crate::domain::Quote;
use crate::engine::{Engine, MarketFilter};
use crate::error::Result;

/// Run the engine against newline-delimited JSON quotes on stdin until
/// EOF, printing every lifecycle transition as a JSON line on stdout.
pub async fn execute(config: Config) -> Result<()> {
    let engine = Engine::spawn(config.engine);

    let mut events = engine.subscribe(MarketFilter::All);
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(error) => warn!(%error, "failed to serialize event"),
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ingested = 0u64;
    let mut rejected = 0u64;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let quote: Quote = match serde_json::from_str(&line) {
            Ok(quote) => quote,
            Err(error) => {
                warn!(%error, "malformed quote line skipped");
                rejected += 1;
                continue;
            }
        };
        match engine.ingest(quote) {
            Ok(()) => ingested += 1,
            Err(error) => {
                warn!(%error, "quote rejected");
                rejected += 1;
            }
        }
    }

    info!(
        ingested,
        rejected,
        markets = engine.market_count(),
        late_drops = engine.late_drop_count(),
        "input drained"
    );

    engine.shutdown().await;
    let _ = printer.await;
    Ok(())
}
