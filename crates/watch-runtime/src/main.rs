//! # Ledger-Watch Runtime
//!
//! Streams raw storage change-sets through the storage dispatcher and logs
//! every change routed to a watched storage item.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (from env) and install the log subscriber
//! 2. Load the schema and build one logging listener per watched item
//! 3. Initialize the dispatch service (fails on any configuration error)
//! 4. Start the stdin feed (change-sets wait on the initialization gate)
//! 5. Route the snapshot file, if any, then open the gate
//! 6. Run until stdin ends or Ctrl+C, then shut the feed down
//!
//! ## Input
//!
//! One JSON array of `{"key": "0x...", "value": "0x..." | null}` per line.

mod config;
mod logging;
mod watchers;

use std::time::Duration;

use anyhow::{Context, Result};
use storage_dispatch::{load_schema, JsonFileSnapshot, JsonLinesFeed, StorageWatchService};
use tokio::io::BufReader;
use tracing::{info, warn};

use crate::config::RuntimeConfig;

async fn wait_for_feed_end(service: &StorageWatchService) {
    let mut ticker = tokio::time::interval(Duration::from_millis(100));
    while !service.feed_finished() {
        ticker.tick().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env();
    logging::init_logging(&config)?;

    let schema = load_schema(&config.schema_path)
        .with_context(|| format!("loading schema {}", config.schema_path.display()))?;
    let bindings = watchers::logging_bindings(&schema, &config);
    info!("[lw-watch] Watching {} storage items", bindings.len());

    let service = StorageWatchService::initialize(config.dispatch.clone(), &schema, bindings)
        .context("initializing storage dispatch")?;

    let stdin = BufReader::new(tokio::io::stdin());
    service.spawn_feed(JsonLinesFeed::new("stdin", stdin));

    match &config.snapshot_path {
        Some(path) => {
            let report = service
                .bootstrap(&JsonFileSnapshot::new(path.clone()))
                .await
                .with_context(|| format!("loading snapshot {}", path.display()))?;
            info!(
                "[lw-watch] Snapshot applied: {} delivered, {} dropped",
                report.delivered, report.dropped
            );
        }
        None => {
            service.mark_ready();
        }
    }

    info!("[lw-watch] Running. Press Ctrl+C to stop.");
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("listening for Ctrl+C")?;
            info!("[lw-watch] Interrupted");
        }
        _ = wait_for_feed_end(&service) => {
            info!("[lw-watch] Input ended");
        }
    }

    if service.shutdown().await.is_none() {
        warn!("[lw-watch] Feed task did not report a summary");
    }

    let stats = service.dispatcher().stats().snapshot();
    info!(
        "[lw-watch] Final stats: {}",
        serde_json::to_string(&stats).context("serializing stats")?
    );

    Ok(())
}
