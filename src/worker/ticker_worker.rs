use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, instrument, warn};

use crate::constants::POLL_INTERVAL_MS;
use crate::models::{SectorMap, TickerSnapshot};
use crate::services::{normalizer, sector_stats, BithumbClient, SharedHealthStats, SharedMarketData};

/// How many cycles between routine progress log lines (1 per minute at the
/// 1-second poll period; failures always log)
const LOG_EVERY_ITERATIONS: u64 = 60;

/// Poll loop: fetch -> normalize -> aggregate -> publish, once per second.
///
/// Single-flight by construction: the loop awaits each cycle, and
/// `MissedTickBehavior::Skip` drops ticks that elapsed while a slow cycle was
/// in flight instead of stacking them. The previous snapshot lives here and
/// nowhere else; it only feeds the directional tick.
#[instrument(skip_all)]
pub async fn run(
    client: Arc<BithumbClient>,
    sectors: Arc<SectorMap>,
    market: SharedMarketData,
    health: SharedHealthStats,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(interval_ms = POLL_INTERVAL_MS, "Starting ticker worker");

    let mut ticker = interval(Duration::from_millis(POLL_INTERVAL_MS));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut previous: Option<TickerSnapshot> = None;
    let mut iteration = 0u64;

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                info!(worker = "ticker", iterations = iteration, "Ticker worker shutting down");
                break;
            }
            _ = ticker.tick() => {}
        }

        iteration += 1;

        match client.fetch_snapshot().await {
            Ok(snapshot) => {
                let now = Utc::now();
                let changes = normalizer::normalize(&snapshot, previous.as_ref(), now);
                let stats = sector_stats::aggregate(&snapshot, &changes, &sectors);

                let symbol_count = snapshot.len();
                let sector_count = stats.len();

                {
                    let mut market = market.write().await;
                    market.snapshot = snapshot.clone();
                    market.changes = changes;
                    market.sector_stats = stats;
                    market.last_update = Some(now);
                    market.last_error = None;
                }
                {
                    let mut health = health.write().await;
                    health.ticker_last_sync = Some(now.to_rfc3339());
                    health.ticker_iteration_count = iteration;
                    health.consecutive_failures = 0;
                    health.active_symbol_count = symbol_count;
                    health.sector_count = sector_count;
                }

                previous = Some(snapshot);

                if iteration % LOG_EVERY_ITERATIONS == 0 {
                    info!(
                        worker = "ticker",
                        iteration = iteration,
                        symbols = symbol_count,
                        sectors = sector_count,
                        "Poll cycle completed"
                    );
                }
            }
            Err(e) => {
                // Keep last-known-good tables; only the error text and
                // failure counter change.
                warn!(worker = "ticker", iteration = iteration, error = %e, "Poll cycle failed");

                {
                    let mut market = market.write().await;
                    market.last_error = Some(e.to_string());
                }
                {
                    let mut health = health.write().await;
                    health.ticker_iteration_count = iteration;
                    health.consecutive_failures += 1;
                }
            }
        }
    }
}
