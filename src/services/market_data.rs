use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::{DerivedChange, SectorStats, TickerSnapshot};

/// Latest derived market state, replaced wholesale by the ticker worker on
/// each successful poll cycle. Readers see either the previous cycle or the
/// new one, never a partial update. On a failed cycle only `last_error`
/// changes; the tables keep their last-known-good contents.
#[derive(Debug, Default)]
pub struct MarketData {
    pub snapshot: TickerSnapshot,
    pub changes: HashMap<String, DerivedChange>,
    pub sector_stats: HashMap<String, SectorStats>,
    pub last_update: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

pub type SharedMarketData = Arc<RwLock<MarketData>>;

/// Health statistics for the poll worker and HTTP server
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthStats {
    pub ticker_last_sync: Option<String>,
    pub ticker_iteration_count: u64,
    pub consecutive_failures: u64,
    pub active_symbol_count: usize,
    pub sector_count: usize,
    pub uptime_secs: u64,
    pub current_system_time: String,
}

impl Default for HealthStats {
    fn default() -> Self {
        Self {
            ticker_last_sync: None,
            ticker_iteration_count: 0,
            consecutive_failures: 0,
            active_symbol_count: 0,
            sector_count: 0,
            uptime_secs: 0,
            current_system_time: Utc::now().to_rfc3339(),
        }
    }
}

pub type SharedHealthStats = Arc<RwLock<HealthStats>>;
