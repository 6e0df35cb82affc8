use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use axum_extra::extract::Query;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::instrument;

use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::models::sector::is_main_sector;
use crate::models::{DirectionTick, SectorSortKey, SectorStats};
use crate::server::AppState;
use crate::services::sector_stats::sort_sector_stats;
use crate::services::SharedHealthStats;

/// One row of the coins table, joined from the snapshot and derived changes
#[derive(Debug, Serialize)]
pub struct CoinRow {
    pub symbol: String,
    pub sector: String,
    pub price: f64,
    pub tick: DirectionTick,
    pub change_amount: f64,
    pub change_percent: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub units_traded_24h: f64,
    pub acc_trade_value_24h: f64,
    pub api_change_24h: f64,
    pub api_change_rate_24h: f64,
}

/// Sort key for the coins table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoinSortKey {
    Change,
    Price,
    Volume,
}

impl Default for CoinSortKey {
    fn default() -> Self {
        CoinSortKey::Change
    }
}

/// Query parameters for /api/coins
#[derive(Debug, Deserialize)]
pub struct CoinsQuery {
    /// Restrict to specific symbols (can be repeated: symbol=BTC&symbol=ETH)
    pub symbol: Option<Vec<String>>,

    /// Sort key: change (default), price, volume
    #[serde(default)]
    pub sort_by: CoinSortKey,

    /// 1-based page number
    pub page: Option<usize>,

    /// Rows per page (default 20, max 100)
    pub per_page: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct CoinsResponse {
    pub coins: Vec<CoinRow>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub last_update: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// GET /api/coins - sorted, filtered, paginated view of the latest snapshot.
///
/// Served entirely from memory; never triggers an upstream fetch. While the
/// upstream is failing this keeps returning the last-known-good tables with
/// the error surfaced in `last_error`.
#[instrument(skip(app_state))]
pub async fn get_coins_handler(
    State(app_state): State<AppState>,
    Query(params): Query<CoinsQuery>,
) -> impl IntoResponse {
    let market = app_state.market.read().await;

    let symbol_filter: Option<Vec<String>> = params.symbol.as_ref().map(|symbols| {
        symbols
            .iter()
            .map(|symbol| symbol.to_uppercase())
            .collect()
    });

    let mut rows: Vec<CoinRow> = market
        .snapshot
        .iter()
        .filter(|(symbol, _)| match &symbol_filter {
            Some(filter) => filter.contains(&symbol.to_uppercase()),
            None => true,
        })
        .map(|(symbol, ticker)| {
            let change = market.changes.get(symbol);
            CoinRow {
                symbol: symbol.clone(),
                sector: app_state.sectors.sector_of(symbol).to_string(),
                price: ticker.resolved_price(),
                tick: change.map(|c| c.tick).unwrap_or(DirectionTick::Same),
                change_amount: change.map(|c| c.amount).unwrap_or(0.0),
                change_percent: change
                    .map(|c| c.percent)
                    .unwrap_or_else(|| ticker.fluctate_rate_24h_num()),
                min_price: ticker.min_price_num(),
                max_price: ticker.max_price_num(),
                units_traded_24h: ticker.units_traded_24h_num(),
                acc_trade_value_24h: ticker.acc_trade_value_24h_num(),
                api_change_24h: ticker.fluctate_24h_num(),
                api_change_rate_24h: ticker.fluctate_rate_24h_num(),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        let (x, y) = match params.sort_by {
            CoinSortKey::Change => (a.change_percent, b.change_percent),
            CoinSortKey::Price => (a.price, b.price),
            CoinSortKey::Volume => (a.acc_trade_value_24h, b.acc_trade_value_24h),
        };
        y.partial_cmp(&x)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });

    let total = rows.len();
    let per_page = params
        .per_page
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let total_pages = total.div_ceil(per_page).max(1);
    let page = params.page.unwrap_or(1).clamp(1, total_pages);

    let start = (page - 1) * per_page;
    let coins: Vec<CoinRow> = rows
        .into_iter()
        .skip(start)
        .take(per_page)
        .collect();

    Json(CoinsResponse {
        coins,
        total,
        page,
        per_page,
        total_pages,
        last_update: market.last_update.map(|time| time.to_rfc3339()),
        last_error: market.last_error.clone(),
    })
}

/// Query parameters for /api/sectors
#[derive(Debug, Deserialize)]
pub struct SectorsQuery {
    /// Secondary sort key: avg_change (default), count, volume, positive
    #[serde(default)]
    pub sort_by: SectorSortKey,
}

#[derive(Debug, Serialize)]
pub struct SectorRow {
    pub name: String,
    pub is_main: bool,
    #[serde(flatten)]
    pub stats: SectorStats,
}

#[derive(Debug, Serialize)]
pub struct SectorsResponse {
    pub sectors: Vec<SectorRow>,
    pub total_sectors: usize,
    pub last_update: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// GET /api/sectors - per-sector statistics, main sectors first
#[instrument(skip(app_state))]
pub async fn get_sectors_handler(
    State(app_state): State<AppState>,
    Query(params): Query<SectorsQuery>,
) -> impl IntoResponse {
    let market = app_state.market.read().await;

    let ordered = sort_sector_stats(market.sector_stats.clone(), params.sort_by);
    let sectors: Vec<SectorRow> = ordered
        .into_iter()
        .map(|(name, stats)| SectorRow {
            is_main: is_main_sector(&name),
            name,
            stats,
        })
        .collect();

    Json(SectorsResponse {
        total_sectors: sectors.len(),
        sectors,
        last_update: market.last_update.map(|time| time.to_rfc3339()),
        last_error: market.last_error.clone(),
    })
}

/// GET /health - worker and store health statistics
pub async fn health_handler(State(health): State<SharedHealthStats>) -> impl IntoResponse {
    let mut stats = health.read().await.clone();
    stats.current_system_time = Utc::now().to_rfc3339();
    Json(stats)
}
