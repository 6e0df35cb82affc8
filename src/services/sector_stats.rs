use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::sector::{is_main_sector, main_sector_rank};
use crate::models::{
    CoinTicker, DerivedChange, SectorMap, SectorSortKey, SectorStats, TickerSnapshot, TopMover,
};

/// Change percent used for aggregation: the locally derived real-time value
/// when present, else the exchange's own 24h rate. The fallback must hold
/// even when no normalization ran at all.
fn change_percent_of(
    symbol: &str,
    ticker: &CoinTicker,
    changes: &HashMap<String, DerivedChange>,
) -> f64 {
    changes
        .get(symbol)
        .map(|change| change.percent)
        .unwrap_or_else(|| ticker.fluctate_rate_24h_num())
}

/// Group the snapshot by sector and reduce each group to summary statistics.
/// Sectors with no current members produce no entry.
pub fn aggregate(
    snapshot: &TickerSnapshot,
    changes: &HashMap<String, DerivedChange>,
    sectors: &SectorMap,
) -> HashMap<String, SectorStats> {
    let mut groups: HashMap<&str, Vec<(&str, &CoinTicker)>> = HashMap::new();
    for (symbol, ticker) in snapshot {
        groups
            .entry(sectors.sector_of(symbol))
            .or_default()
            .push((symbol.as_str(), ticker));
    }

    groups
        .into_iter()
        .map(|(sector, members)| {
            let mut scored: Vec<(&str, f64, f64)> = members
                .iter()
                .map(|(symbol, ticker)| {
                    (
                        *symbol,
                        change_percent_of(symbol, ticker, changes),
                        ticker.acc_trade_value_24h_num(),
                    )
                })
                .collect();
            scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

            let count = scored.len();
            let avg_change_percent =
                scored.iter().map(|(_, change, _)| change).sum::<f64>() / count as f64;
            let total_volume = scored.iter().map(|(_, _, volume)| volume).sum::<f64>();
            let positive_count = scored.iter().filter(|(_, change, _)| *change > 0.0).count();
            let negative_count = scored.iter().filter(|(_, change, _)| *change < 0.0).count();

            let top_gainer = scored.first().map(|(symbol, change, _)| TopMover {
                symbol: symbol.to_string(),
                change: *change,
            });
            let top_loser = scored.last().map(|(symbol, change, _)| TopMover {
                symbol: symbol.to_string(),
                change: *change,
            });

            (
                sector.to_string(),
                SectorStats {
                    count,
                    avg_change_percent,
                    total_volume,
                    positive_count,
                    negative_count,
                    top_gainer,
                    top_loser,
                },
            )
        })
        .collect()
}

fn sort_value(stats: &SectorStats, key: SectorSortKey) -> f64 {
    match key {
        SectorSortKey::AvgChange => stats.avg_change_percent,
        SectorSortKey::Count => stats.count as f64,
        SectorSortKey::Volume => stats.total_volume,
        SectorSortKey::Positive => stats.positive_count as f64,
    }
}

/// Order sectors for display: main sectors before the rest, then the
/// requested key descending; list position and name break remaining ties.
pub fn sort_sector_stats(
    stats: HashMap<String, SectorStats>,
    key: SectorSortKey,
) -> Vec<(String, SectorStats)> {
    let mut entries: Vec<(String, SectorStats)> = stats.into_iter().collect();
    entries.sort_by(|(name_a, a), (name_b, b)| {
        match (is_main_sector(name_a), is_main_sector(name_b)) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => sort_value(b, key)
                .partial_cmp(&sort_value(a, key))
                .unwrap_or(Ordering::Equal)
                .then_with(|| main_sector_rank(name_a).cmp(&main_sector_rank(name_b)))
                .then_with(|| name_a.cmp(name_b)),
        }
    });
    entries
}
