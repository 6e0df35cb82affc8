use chrono::Utc;

use crate::models::{SectorMap, SectorSortKey};
use crate::services::{normalizer, sector_stats, BithumbClient};
use crate::utils::format_volume;

/// One-shot fetch: pull a single ticker snapshot, derive changes and sector
/// stats, print a terminal summary, exit.
pub async fn run() {
    println!("📡 Fetching ticker snapshot...\n");

    let client = match BithumbClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let snapshot = match client.fetch_snapshot().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("❌ Fetch failed: {}", e);
            std::process::exit(1);
        }
    };

    let now = Utc::now();
    let changes = normalizer::normalize(&snapshot, None, now);
    let sectors = SectorMap::default_map();
    let stats = sector_stats::aggregate(&snapshot, &changes, &sectors);
    let ordered = sector_stats::sort_sector_stats(stats, SectorSortKey::AvgChange);

    println!(
        "📈 {} symbols across {} sectors{}",
        snapshot.len(),
        ordered.len(),
        if normalizer::in_reset_window(now) {
            " (reset window: changes forced flat)"
        } else {
            ""
        }
    );
    println!("═══════════════════════════════════════════════════════════");

    for (name, sector) in &ordered {
        println!(
            "  {:<14} {:>4} coins  avg {:>+7.2}%  vol {:>10}  ↑{:<3} ↓{:<3}",
            name,
            sector.count,
            sector.avg_change_percent,
            format_volume(sector.total_volume),
            sector.positive_count,
            sector.negative_count,
        );
    }

    println!("═══════════════════════════════════════════════════════════\n");

    let mut movers: Vec<(&String, f64)> = changes
        .iter()
        .map(|(symbol, change)| (symbol, change.percent))
        .collect();
    movers.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    println!("🏆 Top gainers:");
    for (symbol, percent) in movers.iter().take(5) {
        println!("   {:<10} {:>+7.2}%", symbol, percent);
    }

    println!("\n📉 Top losers:");
    for (symbol, percent) in movers.iter().rev().take(5) {
        println!("   {:<10} {:>+7.2}%", symbol, percent);
    }
}
