use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, RwLock};

use crate::models::SectorMap;
use crate::server::{self, AppState};
use crate::services::{BithumbClient, HealthStats, MarketData, Stores};
use crate::utils::get_data_dir;
use crate::worker;

pub async fn run(port: u16) {
    println!("🚀 Starting coinpulse server on port {}", port);

    let data_dir = get_data_dir();
    println!("📁 Data directory: {}", data_dir.display());
    let stores = Arc::new(Stores::open(&data_dir));

    let client = match BithumbClient::from_env() {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let sectors = Arc::new(SectorMap::default_map());
    println!(
        "🗂️  Sector table: {} symbols across {} sectors",
        sectors.len(),
        sectors.sector_count()
    );

    let market = Arc::new(RwLock::new(MarketData::default()));
    let health = Arc::new(RwLock::new(HealthStats::default()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    println!("⚡ Spawning ticker worker (every 1 second)...");
    tokio::spawn(worker::run_ticker_worker(
        client.clone(),
        sectors.clone(),
        market.clone(),
        health.clone(),
        shutdown_rx.clone(),
    ));

    // Uptime tracker
    let start_time = Instant::now();
    let uptime_health = health.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
            let mut health = uptime_health.write().await;
            health.uptime_secs = start_time.elapsed().as_secs();
        }
    });

    // ctrl-c tears down the worker and the server together
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        println!("\n🛑 Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let app_state = AppState {
        market,
        health,
        stores,
        bithumb: client,
        sectors,
    };

    if let Err(e) = server::serve(app_state, port, shutdown_rx).await {
        eprintln!("❌ Server error: {}", e);
        std::process::exit(1);
    }

    println!("👋 Server stopped");
}
