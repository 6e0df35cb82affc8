pub mod alerts;
pub mod api;
pub mod proxy;

use axum::{
    extract::FromRef,
    http::Method,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};

use crate::models::SectorMap;
use crate::services::{BithumbClient, SharedHealthStats, SharedMarketData, SharedStores};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub market: SharedMarketData,
    pub health: SharedHealthStats,
    pub stores: SharedStores,
    pub bithumb: Arc<BithumbClient>,
    pub sectors: Arc<SectorMap>,
}

// FromRef implementations to extract specific state components
impl FromRef<AppState> for SharedMarketData {
    fn from_ref(app_state: &AppState) -> SharedMarketData {
        app_state.market.clone()
    }
}

impl FromRef<AppState> for SharedHealthStats {
    fn from_ref(app_state: &AppState) -> SharedHealthStats {
        app_state.health.clone()
    }
}

impl FromRef<AppState> for SharedStores {
    fn from_ref(app_state: &AppState) -> SharedStores {
        app_state.stores.clone()
    }
}

/// Start the axum server
pub async fn serve(
    app_state: AppState,
    port: u16,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    tracing::info!("Starting coinpulse server");

    // The dashboard is fetched from arbitrary origins; the webhook token
    // header must be allowed through preflight.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    tracing::info!("Registering routes:");
    tracing::info!("  GET  /api/coins?sort_by=change&page=1&symbol=BTC&symbol=ETH");
    tracing::info!("  GET  /api/sectors?sort_by=avg_change");
    tracing::info!("  GET  /api/bithumb-proxy");
    tracing::info!("  GET  /api/altcoin-season");
    tracing::info!("  POST /api/trading-alert");
    tracing::info!("  GET  /api/watchlist | /api/alerts | /api/settings | /api/export");
    tracing::info!("  GET  /health");

    let app = Router::new()
        .route("/api/coins", get(api::get_coins_handler))
        .route("/api/sectors", get(api::get_sectors_handler))
        .route("/api/bithumb-proxy", get(proxy::bithumb_proxy_handler))
        .route("/api/altcoin-season", get(proxy::altcoin_season_handler))
        .route("/api/trading-alert", post(alerts::trading_alert_handler))
        .route(
            "/api/watchlist",
            get(alerts::get_watchlist_handler).post(alerts::add_watchlist_handler),
        )
        .route(
            "/api/watchlist/{id}",
            axum::routing::patch(alerts::update_watchlist_handler)
                .delete(alerts::remove_watchlist_handler),
        )
        .route("/api/alerts", get(alerts::get_alerts_handler))
        .route("/api/alerts/{id}/read", post(alerts::mark_alert_read_handler))
        .route("/api/alerts/read-all", post(alerts::mark_all_read_handler))
        .route(
            "/api/settings",
            get(alerts::get_settings_handler).put(alerts::update_settings_handler),
        )
        .route("/api/export", get(alerts::export_handler))
        .route("/api/import", post(alerts::import_handler))
        .route("/health", get(api::health_handler))
        .layer(cors)
        .with_state(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.changed().await;
        })
        .await?;

    Ok(())
}
