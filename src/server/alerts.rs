use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info, instrument};

use crate::constants::DEFAULT_WEBHOOK_TOKEN;
use crate::error::Error;
use crate::models::{SettingsUpdate, TradingAlertPayload, WatchlistUpdate};
use crate::server::AppState;
use crate::services::{export_data, import_data, notifier, ExportBundle, SharedStores};
use crate::utils::{get_chat_webhook_url, get_webhook_token};

const WEBHOOK_TOKEN_HEADER: &str = "x-webhook-token";

fn storage_error(e: Error) -> Response {
    error!(error = %e, "Store operation failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({
            "error": "Internal Server Error",
            "message": e.to_string(),
        })),
    )
        .into_response()
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": format!("{} not found", what) })),
    )
        .into_response()
}

/// POST /api/trading-alert - webhook receiver for charting-platform alerts.
///
/// The shared-secret check is lenient: it only rejects when a token is both
/// configured and presented but does not match, so local setups without a
/// token keep working.
#[instrument(skip_all)]
pub async fn trading_alert_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<TradingAlertPayload>,
) -> Response {
    let expected_token = get_webhook_token();
    let provided_token = headers
        .get(WEBHOOK_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());

    if let Some(provided) = provided_token {
        if expected_token != DEFAULT_WEBHOOK_TOKEN && provided != expected_token {
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "Unauthorized" })),
            )
                .into_response();
        }
    }

    let draft = payload.normalize(Utc::now());
    info!(ticker = %draft.ticker, rsi = draft.rsi, price = draft.price, "Trading alert received");

    let record = match app_state.stores.alerts.add(draft).await {
        Ok(record) => record,
        Err(e) => return storage_error(e),
    };

    // Optional chat relay: settings first, environment as fallback
    let settings = app_state.stores.settings.get().await;
    if let Some(webhook_url) = settings.chat_webhook_url.or_else(get_chat_webhook_url) {
        notifier::send_chat_notification(&webhook_url, &record).await;
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "message": "Alert received and processed successfully",
            "data": record,
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
        .into_response()
}

/// GET /api/watchlist
pub async fn get_watchlist_handler(State(stores): State<SharedStores>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "success",
        "data": stores.watchlist.get_all().await,
    }))
}

/// Body for adding a watchlist entry
#[derive(Debug, Deserialize)]
pub struct NewWatchlistRequest {
    pub ticker: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_rsi_threshold")]
    pub rsi_threshold: f64,
}

fn default_rsi_threshold() -> f64 {
    30.0
}

/// POST /api/watchlist
pub async fn add_watchlist_handler(
    State(stores): State<SharedStores>,
    Json(request): Json<NewWatchlistRequest>,
) -> Response {
    match stores
        .watchlist
        .add(request.ticker, request.description, request.rsi_threshold)
        .await
    {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => storage_error(e),
    }
}

/// PATCH /api/watchlist/{id}
pub async fn update_watchlist_handler(
    State(stores): State<SharedStores>,
    Path(id): Path<String>,
    Json(update): Json<WatchlistUpdate>,
) -> Response {
    match stores.watchlist.update(&id, update).await {
        Ok(Some(item)) => (StatusCode::OK, Json(item)).into_response(),
        Ok(None) => not_found("Watchlist item"),
        Err(e) => storage_error(e),
    }
}

/// DELETE /api/watchlist/{id}
pub async fn remove_watchlist_handler(
    State(stores): State<SharedStores>,
    Path(id): Path<String>,
) -> Response {
    match stores.watchlist.remove(&id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "success" })),
        )
            .into_response(),
        Ok(false) => not_found("Watchlist item"),
        Err(e) => storage_error(e),
    }
}

/// Query parameters for /api/alerts
#[derive(Debug, Deserialize)]
pub struct AlertsQuery {
    pub limit: Option<usize>,
}

/// GET /api/alerts - recent alerts, newest first
pub async fn get_alerts_handler(
    State(stores): State<SharedStores>,
    Query(params): Query<AlertsQuery>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(50);
    Json(serde_json::json!({
        "status": "success",
        "data": {
            "alerts": stores.alerts.recent(limit).await,
            "unread": stores.alerts.unread_count().await,
            "limit": limit,
        },
    }))
}

/// POST /api/alerts/{id}/read
pub async fn mark_alert_read_handler(
    State(stores): State<SharedStores>,
    Path(id): Path<String>,
) -> Response {
    match stores.alerts.mark_as_read(&id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "success" })),
        )
            .into_response(),
        Ok(false) => not_found("Alert"),
        Err(e) => storage_error(e),
    }
}

/// POST /api/alerts/read-all
pub async fn mark_all_read_handler(State(stores): State<SharedStores>) -> Response {
    match stores.alerts.mark_all_as_read().await {
        Ok(marked) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "success", "marked": marked })),
        )
            .into_response(),
        Err(e) => storage_error(e),
    }
}

/// GET /api/settings
pub async fn get_settings_handler(State(stores): State<SharedStores>) -> impl IntoResponse {
    Json(stores.settings.get().await)
}

/// PUT /api/settings - merge a partial update into the settings record
pub async fn update_settings_handler(
    State(stores): State<SharedStores>,
    Json(update): Json<SettingsUpdate>,
) -> Response {
    match stores.settings.save(update).await {
        Ok(settings) => (StatusCode::OK, Json(settings)).into_response(),
        Err(e) => storage_error(e),
    }
}

/// GET /api/export - bundle all stores into one document
pub async fn export_handler(State(stores): State<SharedStores>) -> impl IntoResponse {
    Json(export_data(&stores).await)
}

/// POST /api/import - restore all stores from an export bundle
pub async fn import_handler(
    State(stores): State<SharedStores>,
    Json(bundle): Json<ExportBundle>,
) -> Response {
    match import_data(&stores, bundle).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "success" })),
        )
            .into_response(),
        Err(e) => storage_error(e),
    }
}
