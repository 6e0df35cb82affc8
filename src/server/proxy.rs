use axum::{
    extract::{Query, State},
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE, EXPIRES, PRAGMA},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::server::AppState;
use crate::services::altcoin_season::{synthetic_report, CmcClient};
use crate::utils::get_cmc_api_key;

/// Headers that disable caching end-to-end. One-second polling requires
/// always-fresh data; any intermediary cache would serve stale prices.
fn no_store_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(EXPIRES, HeaderValue::from_static("0"));
    headers
}

/// Query parameters for the proxy endpoint. Browser clients append a
/// millisecond cachebuster; it is accepted and ignored.
#[derive(Debug, Deserialize)]
pub struct ProxyQuery {
    #[serde(rename = "_t")]
    pub _t: Option<String>,
}

/// GET /api/bithumb-proxy - passthrough of the raw upstream ticker JSON
#[instrument(skip_all)]
pub async fn bithumb_proxy_handler(
    State(app_state): State<AppState>,
    Query(_params): Query<ProxyQuery>,
) -> impl IntoResponse {
    match app_state.bithumb.fetch_raw().await {
        Ok(body) => (StatusCode::OK, no_store_headers(), body).into_response(),
        Err(e) => {
            warn!(error = %e, "Proxy fetch failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                no_store_headers(),
                Json(serde_json::json!({
                    "error": "Failed to fetch data from Bithumb API"
                })),
            )
                .into_response()
        }
    }
}

/// GET /api/altcoin-season - altcoin-season index widget payload.
///
/// Always answers 200: without an API key, or when the upstream fails, a
/// synthetic payload is served with the reason in the in-band `error` field
/// so the widget never shows a broken-page state.
#[instrument(skip_all)]
pub async fn altcoin_season_handler() -> impl IntoResponse {
    let report = match get_cmc_api_key() {
        Some(api_key) => match CmcClient::new(api_key) {
            Ok(client) => match client.fetch_report().await {
                Ok(report) => report,
                Err(e) => {
                    warn!(error = %e, "Altcoin-season upstream failed, serving synthetic index");
                    synthetic_report(Some(e.to_string()))
                }
            },
            Err(e) => synthetic_report(Some(e.to_string())),
        },
        None => synthetic_report(Some(
            "CMC_API_KEY not configured; serving synthetic index".to_string(),
        )),
    };

    (StatusCode::OK, Json(report))
}
