use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};
use crate::utils::round2;

const CMC_GLOBAL_URL: &str =
    "https://pro-api.coinmarketcap.com/v1/global-metrics/quotes/latest";
const CMC_LISTINGS_URL: &str = "https://pro-api.coinmarketcap.com/v1/cryptocurrency/listings/latest?start=1&limit=100&convert=USD&sort=market_cap&sort_dir=desc";
const HTTP_TIMEOUT_SECS: u64 = 15;

/// Stablecoins and wrapped tokens excluded from the altcoin pool, plus BTC
/// itself as the benchmark.
const EXCLUDED_SYMBOLS: &[&str] = &[
    "BTC", "USDT", "USDC", "BUSD", "DAI", "TUSD", "USDP", "USDD", "FRAX", "WBTC", "WETH", "STETH",
    "RETH", "CBETH", "WSTETH",
];

/// Altcoin-season widget payload. Always served with HTTP 200; upstream
/// failures travel in the `error` field so the widget never breaks.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AltcoinSeasonReport {
    pub index: u32,
    pub status: String,
    pub btc_dominance: f64,
    pub btc_change_90d: f64,
    pub outperforming_coins: usize,
    pub total_altcoins: usize,
    pub last_updated: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn status_for_index(index: u32) -> &'static str {
    if index >= 75 {
        "Altcoin Season"
    } else if index >= 50 {
        "Altcoin Momentum"
    } else if index >= 26 {
        "Transition"
    } else {
        "Bitcoin Season"
    }
}

/// Client for the CoinMarketCap Pro API
pub struct CmcClient {
    client: reqwest::Client,
    api_key: String,
}

impl CmcClient {
    pub fn new(api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, api_key })
    }

    async fn fetch_json(&self, url: &str) -> Result<Value> {
        debug!(url = %url, "Fetching CoinMarketCap data");
        let response = self
            .client
            .get(url)
            .header("X-CMC_PRO_API_KEY", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::Network(format!("CoinMarketCap request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Upstream(format!(
                "CoinMarketCap returned status {}",
                response.status()
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| Error::Parse(format!("CoinMarketCap response was not valid JSON: {}", e)))
    }

    /// Fetch global metrics and the top-100 listing, then compute the index
    pub async fn fetch_report(&self) -> Result<AltcoinSeasonReport> {
        let (global, listings) = tokio::try_join!(
            self.fetch_json(CMC_GLOBAL_URL),
            self.fetch_json(CMC_LISTINGS_URL)
        )?;
        Ok(calculate_index(&global, &listings))
    }
}

/// Standard altcoin-season methodology: the share of top-100 altcoins
/// (stablecoins and wrapped tokens excluded) beating BTC's 90-day
/// performance, scaled to 0-100.
pub fn calculate_index(global: &Value, listings: &Value) -> AltcoinSeasonReport {
    let btc_dominance = global["data"]["btc_dominance"].as_f64().unwrap_or(55.0);

    let empty = Vec::new();
    let coins = listings["data"].as_array().unwrap_or(&empty);

    let btc_change_90d = coins
        .iter()
        .find(|coin| coin["symbol"].as_str() == Some("BTC"))
        .and_then(|coin| coin["quote"]["USD"]["percent_change_90d"].as_f64())
        .unwrap_or(0.0);

    let altcoin_changes: Vec<f64> = coins
        .iter()
        .filter(|coin| {
            coin["symbol"]
                .as_str()
                .map(|symbol| !EXCLUDED_SYMBOLS.contains(&symbol))
                .unwrap_or(false)
        })
        .filter_map(|coin| coin["quote"]["USD"]["percent_change_90d"].as_f64())
        .collect();

    let total_altcoins = altcoin_changes.len();
    let outperforming_coins = altcoin_changes
        .iter()
        .filter(|change| **change > btc_change_90d)
        .count();

    let index = if total_altcoins > 0 {
        ((outperforming_coins as f64 / total_altcoins as f64) * 100.0).round() as u32
    } else {
        0
    };

    AltcoinSeasonReport {
        index,
        status: status_for_index(index).to_string(),
        btc_dominance: round2(btc_dominance),
        btc_change_90d: round2(btc_change_90d),
        outperforming_coins,
        total_altcoins,
        last_updated: Utc::now().to_rfc3339(),
        source: "CoinMarketCap API".to_string(),
        error: None,
    }
}

/// Synthetic stand-in served when no API key is configured or the upstream
/// call fails. HTTP status stays 200; the reason travels in-band.
pub fn synthetic_report(error: Option<String>) -> AltcoinSeasonReport {
    let mut rng = rand::thread_rng();
    let index: u32 = rng.gen_range(20..=80);

    AltcoinSeasonReport {
        index,
        status: status_for_index(index).to_string(),
        btc_dominance: round2(rng.gen_range(45.0..62.0)),
        btc_change_90d: 0.0,
        outperforming_coins: 0,
        total_altcoins: 0,
        last_updated: Utc::now().to_rfc3339(),
        source: "synthetic".to_string(),
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_buckets() {
        assert_eq!(status_for_index(80), "Altcoin Season");
        assert_eq!(status_for_index(75), "Altcoin Season");
        assert_eq!(status_for_index(60), "Altcoin Momentum");
        assert_eq!(status_for_index(30), "Transition");
        assert_eq!(status_for_index(10), "Bitcoin Season");
    }

    fn coin(symbol: &str, change_90d: f64) -> Value {
        json!({
            "symbol": symbol,
            "quote": { "USD": { "percent_change_90d": change_90d } }
        })
    }

    #[test]
    fn test_index_counts_outperformers_only() {
        let global = json!({ "data": { "btc_dominance": 54.321 } });
        // BTC at +10; two of four altcoins beat it; USDT is excluded entirely
        let listings = json!({
            "data": [
                coin("BTC", 10.0),
                coin("ETH", 20.0),
                coin("SOL", 15.0),
                coin("ADA", 5.0),
                coin("DOGE", -3.0),
                coin("USDT", 99.0),
            ]
        });

        let report = calculate_index(&global, &listings);
        assert_eq!(report.total_altcoins, 4);
        assert_eq!(report.outperforming_coins, 2);
        assert_eq!(report.index, 50);
        assert_eq!(report.status, "Altcoin Momentum");
        assert_eq!(report.btc_dominance, 54.32);
        assert_eq!(report.btc_change_90d, 10.0);
        assert!(report.error.is_none());
    }

    #[test]
    fn test_index_with_empty_listing() {
        let report = calculate_index(&json!({}), &json!({}));
        assert_eq!(report.index, 0);
        assert_eq!(report.status, "Bitcoin Season");
        assert_eq!(report.btc_dominance, 55.0);
    }

    #[test]
    fn test_synthetic_report_carries_error_in_band() {
        let report = synthetic_report(Some("no API key configured".to_string()));
        assert!((20..=80).contains(&report.index));
        assert_eq!(report.source, "synthetic");
        assert!(report.error.is_some());
    }
}
