use chrono::Utc;
use reqwest::header::{ACCEPT, CACHE_CONTROL, PRAGMA, USER_AGENT};
use std::time::Duration;
use tracing::debug;

use crate::constants::TICKER_FIAT;
use crate::error::{Error, Result};
use crate::models::{TickerResponse, TickerSnapshot};
use crate::utils::get_bithumb_base_url;

const HTTP_TIMEOUT_SECS: u64 = 10;

/// Client for the Bithumb public ticker API.
///
/// One request per call, no internal retry: the poll loop's next tick is the
/// retry. A millisecond cachebuster rides on every request because stale
/// ticker data is worse than no data for a one-second dashboard.
pub struct BithumbClient {
    base_url: String,
    client: reqwest::Client,
}

impl BithumbClient {
    pub fn new(base_url: String) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "Invalid base_url: must start with http:// or https://, got: '{}'",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { base_url, client })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(get_bithumb_base_url())
    }

    fn ticker_url(&self) -> String {
        format!(
            "{}/public/ticker/ALL_{}?_t={}",
            self.base_url,
            TICKER_FIAT,
            Utc::now().timestamp_millis()
        )
    }

    /// Fetch the raw upstream body without decoding, for the passthrough
    /// proxy endpoint.
    pub async fn fetch_raw(&self) -> Result<String> {
        let url = self.ticker_url();
        debug!(url = %url, "Fetching ticker snapshot");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, "coinpulse/0.1")
            .header(CACHE_CONTROL, "no-cache, no-store, must-revalidate")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| Error::Network(format!("Ticker request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "Ticker endpoint returned status {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read ticker response: {}", e)))
    }

    /// Fetch and decode one full ticker snapshot. An HTTP 200 with a non-OK
    /// application status is an upstream failure, not a success.
    pub async fn fetch_snapshot(&self) -> Result<TickerSnapshot> {
        let body = self.fetch_raw().await?;

        let response: TickerResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Parse(format!("Ticker response was not valid JSON: {}", e)))?;

        if !response.is_ok() {
            return Err(Error::Upstream(format!(
                "Ticker endpoint reported status {}",
                response.status
            )));
        }

        Ok(response.into_snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bare_host() {
        assert!(BithumbClient::new("api.bithumb.com".to_string()).is_err());
    }

    #[test]
    fn test_trims_trailing_slash_and_adds_cachebuster() {
        let client = BithumbClient::new("https://api.bithumb.com/".to_string()).unwrap();
        let url = client.ticker_url();
        assert!(url.starts_with("https://api.bithumb.com/public/ticker/ALL_KRW?_t="));
    }
}
