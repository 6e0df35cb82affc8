use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use crate::constants::{DATE_PSEUDO_KEY, UPSTREAM_OK_STATUS};
use crate::utils::parse_num;

/// One symbol's record from the all-tickers endpoint.
///
/// The exchange transports every numeric field as text; accessors parse them
/// defensively so a malformed value degrades to zero instead of failing the
/// poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinTicker {
    #[serde(default)]
    pub opening_price: String,
    #[serde(default)]
    pub closing_price: String,
    #[serde(default)]
    pub min_price: String,
    #[serde(default)]
    pub max_price: String,
    #[serde(default)]
    pub units_traded: String,
    #[serde(default)]
    pub acc_trade_value: String,
    #[serde(default)]
    pub prev_closing_price: String,
    #[serde(default, rename = "units_traded_24H")]
    pub units_traded_24h: String,
    #[serde(default, rename = "acc_trade_value_24H")]
    pub acc_trade_value_24h: String,
    #[serde(default, rename = "fluctate_24H")]
    pub fluctate_24h: String,
    #[serde(default, rename = "fluctate_rate_24H")]
    pub fluctate_rate_24h: String,
    #[serde(default)]
    pub date: String,
}

impl CoinTicker {
    pub fn opening_price_num(&self) -> f64 {
        parse_num(&self.opening_price)
    }

    pub fn closing_price_num(&self) -> f64 {
        parse_num(&self.closing_price)
    }

    pub fn prev_closing_price_num(&self) -> f64 {
        parse_num(&self.prev_closing_price)
    }

    pub fn min_price_num(&self) -> f64 {
        parse_num(&self.min_price)
    }

    pub fn max_price_num(&self) -> f64 {
        parse_num(&self.max_price)
    }

    pub fn units_traded_24h_num(&self) -> f64 {
        parse_num(&self.units_traded_24h)
    }

    pub fn acc_trade_value_24h_num(&self) -> f64 {
        parse_num(&self.acc_trade_value_24h)
    }

    pub fn fluctate_24h_num(&self) -> f64 {
        parse_num(&self.fluctate_24h)
    }

    pub fn fluctate_rate_24h_num(&self) -> f64 {
        parse_num(&self.fluctate_rate_24h)
    }

    /// Price used for comparisons and change math: the closing price, unless
    /// the exchange has zeroed it during its daily reset, in which case the
    /// previous close.
    pub fn resolved_price(&self) -> f64 {
        let closing = self.closing_price_num();
        if closing != 0.0 {
            closing
        } else {
            self.prev_closing_price_num()
        }
    }
}

/// One fetch cycle's full symbol -> data mapping. Immutable once produced.
pub type TickerSnapshot = HashMap<String, CoinTicker>;

/// Raw response envelope from `GET /public/ticker/ALL_{FIAT}`
#[derive(Debug, Clone, Deserialize)]
pub struct TickerResponse {
    pub status: String,
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,
}

impl TickerResponse {
    pub fn is_ok(&self) -> bool {
        self.status == UPSTREAM_OK_STATUS
    }

    /// Convert the raw `data` map into a snapshot. The `date` pseudo-key the
    /// exchange mixes in alongside real symbols is dropped, as is any entry
    /// that does not decode as a coin record.
    pub fn into_snapshot(self) -> TickerSnapshot {
        let mut snapshot = HashMap::with_capacity(self.data.len());
        for (symbol, value) in self.data {
            if symbol == DATE_PSEUDO_KEY {
                continue;
            }
            match serde_json::from_value::<CoinTicker>(value) {
                Ok(ticker) => {
                    snapshot.insert(symbol, ticker);
                }
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "Skipping malformed ticker entry");
                }
            }
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_response() -> TickerResponse {
        serde_json::from_value(serde_json::json!({
            "status": "0000",
            "data": {
                "BTC": {
                    "opening_price": "100",
                    "closing_price": "110",
                    "prev_closing_price": "99",
                    "min_price": "95",
                    "max_price": "112",
                    "units_traded": "10",
                    "acc_trade_value": "1000",
                    "units_traded_24H": "20",
                    "acc_trade_value_24H": "2000",
                    "fluctate_24H": "11",
                    "fluctate_rate_24H": "11.11",
                    "date": "1717200000000"
                },
                "date": "1717200000000"
            }
        }))
        .expect("fixture should deserialize")
    }

    #[test]
    fn test_snapshot_excludes_date_pseudo_key() {
        let snapshot = sample_response().into_snapshot();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains_key("BTC"));
        assert!(!snapshot.contains_key("date"));
    }

    #[test]
    fn test_status_check() {
        let mut response = sample_response();
        assert!(response.is_ok());
        response.status = "5500".to_string();
        assert!(!response.is_ok());
    }

    #[test]
    fn test_resolved_price_prefers_closing() {
        let ticker = CoinTicker {
            closing_price: "110".to_string(),
            prev_closing_price: "99".to_string(),
            ..CoinTicker::default()
        };
        assert_eq!(ticker.resolved_price(), 110.0);
    }

    #[test]
    fn test_resolved_price_falls_back_during_reset() {
        let ticker = CoinTicker {
            closing_price: "0".to_string(),
            prev_closing_price: "500".to_string(),
            ..CoinTicker::default()
        };
        assert_eq!(ticker.resolved_price(), 500.0);
    }

    #[test]
    fn test_junk_numeric_text_degrades_to_zero() {
        let ticker = CoinTicker {
            opening_price: "n/a".to_string(),
            acc_trade_value_24h: "".to_string(),
            ..CoinTicker::default()
        };
        assert_eq!(ticker.opening_price_num(), 0.0);
        assert_eq!(ticker.acc_trade_value_24h_num(), 0.0);
    }
}
