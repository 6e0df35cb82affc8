use std::path::PathBuf;

use crate::constants::{DEFAULT_BITHUMB_BASE_URL, DEFAULT_WEBHOOK_TOKEN};

/// Get data directory from environment variable or use default
pub fn get_data_dir() -> PathBuf {
    std::env::var("COINPULSE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

/// Get the exchange API base URL from environment variable or use default
pub fn get_bithumb_base_url() -> String {
    std::env::var("BITHUMB_BASE_URL").unwrap_or_else(|_| DEFAULT_BITHUMB_BASE_URL.to_string())
}

/// Shared secret expected in the `x-webhook-token` header. The default value
/// means no token is configured and the check is skipped.
pub fn get_webhook_token() -> String {
    std::env::var("TRADING_WEBHOOK_TOKEN").unwrap_or_else(|_| DEFAULT_WEBHOOK_TOKEN.to_string())
}

/// Optional chat webhook URL for relaying received alerts
pub fn get_chat_webhook_url() -> Option<String> {
    std::env::var("CHAT_WEBHOOK_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
}

/// Optional CoinMarketCap API key for the altcoin-season endpoint
pub fn get_cmc_api_key() -> Option<String> {
    std::env::var("CMC_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty())
}

/// Parse a numeric text field defensively. The exchange transports numbers
/// as strings; junk input degrades to zero instead of failing the cycle.
pub fn parse_num(text: &str) -> f64 {
    text.trim().parse::<f64>().unwrap_or(0.0)
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compact human-readable volume (1.2B / 3.4M / 5.6K)
pub fn format_volume(volume: f64) -> String {
    if volume >= 1_000_000_000.0 {
        format!("{:.1}B", volume / 1_000_000_000.0)
    } else if volume >= 1_000_000.0 {
        format!("{:.1}M", volume / 1_000_000.0)
    } else if volume >= 1_000.0 {
        format!("{:.1}K", volume / 1_000.0)
    } else {
        format!("{:.2}", volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_num_defensive() {
        assert_eq!(parse_num("123.45"), 123.45);
        assert_eq!(parse_num(" 7 "), 7.0);
        assert_eq!(parse_num(""), 0.0);
        assert_eq!(parse_num("not-a-number"), 0.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(10.006), 10.01);
        assert_eq!(round2(33.333333), 33.33);
        assert_eq!(round2(9.994999), 9.99);
        assert_eq!(round2(-3.456), -3.46);
    }

    #[test]
    fn test_format_volume() {
        assert_eq!(format_volume(2_500_000_000.0), "2.5B");
        assert_eq!(format_volume(1_200_000.0), "1.2M");
        assert_eq!(format_volume(3_400.0), "3.4K");
        assert_eq!(format_volume(99.5), "99.50");
    }
}
