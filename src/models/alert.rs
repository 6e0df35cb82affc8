use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::utils::parse_num;

/// A ticker the user tracks for RSI alerts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistItem {
    pub id: String,
    pub ticker: String,
    #[serde(default)]
    pub description: String,
    pub rsi_threshold: f64,
    pub created_at: String,
    pub is_active: bool,
}

/// Partial update applied to a watchlist item
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchlistUpdate {
    pub description: Option<String>,
    pub rsi_threshold: Option<f64>,
    pub is_active: Option<bool>,
}

/// One received trading alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: String,
    pub ticker: String,
    pub time: String,
    pub rsi: f64,
    pub price: f64,
    pub message: String,
    pub is_read: bool,
}

/// Alert fields before the store assigns an id and read flag
#[derive(Debug, Clone)]
pub struct AlertDraft {
    pub ticker: String,
    pub time: String,
    pub rsi: f64,
    pub price: f64,
    pub message: String,
}

/// User settings persisted alongside the other stores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingSettings {
    pub webhook_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_webhook_url: Option<String>,
    pub notification_enabled: bool,
    pub sound_enabled: bool,
}

impl Default for TradingSettings {
    fn default() -> Self {
        Self {
            webhook_token: format!("tw_{}", Uuid::new_v4().simple()),
            chat_webhook_url: None,
            notification_enabled: true,
            sound_enabled: true,
        }
    }
}

/// Partial update applied to the settings record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    pub webhook_token: Option<String>,
    pub chat_webhook_url: Option<String>,
    pub notification_enabled: Option<bool>,
    pub sound_enabled: Option<bool>,
}

impl TradingSettings {
    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(token) = update.webhook_token {
            self.webhook_token = token;
        }
        if let Some(url) = update.chat_webhook_url {
            self.chat_webhook_url = if url.trim().is_empty() {
                None
            } else {
                Some(url)
            };
        }
        if let Some(enabled) = update.notification_enabled {
            self.notification_enabled = enabled;
        }
        if let Some(enabled) = update.sound_enabled {
            self.sound_enabled = enabled;
        }
    }
}

/// Incoming webhook body. The charting platform sends fields under several
/// names (`rsi` or `plot_0`, `price` or `close`) and mixes numbers with
/// numeric strings, so everything is optional and coerced during
/// normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TradingAlertPayload {
    pub ticker: Option<String>,
    pub time: Option<String>,
    pub rsi: Option<Value>,
    pub price: Option<Value>,
    pub message: Option<String>,
    pub alert_condition: Option<String>,
    pub plot_0: Option<Value>,
    pub close: Option<Value>,
}

impl TradingAlertPayload {
    /// Normalize the flexible payload into alert fields. Missing `rsi` falls
    /// back to `plot_0`, missing `price` to `close`, and a missing message is
    /// auto-generated from the ticker and RSI.
    pub fn normalize(self, now: DateTime<Utc>) -> AlertDraft {
        let ticker = self
            .ticker
            .unwrap_or_else(|| "UNKNOWN".to_string())
            .to_uppercase();
        let rsi = coerce_num(self.rsi.or(self.plot_0));
        let price = coerce_num(self.price.or(self.close));
        let time = self.time.unwrap_or_else(|| now.to_rfc3339());
        let message = self
            .message
            .unwrap_or_else(|| format!("{} RSI crossed down to {}", ticker, rsi));
        AlertDraft {
            ticker,
            time,
            rsi,
            price,
            message,
        }
    }
}

fn coerce_num(value: Option<Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => parse_num(&s),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_with_alternate_field_names() {
        // plot_0 stands in for rsi, close for price
        let payload: TradingAlertPayload = serde_json::from_value(serde_json::json!({
            "ticker": "ETHUSDT",
            "plot_0": "28.5",
            "close": "3200"
        }))
        .expect("payload should deserialize");

        let draft = payload.normalize(Utc::now());
        assert_eq!(draft.ticker, "ETHUSDT");
        assert_eq!(draft.rsi, 28.5);
        assert_eq!(draft.price, 3200.0);
        assert!(draft.message.contains("ETHUSDT"));
        assert!(draft.message.contains("28.5"));
    }

    #[test]
    fn test_normalize_prefers_explicit_fields() {
        let payload: TradingAlertPayload = serde_json::from_value(serde_json::json!({
            "ticker": "btcusdt",
            "rsi": 25.0,
            "price": "96000",
            "plot_0": "99",
            "close": "1",
            "message": "custom text"
        }))
        .expect("payload should deserialize");

        let draft = payload.normalize(Utc::now());
        assert_eq!(draft.ticker, "BTCUSDT");
        assert_eq!(draft.rsi, 25.0);
        assert_eq!(draft.price, 96000.0);
        assert_eq!(draft.message, "custom text");
    }

    #[test]
    fn test_normalize_empty_payload() {
        let draft = TradingAlertPayload::default().normalize(Utc::now());
        assert_eq!(draft.ticker, "UNKNOWN");
        assert_eq!(draft.rsi, 0.0);
        assert_eq!(draft.price, 0.0);
        assert!(!draft.time.is_empty());
    }

    #[test]
    fn test_settings_apply_merges_partials() {
        let mut settings = TradingSettings::default();
        let original_token = settings.webhook_token.clone();

        settings.apply(SettingsUpdate {
            chat_webhook_url: Some("https://hooks.example.com/T000/B000".to_string()),
            sound_enabled: Some(false),
            ..SettingsUpdate::default()
        });

        assert_eq!(settings.webhook_token, original_token);
        assert_eq!(
            settings.chat_webhook_url.as_deref(),
            Some("https://hooks.example.com/T000/B000")
        );
        assert!(settings.notification_enabled);
        assert!(!settings.sound_enabled);

        // Blank URL clears the relay
        settings.apply(SettingsUpdate {
            chat_webhook_url: Some("".to_string()),
            ..SettingsUpdate::default()
        });
        assert!(settings.chat_webhook_url.is_none());
    }
}
