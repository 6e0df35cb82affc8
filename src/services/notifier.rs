use tracing::{debug, warn};

use crate::models::AlertRecord;

/// Relay a received alert to a chat webhook (Slack-compatible `{"text": ...}`
/// payload). Best-effort: failures are logged and swallowed, because an
/// unreachable chat endpoint must never fail alert ingestion.
pub async fn send_chat_notification(webhook_url: &str, alert: &AlertRecord) {
    let payload = serde_json::json!({
        "text": format!(
            "📉 {} RSI {} at price {}: {}",
            alert.ticker, alert.rsi, alert.price, alert.message
        ),
    });

    match reqwest::Client::new()
        .post(webhook_url)
        .json(&payload)
        .send()
        .await
    {
        Ok(response) if response.status().is_success() => {
            debug!(ticker = %alert.ticker, "Chat notification sent");
        }
        Ok(response) => {
            warn!(
                ticker = %alert.ticker,
                status = %response.status(),
                "Chat webhook rejected notification"
            );
        }
        Err(e) => {
            warn!(ticker = %alert.ticker, error = %e, "Chat notification failed");
        }
    }
}
