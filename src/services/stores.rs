use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use crate::constants::MAX_ALERT_HISTORY;
use crate::error::{Error, Result};
use crate::models::{
    AlertDraft, AlertRecord, SettingsUpdate, TradingSettings, WatchlistItem, WatchlistUpdate,
};

/// Load a store file, falling back to the default on a missing or corrupt
/// file. Corruption is logged, never propagated: losing a local list must not
/// take the service down.
fn load_or_default<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        return T::default();
    }
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Corrupt store file, starting empty");
                T::default()
            }
        },
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Unreadable store file, starting empty");
            T::default()
        }
    }
}

fn persist<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| Error::Storage(format!("Failed to create {}: {}", parent.display(), e)))?;
    }
    let content = serde_json::to_string_pretty(value)
        .map_err(|e| Error::Storage(format!("Failed to encode {}: {}", path.display(), e)))?;
    fs::write(path, content)
        .map_err(|e| Error::Storage(format!("Failed to write {}: {}", path.display(), e)))
}

/// JSON-file-backed watchlist
pub struct WatchlistStore {
    path: PathBuf,
    items: RwLock<Vec<WatchlistItem>>,
}

impl WatchlistStore {
    pub fn open(dir: &Path) -> Self {
        let path = dir.join("watchlist.json");
        let items = load_or_default(&path);
        Self {
            path,
            items: RwLock::new(items),
        }
    }

    pub async fn get_all(&self) -> Vec<WatchlistItem> {
        self.items.read().await.clone()
    }

    pub async fn add(
        &self,
        ticker: String,
        description: String,
        rsi_threshold: f64,
    ) -> Result<WatchlistItem> {
        let item = WatchlistItem {
            id: Uuid::new_v4().to_string(),
            ticker,
            description,
            rsi_threshold,
            created_at: Utc::now().to_rfc3339(),
            is_active: true,
        };

        let mut items = self.items.write().await;
        items.push(item.clone());
        persist(&self.path, &*items)?;
        Ok(item)
    }

    pub async fn remove(&self, id: &str) -> Result<bool> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|item| item.id != id);
        let removed = items.len() != before;
        if removed {
            persist(&self.path, &*items)?;
        }
        Ok(removed)
    }

    pub async fn update(&self, id: &str, update: WatchlistUpdate) -> Result<Option<WatchlistItem>> {
        let mut items = self.items.write().await;
        let Some(item) = items.iter_mut().find(|item| item.id == id) else {
            return Ok(None);
        };

        if let Some(description) = update.description {
            item.description = description;
        }
        if let Some(threshold) = update.rsi_threshold {
            item.rsi_threshold = threshold;
        }
        if let Some(active) = update.is_active {
            item.is_active = active;
        }
        let updated = item.clone();
        persist(&self.path, &*items)?;
        Ok(Some(updated))
    }

    pub async fn find_by_ticker(&self, ticker: &str) -> Option<WatchlistItem> {
        self.items
            .read()
            .await
            .iter()
            .find(|item| item.ticker.eq_ignore_ascii_case(ticker))
            .cloned()
    }

    pub async fn replace_all(&self, records: Vec<WatchlistItem>) -> Result<()> {
        let mut items = self.items.write().await;
        *items = records;
        persist(&self.path, &*items)
    }
}

/// JSON-file-backed alert history, newest first, capped at
/// [`MAX_ALERT_HISTORY`] records.
pub struct AlertStore {
    path: PathBuf,
    alerts: RwLock<Vec<AlertRecord>>,
}

impl AlertStore {
    pub fn open(dir: &Path) -> Self {
        let path = dir.join("alerts.json");
        let alerts = load_or_default(&path);
        Self {
            path,
            alerts: RwLock::new(alerts),
        }
    }

    pub async fn get_all(&self) -> Vec<AlertRecord> {
        self.alerts.read().await.clone()
    }

    pub async fn add(&self, draft: AlertDraft) -> Result<AlertRecord> {
        let record = AlertRecord {
            id: Uuid::new_v4().to_string(),
            ticker: draft.ticker,
            time: draft.time,
            rsi: draft.rsi,
            price: draft.price,
            message: draft.message,
            is_read: false,
        };

        let mut alerts = self.alerts.write().await;
        alerts.insert(0, record.clone());
        alerts.truncate(MAX_ALERT_HISTORY);
        persist(&self.path, &*alerts)?;
        Ok(record)
    }

    /// Most recent alerts by their event time, newest first
    pub async fn recent(&self, limit: usize) -> Vec<AlertRecord> {
        let mut alerts = self.alerts.read().await.clone();
        alerts.sort_by_key(|alert| std::cmp::Reverse(event_millis(alert)));
        alerts.truncate(limit);
        alerts
    }

    pub async fn unread_count(&self) -> usize {
        self.alerts
            .read()
            .await
            .iter()
            .filter(|alert| !alert.is_read)
            .count()
    }

    pub async fn mark_as_read(&self, id: &str) -> Result<bool> {
        let mut alerts = self.alerts.write().await;
        let Some(alert) = alerts.iter_mut().find(|alert| alert.id == id) else {
            return Ok(false);
        };
        alert.is_read = true;
        persist(&self.path, &*alerts)?;
        Ok(true)
    }

    pub async fn mark_all_as_read(&self) -> Result<usize> {
        let mut alerts = self.alerts.write().await;
        let mut marked = 0;
        for alert in alerts.iter_mut() {
            if !alert.is_read {
                alert.is_read = true;
                marked += 1;
            }
        }
        if marked > 0 {
            persist(&self.path, &*alerts)?;
        }
        Ok(marked)
    }

    pub async fn clear(&self) -> Result<()> {
        let mut alerts = self.alerts.write().await;
        alerts.clear();
        persist(&self.path, &*alerts)
    }

    pub async fn replace_all(&self, mut records: Vec<AlertRecord>) -> Result<()> {
        records.truncate(MAX_ALERT_HISTORY);
        let mut alerts = self.alerts.write().await;
        *alerts = records;
        persist(&self.path, &*alerts)
    }
}

fn event_millis(alert: &AlertRecord) -> i64 {
    DateTime::parse_from_rfc3339(&alert.time)
        .map(|time| time.timestamp_millis())
        .unwrap_or(0)
}

/// JSON-file-backed settings record. A fresh store generates a webhook token
/// and persists it so the token survives restarts.
pub struct SettingsStore {
    path: PathBuf,
    settings: RwLock<TradingSettings>,
}

impl SettingsStore {
    pub fn open(dir: &Path) -> Self {
        let path = dir.join("settings.json");
        let settings: TradingSettings = if path.exists() {
            load_or_default(&path)
        } else {
            let fresh = TradingSettings::default();
            if let Err(e) = persist(&path, &fresh) {
                warn!(error = %e, "Failed to persist initial settings");
            }
            fresh
        };
        Self {
            path,
            settings: RwLock::new(settings),
        }
    }

    pub async fn get(&self) -> TradingSettings {
        self.settings.read().await.clone()
    }

    pub async fn save(&self, update: SettingsUpdate) -> Result<TradingSettings> {
        let mut settings = self.settings.write().await;
        settings.apply(update);
        persist(&self.path, &*settings)?;
        Ok(settings.clone())
    }

    pub async fn replace(&self, new_settings: TradingSettings) -> Result<()> {
        let mut settings = self.settings.write().await;
        *settings = new_settings;
        persist(&self.path, &*settings)
    }
}

/// All persisted stores, opened from one data directory
pub struct Stores {
    pub watchlist: WatchlistStore,
    pub alerts: AlertStore,
    pub settings: SettingsStore,
}

impl Stores {
    pub fn open(dir: &Path) -> Self {
        Self {
            watchlist: WatchlistStore::open(dir),
            alerts: AlertStore::open(dir),
            settings: SettingsStore::open(dir),
        }
    }
}

pub type SharedStores = Arc<Stores>;

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("coinpulse-test-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir
    }

    fn draft(ticker: &str, time: &str) -> AlertDraft {
        AlertDraft {
            ticker: ticker.to_string(),
            time: time.to_string(),
            rsi: 28.5,
            price: 3200.0,
            message: format!("{} alert", ticker),
        }
    }

    #[tokio::test]
    async fn test_watchlist_crud_round_trip() {
        let dir = temp_dir();
        let store = WatchlistStore::open(&dir);

        let item = store
            .add("BTC".to_string(), "king".to_string(), 30.0)
            .await
            .unwrap();
        assert!(item.is_active);

        let found = store.find_by_ticker("btc").await.unwrap();
        assert_eq!(found.id, item.id);

        let updated = store
            .update(
                &item.id,
                WatchlistUpdate {
                    is_active: Some(false),
                    ..WatchlistUpdate::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(!updated.is_active);

        // Reopen from disk: the mutation must have persisted
        let reopened = WatchlistStore::open(&dir);
        assert_eq!(reopened.get_all().await.len(), 1);
        assert!(!reopened.get_all().await[0].is_active);

        assert!(store.remove(&item.id).await.unwrap());
        assert!(!store.remove(&item.id).await.unwrap());
        assert!(store.get_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_alert_history_is_capped() {
        let dir = temp_dir();
        let store = AlertStore::open(&dir);

        for i in 0..(MAX_ALERT_HISTORY + 20) {
            store
                .add(draft(&format!("COIN{}", i), "2024-06-01T00:00:00Z"))
                .await
                .unwrap();
        }

        let alerts = store.get_all().await;
        assert_eq!(alerts.len(), MAX_ALERT_HISTORY);
        // Newest first: the last add is at the front, the earliest adds fell off
        assert_eq!(alerts[0].ticker, format!("COIN{}", MAX_ALERT_HISTORY + 19));
        assert!(alerts.iter().all(|alert| alert.ticker != "COIN0"));
    }

    #[tokio::test]
    async fn test_alert_read_flags() {
        let dir = temp_dir();
        let store = AlertStore::open(&dir);

        let first = store.add(draft("BTC", "2024-06-01T00:00:00Z")).await.unwrap();
        store.add(draft("ETH", "2024-06-01T00:00:01Z")).await.unwrap();
        assert_eq!(store.unread_count().await, 2);

        assert!(store.mark_as_read(&first.id).await.unwrap());
        assert_eq!(store.unread_count().await, 1);
        assert!(!store.mark_as_read("missing-id").await.unwrap());

        assert_eq!(store.mark_all_as_read().await.unwrap(), 1);
        assert_eq!(store.unread_count().await, 0);
    }

    #[tokio::test]
    async fn test_recent_sorts_by_event_time() {
        let dir = temp_dir();
        let store = AlertStore::open(&dir);

        store.add(draft("OLD", "2024-06-01T00:00:00Z")).await.unwrap();
        store.add(draft("NEW", "2024-06-02T00:00:00Z")).await.unwrap();
        store.add(draft("MID", "2024-06-01T12:00:00Z")).await.unwrap();

        let recent = store.recent(2).await;
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].ticker, "NEW");
        assert_eq!(recent[1].ticker, "MID");
    }

    #[tokio::test]
    async fn test_settings_token_survives_reopen() {
        let dir = temp_dir();
        let store = SettingsStore::open(&dir);
        let token = store.get().await.webhook_token;
        assert!(token.starts_with("tw_"));

        let reopened = SettingsStore::open(&dir);
        assert_eq!(reopened.get().await.webhook_token, token);
    }

    #[tokio::test]
    async fn test_corrupt_store_starts_empty() {
        let dir = temp_dir();
        fs::write(dir.join("alerts.json"), "{not json").unwrap();
        let store = AlertStore::open(&dir);
        assert!(store.get_all().await.is_empty());
    }
}
