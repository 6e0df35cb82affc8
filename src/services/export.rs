use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{AlertRecord, TradingSettings, WatchlistItem};
use crate::services::stores::Stores;

/// Everything the user can carry between installations in one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportBundle {
    pub watchlist: Vec<WatchlistItem>,
    pub alerts: Vec<AlertRecord>,
    pub settings: TradingSettings,
    pub exported_at: String,
}

/// Snapshot all stores into an export bundle
pub async fn export_data(stores: &Stores) -> ExportBundle {
    ExportBundle {
        watchlist: stores.watchlist.get_all().await,
        alerts: stores.alerts.get_all().await,
        settings: stores.settings.get().await,
        exported_at: Utc::now().to_rfc3339(),
    }
}

/// Restore all stores from a bundle, replacing current contents. Record ids
/// and flags are preserved as exported.
pub async fn import_data(stores: &Stores, bundle: ExportBundle) -> Result<()> {
    stores.watchlist.replace_all(bundle.watchlist).await?;
    stores.alerts.replace_all(bundle.alerts).await?;
    stores.settings.replace(bundle.settings).await?;
    Ok(())
}
