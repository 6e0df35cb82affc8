mod alert;
mod change;
pub mod sector;
mod ticker;

pub use alert::{
    AlertDraft, AlertRecord, SettingsUpdate, TradingAlertPayload, TradingSettings, WatchlistItem,
    WatchlistUpdate,
};
pub use change::{DerivedChange, DirectionTick};
pub use sector::{SectorMap, SectorSortKey, SectorStats, TopMover};
pub use ticker::{CoinTicker, TickerResponse, TickerSnapshot};
