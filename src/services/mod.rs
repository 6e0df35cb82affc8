pub mod altcoin_season;
pub mod bithumb;
pub mod export;
pub mod market_data;
pub mod normalizer;
pub mod notifier;
pub mod sector_stats;
pub mod stores;

pub use altcoin_season::{AltcoinSeasonReport, CmcClient};
pub use bithumb::BithumbClient;
pub use export::{export_data, import_data, ExportBundle};
pub use market_data::{HealthStats, MarketData, SharedHealthStats, SharedMarketData};
pub use stores::{AlertStore, SettingsStore, SharedStores, Stores, WatchlistStore};
