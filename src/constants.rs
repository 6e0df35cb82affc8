//! Exchange and dashboard constants.

/// Default Bithumb public API base URL (override with `BITHUMB_BASE_URL`)
pub const DEFAULT_BITHUMB_BASE_URL: &str = "https://api.bithumb.com";

/// Fiat quote currency for the all-tickers endpoint (`ALL_KRW`)
pub const TICKER_FIAT: &str = "KRW";

/// Application-level success status reported by the exchange.
/// Anything else is a failure even on HTTP 200.
pub const UPSTREAM_OK_STATUS: &str = "0000";

/// Pseudo-key the exchange mixes into the ticker map alongside real symbols
pub const DATE_PSEUDO_KEY: &str = "date";

/// Exchange-local timezone (fixed UTC+9, no DST)
pub const EXCHANGE_TIMEZONE: &str = "Asia/Seoul";

/// Minutes after exchange-local midnight during which the exchange's own
/// daily counters are not yet meaningful
pub const RESET_WINDOW_MINUTES: u32 = 5;

/// Poll period for the ticker worker
pub const POLL_INTERVAL_MS: u64 = 1000;

/// Maximum retained alert records; the oldest beyond this are discarded
pub const MAX_ALERT_HISTORY: usize = 500;

/// Catch-all sector for symbols missing from the sector table
pub const OTHER_SECTOR: &str = "Other";

/// Prioritized sectors, in display order. These always sort before sectors
/// outside the list; the list order breaks ties between them.
pub const MAIN_SECTORS: &[&str] = &[
    "AI",
    "DeFi",
    "GameFi-NFT",
    "Infra",
    "DePIN",
    "Korea-Payment",
    "L1",
    "L2",
    "Meme",
    "RWA",
    "Social-DAO",
    "Stablecoin",
    "Exchange",
    "Privacy",
    "DEX",
];

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8090;

/// Default page size for the coins table
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Upper bound for client-supplied page sizes
pub const MAX_PAGE_SIZE: usize = 100;

/// Webhook token value treated as "not configured" (no auth enforced)
pub const DEFAULT_WEBHOOK_TOKEN: &str = "default-token";
