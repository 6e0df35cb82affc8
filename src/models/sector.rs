use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::constants::{MAIN_SECTORS, OTHER_SECTOR};

/// Curated symbol -> sector table. Hand-maintained; symbols missing here fall
/// into the catch-all sector.
const DEFAULT_SECTOR_TABLE: &[(&str, &str)] = &[
    // AI
    ("WLD", "AI"),
    ("FET", "AI"),
    ("AGIX", "AI"),
    ("OCEAN", "AI"),
    ("TAO", "AI"),
    ("ARKM", "AI"),
    ("VIRTUAL", "AI"),
    ("AIXBT", "AI"),
    ("AI16Z", "AI"),
    ("KAITO", "AI"),
    ("NMR", "AI"),
    ("TURBO", "AI"),
    ("CTXC", "AI"),
    // DeFi
    ("UNI", "DeFi"),
    ("SUSHI", "DeFi"),
    ("CRV", "DeFi"),
    ("BAL", "DeFi"),
    ("CAKE", "DeFi"),
    ("JUP", "DeFi"),
    ("RAY", "DeFi"),
    ("1INCH", "DeFi"),
    ("ZRX", "DeFi"),
    ("KNC", "DeFi"),
    ("DYDX", "DeFi"),
    ("GMX", "DeFi"),
    ("AAVE", "DeFi"),
    ("COMP", "DeFi"),
    ("MKR", "DeFi"),
    ("YFI", "DeFi"),
    ("PENDLE", "DeFi"),
    ("SNX", "DeFi"),
    ("UMA", "DeFi"),
    ("WOO", "DeFi"),
    ("OSMO", "DeFi"),
    ("AERO", "DeFi"),
    // GameFi-NFT
    ("AXS", "GameFi-NFT"),
    ("SAND", "GameFi-NFT"),
    ("MANA", "GameFi-NFT"),
    ("GALA", "GameFi-NFT"),
    ("MAGIC", "GameFi-NFT"),
    ("ALICE", "GameFi-NFT"),
    ("ILV", "GameFi-NFT"),
    ("RON", "GameFi-NFT"),
    ("XAI", "GameFi-NFT"),
    ("BIGTIME", "GameFi-NFT"),
    ("ENJ", "GameFi-NFT"),
    ("IMX", "GameFi-NFT"),
    ("BLUR", "GameFi-NFT"),
    ("APE", "GameFi-NFT"),
    ("WAXP", "GameFi-NFT"),
    ("PENGU", "GameFi-NFT"),
    ("GMT", "GameFi-NFT"),
    ("YGG", "GameFi-NFT"),
    ("CHZ", "GameFi-NFT"),
    ("ME", "GameFi-NFT"),
    // Infra
    ("GRT", "Infra"),
    ("ANKR", "Infra"),
    ("RLC", "Infra"),
    ("FLUX", "Infra"),
    ("THETA", "Infra"),
    ("BAT", "Infra"),
    ("LPT", "Infra"),
    ("TFUEL", "Infra"),
    ("SFP", "Infra"),
    ("BICO", "Infra"),
    ("CTK", "Infra"),
    ("ZRO", "Infra"),
    ("STG", "Infra"),
    ("W", "Infra"),
    ("CELR", "Infra"),
    ("ASTR", "Infra"),
    ("LINK", "Infra"),
    ("BAND", "Infra"),
    ("API3", "Infra"),
    ("PYTH", "Infra"),
    ("JASMY", "Infra"),
    ("IOTX", "Infra"),
    ("FIL", "Infra"),
    ("AR", "Infra"),
    ("STORJ", "Infra"),
    ("BTT", "Infra"),
    ("SC", "Infra"),
    ("VET", "Infra"),
    ("IOTA", "Infra"),
    ("KSM", "Infra"),
    // DePIN
    ("RENDER", "DePIN"),
    ("IO", "DePIN"),
    ("AIOZ", "DePIN"),
    ("AKT", "DePIN"),
    ("GLM", "DePIN"),
    ("ATH", "DePIN"),
    ("PEAQ", "DePIN"),
    ("VANA", "DePIN"),
    ("POWR", "DePIN"),
    ("GRASS", "DePIN"),
    // Korea-Payment
    ("ICX", "Korea-Payment"),
    ("BFC", "Korea-Payment"),
    ("BORA", "Korea-Payment"),
    ("META", "Korea-Payment"),
    ("MVL", "Korea-Payment"),
    ("MED", "Korea-Payment"),
    ("MLK", "Korea-Payment"),
    ("HUNT", "Korea-Payment"),
    ("WEMIX", "Korea-Payment"),
    ("MBL", "Korea-Payment"),
    ("XRP", "Korea-Payment"),
    ("LTC", "Korea-Payment"),
    ("BCH", "Korea-Payment"),
    ("XLM", "Korea-Payment"),
    ("DASH", "Korea-Payment"),
    ("ACH", "Korea-Payment"),
    ("REQ", "Korea-Payment"),
    ("AMP", "Korea-Payment"),
    ("MTL", "Korea-Payment"),
    ("PUNDIX", "Korea-Payment"),
    ("SXP", "Korea-Payment"),
    ("COTI", "Korea-Payment"),
    ("XYO", "Korea-Payment"),
    // L1
    ("BTC", "L1"),
    ("ETH", "L1"),
    ("BNB", "L1"),
    ("SOL", "L1"),
    ("ADA", "L1"),
    ("AVAX", "L1"),
    ("DOT", "L1"),
    ("TRX", "L1"),
    ("TON", "L1"),
    ("NEAR", "L1"),
    ("ICP", "L1"),
    ("ATOM", "L1"),
    ("APT", "L1"),
    ("SUI", "L1"),
    ("HBAR", "L1"),
    ("ALGO", "L1"),
    ("SEI", "L1"),
    ("KLAY", "L1"),
    ("KAIA", "L1"),
    ("WAVES", "L1"),
    ("NEO", "L1"),
    ("EOS", "L1"),
    ("QTUM", "L1"),
    ("ONT", "L1"),
    ("ZIL", "L1"),
    ("FLOW", "L1"),
    ("ROSE", "L1"),
    ("EGLD", "L1"),
    ("FTM", "L1"),
    ("CELO", "L1"),
    ("MINA", "L1"),
    ("CORE", "L1"),
    ("ETC", "L1"),
    ("INJ", "L1"),
    ("CRO", "L1"),
    ("XTZ", "L1"),
    ("FLR", "L1"),
    ("KAVA", "L1"),
    ("LSK", "L1"),
    ("ARK", "L1"),
    ("BERA", "L1"),
    ("GAS", "L1"),
    ("CKB", "L1"),
    ("XEC", "L1"),
    ("SONIC", "L1"),
    // L2
    ("ARB", "L2"),
    ("OP", "L2"),
    ("MATIC", "L2"),
    ("POL", "L2"),
    ("STRK", "L2"),
    ("METIS", "L2"),
    ("BOBA", "L2"),
    ("LRC", "L2"),
    ("SCR", "L2"),
    ("ZK", "L2"),
    ("TAIKO", "L2"),
    ("MNT", "L2"),
    ("MANTA", "L2"),
    ("SKL", "L2"),
    ("CTSI", "L2"),
    ("CYBER", "L2"),
    ("STX", "L2"),
    ("MOVE", "L2"),
    ("TIA", "L2"),
    ("ALT", "L2"),
    ("LAYER", "L2"),
    // Meme
    ("DOGE", "Meme"),
    ("SHIB", "Meme"),
    ("PEPE", "Meme"),
    ("BONK", "Meme"),
    ("WIF", "Meme"),
    ("POPCAT", "Meme"),
    ("MEW", "Meme"),
    ("BRETT", "Meme"),
    ("MOODENG", "Meme"),
    ("PNUT", "Meme"),
    ("GOAT", "Meme"),
    ("NEIRO", "Meme"),
    ("FARTCOIN", "Meme"),
    ("FLOKI", "Meme"),
    ("ANIME", "Meme"),
    ("TRUMP", "Meme"),
    // RWA
    ("ONDO", "RWA"),
    ("POLYX", "RWA"),
    ("PLUME", "RWA"),
    ("OM", "RWA"),
    ("SOLV", "RWA"),
    ("USUAL", "RWA"),
    ("FXS", "RWA"),
    ("EL", "RWA"),
    ("AQT", "RWA"),
    // Social-DAO
    ("MASK", "Social-DAO"),
    ("ENS", "Social-DAO"),
    ("HIVE", "Social-DAO"),
    ("STEEM", "Social-DAO"),
    ("SNT", "Social-DAO"),
    ("CVC", "Social-DAO"),
    ("ID", "Social-DAO"),
    ("GTC", "Social-DAO"),
    ("SAFE", "Social-DAO"),
    ("GNO", "Social-DAO"),
    ("DCR", "Social-DAO"),
    ("AUDIO", "Social-DAO"),
    ("OGN", "Social-DAO"),
    ("IP", "Social-DAO"),
    ("HOOK", "Social-DAO"),
    ("EDU", "Social-DAO"),
    ("WLFI", "Social-DAO"),
    // Stablecoin
    ("USDT", "Stablecoin"),
    ("USDC", "Stablecoin"),
    ("DAI", "Stablecoin"),
    ("FRAX", "Stablecoin"),
    ("TUSD", "Stablecoin"),
    ("USDS", "Stablecoin"),
    ("RSR", "Stablecoin"),
    ("ENA", "Stablecoin"),
    ("SKY", "Stablecoin"),
    ("PAXG", "Stablecoin"),
    ("LDO", "Stablecoin"),
    ("RPL", "Stablecoin"),
    ("JTO", "Stablecoin"),
    ("EIGEN", "Stablecoin"),
    ("ETHFI", "Stablecoin"),
    ("REZ", "Stablecoin"),
    ("BABY", "Stablecoin"),
    // Exchange
    ("AVNT", "Exchange"),
    ("DRIFT", "Exchange"),
    ("F", "Exchange"),
    ("WCT", "Exchange"),
    // Privacy
    ("ZEC", "Privacy"),
    ("XMR", "Privacy"),
    ("T", "Privacy"),
    ("ARPA", "Privacy"),
    ("OXT", "Privacy"),
    ("SCRT", "Privacy"),
    ("GRS", "Privacy"),
    // DEX
    ("CUDIS", "DEX"),
];

/// Read-only symbol -> sector mapping, injected into the aggregator so tests
/// can supply synthetic tables.
#[derive(Debug, Clone)]
pub struct SectorMap {
    map: HashMap<String, String>,
}

impl SectorMap {
    /// The curated default table shipped with the crate
    pub fn default_map() -> Self {
        Self::from_pairs(DEFAULT_SECTOR_TABLE)
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let map = pairs
            .iter()
            .map(|(symbol, sector)| (symbol.to_string(), sector.to_string()))
            .collect();
        Self { map }
    }

    /// Sector for a symbol, falling back to the catch-all sector
    pub fn sector_of(&self, symbol: &str) -> &str {
        self.map
            .get(symbol)
            .map(String::as_str)
            .unwrap_or(OTHER_SECTOR)
    }

    /// Number of mapped symbols
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of distinct sectors in the table
    pub fn sector_count(&self) -> usize {
        let mut sectors: Vec<&str> = self.map.values().map(String::as_str).collect();
        sectors.sort_unstable();
        sectors.dedup();
        sectors.len()
    }
}

/// Whether a sector is one of the prioritized main sectors
pub fn is_main_sector(name: &str) -> bool {
    MAIN_SECTORS.contains(&name)
}

/// Position in the main-sector list; sectors outside it rank last
pub fn main_sector_rank(name: &str) -> usize {
    MAIN_SECTORS
        .iter()
        .position(|sector| *sector == name)
        .unwrap_or(usize::MAX)
}

/// Top gainer / top loser entry within a sector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopMover {
    pub symbol: String,
    pub change: f64,
}

/// Per-sector statistics derived each poll cycle.
///
/// `avg_change_percent` is the unweighted arithmetic mean of member change
/// percentages, not volume-weighted. Zero-change members count toward
/// `count` but toward neither `positive_count` nor `negative_count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorStats {
    pub count: usize,
    pub avg_change_percent: f64,
    pub total_volume: f64,
    pub positive_count: usize,
    pub negative_count: usize,
    pub top_gainer: Option<TopMover>,
    pub top_loser: Option<TopMover>,
}

/// Secondary sort key for sector listings (main sectors always come first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectorSortKey {
    AvgChange,
    Count,
    Volume,
    Positive,
}

impl Default for SectorSortKey {
    fn default() -> Self {
        SectorSortKey::AvgChange
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sector_of_with_fallback() {
        let map = SectorMap::default_map();
        assert_eq!(map.sector_of("BTC"), "L1");
        assert_eq!(map.sector_of("DOGE"), "Meme");
        assert_eq!(map.sector_of("NO-SUCH-COIN"), OTHER_SECTOR);
    }

    #[test]
    fn test_default_table_covers_all_main_sectors() {
        let map = SectorMap::default_map();
        assert_eq!(map.sector_count(), MAIN_SECTORS.len());
    }

    #[test]
    fn test_main_sector_rank_follows_list_order() {
        assert!(is_main_sector("L1"));
        assert!(!is_main_sector(OTHER_SECTOR));
        assert!(main_sector_rank("AI") < main_sector_rank("L1"));
        assert_eq!(main_sector_rank("Other"), usize::MAX);
    }
}
