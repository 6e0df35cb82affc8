use serde::{Deserialize, Serialize};

/// Direction of the price move between two consecutive poll cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionTick {
    Up,
    Down,
    Same,
}

/// Per-symbol change derived fresh on every poll cycle, never persisted.
///
/// `amount` and `percent` are measured against the day's opening price
/// ("real-time change"), as distinct from the exchange's own 24h fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedChange {
    pub tick: DirectionTick,
    /// Change in quote currency
    pub amount: f64,
    /// Change percentage, rounded to two decimals
    pub percent: f64,
}
