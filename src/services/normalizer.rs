use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;
use tracing::warn;

use crate::constants::{EXCHANGE_TIMEZONE, RESET_WINDOW_MINUTES};
use crate::models::{CoinTicker, DerivedChange, DirectionTick, TickerSnapshot};
use crate::utils::round2;

/// True while the exchange's daily counters are still resetting: the first
/// five minutes after exchange-local midnight (fixed UTC+9).
pub fn in_reset_window(now: DateTime<Utc>) -> bool {
    let tz: Tz = match EXCHANGE_TIMEZONE.parse() {
        Ok(tz) => tz,
        Err(e) => {
            warn!("Failed to parse timezone '{}': {}", EXCHANGE_TIMEZONE, e);
            return false;
        }
    };

    let local = now.with_timezone(&tz);
    local.hour() == 0 && local.minute() < RESET_WINDOW_MINUTES
}

/// Directional tick against the previous poll cycle. A first observation
/// always renders as a rise; otherwise resolved prices are compared.
fn direction_tick(current: &CoinTicker, previous: Option<&CoinTicker>) -> DirectionTick {
    let Some(previous) = previous else {
        return DirectionTick::Up;
    };

    let now_price = current.resolved_price();
    let before_price = previous.resolved_price();

    if now_price > before_price {
        DirectionTick::Up
    } else if now_price < before_price {
        DirectionTick::Down
    } else {
        DirectionTick::Same
    }
}

/// Real-time change against the day's opening price.
///
/// The local recomputation exists because the exchange's own 24h-change
/// fields are unreliable right after the daily reset; inside the reset window
/// (or when the day's prices are still zeroed) the change is forced flat.
fn derive_change(ticker: &CoinTicker, reset_window: bool) -> (f64, f64) {
    let opening = ticker.opening_price_num();
    let closing = ticker.closing_price_num();
    let resolved = ticker.resolved_price();

    if reset_window || (opening == 0.0 && closing == 0.0) {
        return (0.0, 0.0);
    }

    if opening > 0.0 && resolved > 0.0 {
        let amount = resolved - opening;
        return (amount, round2(amount / opening * 100.0));
    }

    // Day-open not available outside the reset window; trust the exchange's
    // own 24h counters.
    (ticker.fluctate_24h_num(), ticker.fluctate_rate_24h_num())
}

/// Compute per-symbol derived changes for one poll cycle.
///
/// `previous` is the prior cycle's snapshot (None on the first cycle); it
/// only influences the directional tick, never the change amounts.
pub fn normalize(
    current: &TickerSnapshot,
    previous: Option<&TickerSnapshot>,
    now: DateTime<Utc>,
) -> HashMap<String, DerivedChange> {
    let reset_window = in_reset_window(now);

    current
        .iter()
        .map(|(symbol, ticker)| {
            let tick = direction_tick(ticker, previous.and_then(|prev| prev.get(symbol)));
            let (amount, percent) = derive_change(ticker, reset_window);
            (
                symbol.clone(),
                DerivedChange {
                    tick,
                    amount,
                    percent,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ticker(opening: &str, closing: &str, prev_closing: &str) -> CoinTicker {
        CoinTicker {
            opening_price: opening.to_string(),
            closing_price: closing.to_string(),
            prev_closing_price: prev_closing.to_string(),
            ..CoinTicker::default()
        }
    }

    fn snapshot(entries: &[(&str, CoinTicker)]) -> TickerSnapshot {
        entries
            .iter()
            .map(|(symbol, t)| (symbol.to_string(), t.clone()))
            .collect()
    }

    /// 03:00 UTC = 12:00 KST, well outside the reset window
    fn midday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 3, 0, 0).unwrap()
    }

    /// 15:02 UTC = 00:02 KST the next day, inside the reset window
    fn shortly_after_midnight() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 15, 2, 0).unwrap()
    }

    #[test]
    fn test_reset_window_boundaries() {
        assert!(in_reset_window(shortly_after_midnight()));
        // 00:04:59 KST is still inside, 00:05:00 is not
        assert!(in_reset_window(
            Utc.with_ymd_and_hms(2024, 6, 1, 15, 4, 59).unwrap()
        ));
        assert!(!in_reset_window(
            Utc.with_ymd_and_hms(2024, 6, 1, 15, 5, 0).unwrap()
        ));
        assert!(!in_reset_window(midday()));
    }

    #[test]
    fn test_change_from_opening_price() {
        let current = snapshot(&[("BTC", ticker("100", "110", "99"))]);
        let changes = normalize(&current, None, midday());

        let btc = &changes["BTC"];
        assert_eq!(btc.amount, 10.0);
        assert_eq!(btc.percent, 10.0);
    }

    #[test]
    fn test_reset_window_forces_flat_change() {
        let current = snapshot(&[("BTC", ticker("100", "110", "99"))]);
        let changes = normalize(&current, None, shortly_after_midnight());

        let btc = &changes["BTC"];
        assert_eq!(btc.amount, 0.0);
        assert_eq!(btc.percent, 0.0);
    }

    #[test]
    fn test_zeroed_day_prices_force_flat_change() {
        let current = snapshot(&[("BTC", ticker("0", "0", "500"))]);
        let changes = normalize(&current, None, midday());

        let btc = &changes["BTC"];
        assert_eq!(btc.amount, 0.0);
        assert_eq!(btc.percent, 0.0);
    }

    #[test]
    fn test_zeroed_closing_uses_prev_close() {
        // Exchange zeroed closing_price mid-reset; prev close carries the math
        let current = snapshot(&[("BTC", ticker("400", "0", "500"))]);
        let changes = normalize(&current, None, midday());

        let btc = &changes["BTC"];
        assert_eq!(btc.amount, 100.0);
        assert_eq!(btc.percent, 25.0);
    }

    #[test]
    fn test_fallback_to_upstream_change_fields() {
        let mut t = ticker("0", "3200", "3100");
        t.fluctate_24h = "150".to_string();
        t.fluctate_rate_24h = "4.92".to_string();
        let current = snapshot(&[("ETH", t)]);
        let changes = normalize(&current, None, midday());

        let eth = &changes["ETH"];
        assert_eq!(eth.amount, 150.0);
        assert_eq!(eth.percent, 4.92);
    }

    #[test]
    fn test_junk_opening_price_falls_back() {
        let mut t = ticker("n/a", "3200", "3100");
        t.fluctate_rate_24h = "1.5".to_string();
        let current = snapshot(&[("ETH", t)]);
        let changes = normalize(&current, None, midday());
        assert_eq!(changes["ETH"].percent, 1.5);
    }

    #[test]
    fn test_percent_rounds_to_two_decimals() {
        // (1/3) * 100 = 33.333... -> 33.33
        let current = snapshot(&[("BTC", ticker("300", "301", "299"))]);
        let changes = normalize(&current, None, midday());
        assert_eq!(changes["BTC"].percent, 0.33);
    }

    #[test]
    fn test_first_observation_ticks_up() {
        let current = snapshot(&[("BTC", ticker("100", "105", "99"))]);
        let changes = normalize(&current, None, midday());
        assert_eq!(changes["BTC"].tick, DirectionTick::Up);
    }

    #[test]
    fn test_tick_down_between_cycles() {
        let previous = snapshot(&[("BTC", ticker("100", "100", "99"))]);
        let current = snapshot(&[("BTC", ticker("100", "95", "99"))]);
        let changes = normalize(&current, Some(&previous), midday());
        assert_eq!(changes["BTC"].tick, DirectionTick::Down);
    }

    #[test]
    fn test_tick_same_on_equal_resolved_price() {
        let previous = snapshot(&[("BTC", ticker("100", "105", "99"))]);
        let current = snapshot(&[("BTC", ticker("100", "105", "99"))]);
        let changes = normalize(&current, Some(&previous), midday());
        assert_eq!(changes["BTC"].tick, DirectionTick::Same);
    }

    #[test]
    fn test_symbol_new_to_current_cycle_ticks_up() {
        let previous = snapshot(&[("BTC", ticker("100", "105", "99"))]);
        let current = snapshot(&[
            ("BTC", ticker("100", "106", "99")),
            ("NEWCOIN", ticker("10", "12", "9")),
        ]);
        let changes = normalize(&current, Some(&previous), midday());
        assert_eq!(changes["NEWCOIN"].tick, DirectionTick::Up);
        assert_eq!(changes["BTC"].tick, DirectionTick::Up);
    }
}
