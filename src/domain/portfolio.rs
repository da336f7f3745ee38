//! Portfolio state and trade records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side. The only two sides the engine knows about; full-position
/// sells are implied by the single-asset model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Mutable account state for one backtest run. The driver owns the only
/// live instance; only the execution engine mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub asset_qty: f64,
    pub last_price: f64,
    /// Bar index of the most recent fill; 0 if none yet.
    pub last_trade_ts: i64,
}

impl Portfolio {
    pub fn new(cash: f64) -> Self {
        Portfolio {
            cash,
            asset_qty: 0.0,
            last_price: 0.0,
            last_trade_ts: 0,
        }
    }

    /// Mark-to-market equity: cash plus held quantity at the last seen price.
    pub fn equity(&self) -> f64 {
        self.cash + self.asset_qty * self.last_price
    }
}

/// Immutable record of one completed fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Bar index at fill time.
    pub ts: i64,
    pub side: Side,
    /// Execution price, post-slippage.
    pub price: f64,
    pub qty: f64,
    pub fee: f64,
    /// Display name of the strategy that produced the signal.
    #[serde(rename = "rule")]
    pub rule_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_portfolio() {
        let pf = Portfolio::new(1_000_000.0);
        assert!((pf.cash - 1_000_000.0).abs() < f64::EPSILON);
        assert_eq!(pf.asset_qty, 0.0);
        assert_eq!(pf.last_price, 0.0);
        assert_eq!(pf.last_trade_ts, 0);
    }

    #[test]
    fn equity_cash_only() {
        let pf = Portfolio::new(50_000.0);
        assert!((pf.equity() - 50_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn equity_marks_asset_to_market() {
        let mut pf = Portfolio::new(10_000.0);
        pf.asset_qty = 100.0;
        pf.last_price = 55.0;
        assert!((pf.equity() - 15_500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn side_display() {
        assert_eq!(Side::Buy.to_string(), "BUY");
        assert_eq!(Side::Sell.to_string(), "SELL");
    }

    #[test]
    fn trade_serde_round_trip() {
        let trade = Trade {
            ts: 7,
            side: Side::Buy,
            price: 101.1,
            qty: 9.5,
            fee: 0.48,
            rule_name: "SMA Crossover (5/20)".into(),
        };
        let json = serde_json::to_string(&trade).unwrap();
        let back: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(back, trade);
    }

    #[test]
    fn side_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Side::Buy).unwrap(), "\"BUY\"");
        assert_eq!(serde_json::to_string(&Side::Sell).unwrap(), "\"SELL\"");
    }
}
