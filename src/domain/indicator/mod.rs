//! Technical indicators over a close-price prefix.
//!
//! Every function takes the price history up to and including the current
//! bar and answers for that bar only. `None` means "not enough history yet";
//! strategies treat it uniformly as no signal. Sentinel numbers are never
//! used.

pub mod sma;
pub mod ema;
pub mod rsi;
pub mod macd;
pub mod bollinger;

pub use bollinger::calculate_bollinger;
pub use ema::calculate_ema;
pub use macd::calculate_macd;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;

/// One MACD evaluation: line, signal line, and their difference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdValue {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// One Bollinger Bands evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}
