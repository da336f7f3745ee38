//! Moving Average Convergence Divergence.
//!
//! MACD line = EMA(fast) - EMA(slow) over the full history. The signal line
//! is the SMA of the trailing `signal` MACD values, each obtained by
//! re-evaluating both EMAs on the prefix ending at that bar. Recomputing per
//! prefix is quadratic in the slow window but bounded by backtest length,
//! and its output is the contract.

use super::ema::calculate_ema;
use super::sma::calculate_sma;
use super::MacdValue;

/// Returns `None` with fewer than `slow + signal` prices or any zero period.
pub fn calculate_macd(
    prices: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> Option<MacdValue> {
    if fast == 0 || slow == 0 || signal == 0 || prices.len() < slow + signal {
        return None;
    }

    let macd_line = calculate_ema(prices, fast)? - calculate_ema(prices, slow)?;

    let mut macd_values = Vec::with_capacity(prices.len() - slow);
    for end in slow..prices.len() {
        let prefix = &prices[..=end];
        if let (Some(ema_fast), Some(ema_slow)) =
            (calculate_ema(prefix, fast), calculate_ema(prefix, slow))
        {
            macd_values.push(ema_fast - ema_slow);
        }
    }

    let signal_line = calculate_sma(&macd_values, signal)?;

    Some(MacdValue {
        macd: macd_line,
        signal: signal_line,
        histogram: macd_line - signal_line,
    })
}
