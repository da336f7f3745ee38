//! Exponential Moving Average.
//!
//! k = 2/(n+1), seed with the SMA of the first n prices, then
//! EMA = price*k + EMA_prev*(1-k) left-to-right over the remainder.
//! With exactly n prices the EMA equals the seed SMA.

use super::sma::calculate_sma;

/// Returns `None` when the history is shorter than `window` or `window` is 0.
pub fn calculate_ema(prices: &[f64], window: usize) -> Option<f64> {
    if window == 0 || prices.len() < window {
        return None;
    }

    let k = 2.0 / (window as f64 + 1.0);
    let mut ema = calculate_sma(&prices[..window], window)?;

    for &price in &prices[window..] {
        ema = price * k + ema * (1.0 - k);
    }

    Some(ema)
}
