//! Simple Moving Average.
//!
//! Arithmetic mean of the last `window` prices.

/// Returns `None` when the history is shorter than `window` or `window` is 0.
pub fn calculate_sma(prices: &[f64], window: usize) -> Option<f64> {
    if window == 0 || prices.len() < window {
        return None;
    }

    let sum: f64 = prices[prices.len() - window..].iter().sum();
    Some(sum / window as f64)
}
