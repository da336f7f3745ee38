//! Bollinger Bands.
//!
//! Middle band = SMA(window); upper/lower = middle ± num_std × population
//! standard deviation over the same window (divides by N, not N-1).

use super::sma::calculate_sma;
use super::BollingerBands;

/// Returns `None` when the history is shorter than `window` or `window` is 0.
pub fn calculate_bollinger(
    prices: &[f64],
    window: usize,
    num_std: f64,
) -> Option<BollingerBands> {
    let middle = calculate_sma(prices, window)?;

    let recent = &prices[prices.len() - window..];
    let variance = recent
        .iter()
        .map(|p| {
            let diff = p - middle;
            diff * diff
        })
        .sum::<f64>()
        / window as f64;
    let std_dev = variance.sqrt();

    Some(BollingerBands {
        upper: middle + num_std * std_dev,
        middle,
        lower: middle - num_std * std_dev,
    })
}
