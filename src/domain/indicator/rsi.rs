//! Relative Strength Index.
//!
//! Mean gain and mean absolute loss over the most recent `window` price
//! changes, then RSI = 100 - 100/(1 + gain/loss). All-gain windows
//! (loss == 0) saturate at 100.

/// Returns `None` with fewer than `window + 1` prices (a window of changes
/// needs one extra price) or when `window` is 0.
pub fn calculate_rsi(prices: &[f64], window: usize) -> Option<f64> {
    if window == 0 || prices.len() < window + 1 {
        return None;
    }

    let mut gains = Vec::with_capacity(prices.len() - 1);
    let mut losses = Vec::with_capacity(prices.len() - 1);

    for pair in prices.windows(2) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(-change);
        }
    }

    let avg_gain: f64 = gains[gains.len() - window..].iter().sum::<f64>() / window as f64;
    let avg_loss: f64 = losses[losses.len() - window..].iter().sum::<f64>() / window as f64;

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}
