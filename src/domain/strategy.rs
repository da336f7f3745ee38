//! Trading strategies and the per-bar decision contract.
//!
//! A strategy maps the close-price history up to and including the current
//! bar to a single [`Action`]. Looking ahead is impossible by construction:
//! the driver only ever hands over a prefix. Whenever an indicator has too
//! little history to answer, the decision is [`Action::Keep`].

use std::collections::BTreeMap;
use std::fmt;

use super::indicator::{
    calculate_bollinger, calculate_ema, calculate_macd, calculate_rsi, calculate_sma,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Buy,
    Sell,
    Keep,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "BUY"),
            Action::Sell => write!(f, "SELL"),
            Action::Keep => write!(f, "KEEP"),
        }
    }
}

/// The closed set of strategy variants, each carrying its own parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    SmaCrossover { fast: usize, slow: usize },
    EmaCrossover { fast: usize, slow: usize },
    Rsi { period: usize, oversold: f64, overbought: f64 },
    Macd { fast: usize, slow: usize, signal: usize },
    Bollinger { period: usize, num_std: f64 },
    Momentum { period: usize, threshold: f64 },
}

impl Strategy {
    pub fn sma_crossover_default() -> Self {
        Strategy::SmaCrossover { fast: 5, slow: 20 }
    }

    pub fn ema_crossover_default() -> Self {
        Strategy::EmaCrossover { fast: 12, slow: 26 }
    }

    pub fn rsi_default() -> Self {
        Strategy::Rsi {
            period: 14,
            oversold: 30.0,
            overbought: 70.0,
        }
    }

    pub fn macd_default() -> Self {
        Strategy::Macd {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }

    pub fn bollinger_default() -> Self {
        Strategy::Bollinger {
            period: 20,
            num_std: 2.0,
        }
    }

    pub fn momentum_default() -> Self {
        Strategy::Momentum {
            period: 10,
            threshold: 0.02,
        }
    }

    /// Decide for the bar at the end of `prices`.
    pub fn decide(&self, prices: &[f64]) -> Action {
        match *self {
            Strategy::SmaCrossover { fast, slow } => {
                let (Some(fast_sma), Some(slow_sma)) =
                    (calculate_sma(prices, fast), calculate_sma(prices, slow))
                else {
                    return Action::Keep;
                };
                compare_signal(fast_sma, slow_sma)
            }
            Strategy::EmaCrossover { fast, slow } => {
                let (Some(fast_ema), Some(slow_ema)) =
                    (calculate_ema(prices, fast), calculate_ema(prices, slow))
                else {
                    return Action::Keep;
                };
                compare_signal(fast_ema, slow_ema)
            }
            Strategy::Rsi {
                period,
                oversold,
                overbought,
            } => {
                let Some(rsi) = calculate_rsi(prices, period) else {
                    return Action::Keep;
                };
                if rsi < oversold {
                    Action::Buy
                } else if rsi > overbought {
                    Action::Sell
                } else {
                    Action::Keep
                }
            }
            Strategy::Macd { fast, slow, signal } => {
                let Some(value) = calculate_macd(prices, fast, slow, signal) else {
                    return Action::Keep;
                };
                compare_signal(value.macd, value.signal)
            }
            Strategy::Bollinger { period, num_std } => {
                let Some(bands) = calculate_bollinger(prices, period, num_std) else {
                    return Action::Keep;
                };
                let Some(&price) = prices.last() else {
                    return Action::Keep;
                };
                if price < bands.lower {
                    Action::Buy
                } else if price > bands.upper {
                    Action::Sell
                } else {
                    Action::Keep
                }
            }
            Strategy::Momentum { period, threshold } => {
                if period == 0 || prices.len() < period + 1 {
                    return Action::Keep;
                }
                let base = prices[prices.len() - 1 - period];
                let momentum = (prices[prices.len() - 1] - base) / base;
                if momentum > threshold {
                    Action::Buy
                } else if momentum < -threshold {
                    Action::Sell
                } else {
                    Action::Keep
                }
            }
        }
    }

    /// Display name, parameters included. Presentation only.
    pub fn name(&self) -> String {
        match *self {
            Strategy::SmaCrossover { fast, slow } => format!("SMA Crossover ({fast}/{slow})"),
            Strategy::EmaCrossover { fast, slow } => format!("EMA Crossover ({fast}/{slow})"),
            Strategy::Rsi {
                oversold,
                overbought,
                ..
            } => format!("RSI ({oversold:.0}/{overbought:.0})"),
            Strategy::Macd { fast, slow, signal } => format!("MACD ({fast}/{slow}/{signal})"),
            Strategy::Bollinger { period, num_std } => {
                format!("Bollinger Bands ({period}, {num_std}σ)")
            }
            Strategy::Momentum { period, threshold } => {
                format!("Momentum ({period}d, {:.0}%)", threshold * 100.0)
            }
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Strategy::SmaCrossover { .. } => {
                "buy when the fast simple moving average is above the slow one"
            }
            Strategy::EmaCrossover { .. } => {
                "buy when the fast exponential moving average is above the slow one"
            }
            Strategy::Rsi { .. } => "buy oversold, sell overbought",
            Strategy::Macd { .. } => "buy when the MACD line is above its signal line",
            Strategy::Bollinger { .. } => {
                "buy below the lower band, sell above the upper band"
            }
            Strategy::Momentum { .. } => {
                "follow the N-day return when it clears the threshold"
            }
        }
    }

    /// Parameter map persisted alongside run results.
    pub fn params(&self) -> BTreeMap<String, f64> {
        let mut map = BTreeMap::new();
        match *self {
            Strategy::SmaCrossover { fast, slow } | Strategy::EmaCrossover { fast, slow } => {
                map.insert("fast".into(), fast as f64);
                map.insert("slow".into(), slow as f64);
            }
            Strategy::Rsi {
                period,
                oversold,
                overbought,
            } => {
                map.insert("period".into(), period as f64);
                map.insert("oversold".into(), oversold);
                map.insert("overbought".into(), overbought);
            }
            Strategy::Macd { fast, slow, signal } => {
                map.insert("fast".into(), fast as f64);
                map.insert("slow".into(), slow as f64);
                map.insert("signal".into(), signal as f64);
            }
            Strategy::Bollinger { period, num_std } => {
                map.insert("period".into(), period as f64);
                map.insert("num_std".into(), num_std);
            }
            Strategy::Momentum { period, threshold } => {
                map.insert("period".into(), period as f64);
                map.insert("threshold".into(), threshold);
            }
        }
        map
    }

    /// Smallest history length for which `decide` can return a signal.
    pub fn min_history(&self) -> usize {
        match *self {
            Strategy::SmaCrossover { fast, slow } | Strategy::EmaCrossover { fast, slow } => {
                fast.max(slow)
            }
            Strategy::Rsi { period, .. } | Strategy::Momentum { period, .. } => period + 1,
            Strategy::Macd { slow, signal, .. } => slow + signal,
            Strategy::Bollinger { period, .. } => period,
        }
    }
}

fn compare_signal(fast: f64, slow: f64) -> Action {
    if fast > slow {
        Action::Buy
    } else if fast < slow {
        Action::Sell
    } else {
        Action::Keep
    }
}
