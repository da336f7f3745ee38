//! Configuration validation.
//!
//! All backtest and strategy parameters are validated here, once, before a
//! run starts. `decide` and the execution engine never re-check them.

use crate::domain::error::MocktraderError;
use crate::ports::config_port::ConfigPort;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), MocktraderError> {
    validate_ticker(config)?;
    validate_fee_rate(config)?;
    validate_cooldown(config)?;
    validate_order_ratio(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), MocktraderError> {
    let kind = config
        .get_string("strategy", "kind")
        .unwrap_or_else(|| "sma_crossover".to_string());

    match kind.as_str() {
        "sma_crossover" => validate_crossover(config, 5, 20),
        "ema_crossover" => validate_crossover(config, 12, 26),
        "rsi" => validate_rsi(config),
        "macd" => validate_macd(config),
        "bollinger" => validate_bollinger(config),
        "momentum" => validate_momentum(config),
        other => Err(MocktraderError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "kind".to_string(),
            reason: format!("unknown strategy kind '{other}'"),
        }),
    }
}

fn invalid(key: &str, reason: &str) -> MocktraderError {
    MocktraderError::ConfigInvalid {
        section: "strategy".to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_ticker(config: &dyn ConfigPort) -> Result<(), MocktraderError> {
    match config.get_string("backtest", "ticker") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(MocktraderError::ConfigMissing {
            section: "backtest".to_string(),
            key: "ticker".to_string(),
        }),
    }
}

fn validate_fee_rate(config: &dyn ConfigPort) -> Result<(), MocktraderError> {
    let value = config.get_double("backtest", "fee_rate", 0.0005);
    if !(0.0..1.0).contains(&value) {
        return Err(MocktraderError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "fee_rate".to_string(),
            reason: "fee_rate must be a fraction in [0, 1)".to_string(),
        });
    }
    Ok(())
}

fn validate_cooldown(config: &dyn ConfigPort) -> Result<(), MocktraderError> {
    let value = config.get_int("backtest", "cooldown", 0);
    if value < 0 {
        return Err(MocktraderError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "cooldown".to_string(),
            reason: "cooldown must be a non-negative number of bars".to_string(),
        });
    }
    Ok(())
}

fn validate_order_ratio(config: &dyn ConfigPort) -> Result<(), MocktraderError> {
    let value = config.get_double("backtest", "order_ratio", 0.3);
    if value <= 0.0 || value > 1.0 {
        return Err(MocktraderError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "order_ratio".to_string(),
            reason: "order_ratio must be in (0, 1]".to_string(),
        });
    }
    Ok(())
}

fn validate_crossover(
    config: &dyn ConfigPort,
    default_fast: i64,
    default_slow: i64,
) -> Result<(), MocktraderError> {
    let fast = config.get_int("strategy", "fast", default_fast);
    let slow = config.get_int("strategy", "slow", default_slow);

    if fast < 1 {
        return Err(invalid("fast", "fast period must be at least 1"));
    }
    if slow <= fast {
        return Err(invalid("slow", "slow period must be greater than fast"));
    }
    Ok(())
}

fn validate_rsi(config: &dyn ConfigPort) -> Result<(), MocktraderError> {
    let period = config.get_int("strategy", "period", 14);
    let oversold = config.get_double("strategy", "oversold", 30.0);
    let overbought = config.get_double("strategy", "overbought", 70.0);

    if period < 1 {
        return Err(invalid("period", "period must be at least 1"));
    }
    if !(0.0..=100.0).contains(&oversold) || !(0.0..=100.0).contains(&overbought) {
        return Err(invalid(
            "oversold",
            "oversold and overbought must be within [0, 100]",
        ));
    }
    if oversold >= overbought {
        return Err(invalid(
            "oversold",
            "oversold must be below overbought",
        ));
    }
    Ok(())
}

fn validate_macd(config: &dyn ConfigPort) -> Result<(), MocktraderError> {
    let fast = config.get_int("strategy", "fast", 12);
    let slow = config.get_int("strategy", "slow", 26);
    let signal = config.get_int("strategy", "signal", 9);

    if fast < 1 {
        return Err(invalid("fast", "fast period must be at least 1"));
    }
    if slow <= fast {
        return Err(invalid("slow", "slow period must be greater than fast"));
    }
    if signal < 1 {
        return Err(invalid("signal", "signal period must be at least 1"));
    }
    Ok(())
}

fn validate_bollinger(config: &dyn ConfigPort) -> Result<(), MocktraderError> {
    let period = config.get_int("strategy", "period", 20);
    let num_std = config.get_double("strategy", "num_std", 2.0);

    if period < 1 {
        return Err(invalid("period", "period must be at least 1"));
    }
    if num_std <= 0.0 {
        return Err(invalid("num_std", "num_std must be positive"));
    }
    Ok(())
}

fn validate_momentum(config: &dyn ConfigPort) -> Result<(), MocktraderError> {
    let period = config.get_int("strategy", "period", 10);
    let threshold = config.get_double("strategy", "threshold", 0.02);

    if period < 1 {
        return Err(invalid("period", "period must be at least 1"));
    }
    if threshold <= 0.0 {
        return Err(invalid("threshold", "threshold must be positive"));
    }
    Ok(())
}
