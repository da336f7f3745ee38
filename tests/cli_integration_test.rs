//! CLI assembly tests: real INI files on disk through the config adapter
//! into strategies, settings, and validation.

use mocktrader::adapters::file_config_adapter::FileConfigAdapter;
use mocktrader::cli::{build_settings, build_strategy, period_bars};
use mocktrader::ports::config_port::ConfigPort;
use mocktrader::domain::config_validation::{
    validate_backtest_config, validate_strategy_config,
};
use mocktrader::domain::strategy::Strategy;
use std::io::Write;
use tempfile::NamedTempFile;

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{content}").unwrap();
    file
}

#[test]
fn full_config_builds_strategy_and_settings() {
    let file = config_file(
        r#"
[data]
path = ./data

[backtest]
ticker = AAPL
period = 6mo
fee_rate = 0.001
cooldown = 2
order_ratio = 0.5

[strategy]
kind = ema_crossover
fast = 9
slow = 21

[storage]
ledger_path = ./assets/trades.csv
history_path = ./assets/backtest_history.json
account_path = ./assets/account.json
"#,
    );

    let adapter = FileConfigAdapter::from_file(file.path()).unwrap();

    assert!(validate_backtest_config(&adapter).is_ok());
    assert!(validate_strategy_config(&adapter).is_ok());

    let strategy = build_strategy(&adapter).unwrap();
    assert_eq!(strategy, Strategy::EmaCrossover { fast: 9, slow: 21 });
    assert_eq!(strategy.name(), "EMA Crossover (9/21)");

    let settings = build_settings(&adapter);
    assert_eq!(settings.fee_rate, 0.001);
    assert_eq!(settings.cooldown_bars, 2);
    assert_eq!(settings.order_ratio, 0.5);

    assert_eq!(
        period_bars(&adapter.get_string("backtest", "period").unwrap()),
        Some(126)
    );
}

#[test]
fn minimal_config_uses_defaults_throughout() {
    let file = config_file("[backtest]\nticker = TSLA\n");
    let adapter = FileConfigAdapter::from_file(file.path()).unwrap();

    assert!(validate_backtest_config(&adapter).is_ok());
    assert!(validate_strategy_config(&adapter).is_ok());

    let strategy = build_strategy(&adapter).unwrap();
    assert_eq!(strategy, Strategy::SmaCrossover { fast: 5, slow: 20 });

    let settings = build_settings(&adapter);
    assert_eq!(settings.fee_rate, 0.0005);
    assert_eq!(settings.cooldown_bars, 0);
    assert_eq!(settings.order_ratio, 0.3);
}

#[test]
fn invalid_strategy_config_is_rejected_before_building() {
    let file = config_file(
        "[backtest]\nticker = AAPL\n\n[strategy]\nkind = sma_crossover\nfast = 30\nslow = 10\n",
    );
    let adapter = FileConfigAdapter::from_file(file.path()).unwrap();

    assert!(validate_backtest_config(&adapter).is_ok());
    assert!(validate_strategy_config(&adapter).is_err());
}

#[test]
fn missing_ticker_is_rejected() {
    let file = config_file("[backtest]\nfee_rate = 0.0005\n");
    let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
    assert!(validate_backtest_config(&adapter).is_err());
}

#[test]
fn separate_strategy_file_overrides_main_config() {
    let main = config_file("[backtest]\nticker = AAPL\n\n[strategy]\nkind = sma_crossover\n");
    let strategy_only = config_file("[strategy]\nkind = momentum\nperiod = 20\nthreshold = 0.05\n");

    let main_adapter = FileConfigAdapter::from_file(main.path()).unwrap();
    let strategy_adapter = FileConfigAdapter::from_file(strategy_only.path()).unwrap();

    assert_eq!(
        build_strategy(&main_adapter).unwrap(),
        Strategy::SmaCrossover { fast: 5, slow: 20 }
    );
    assert_eq!(
        build_strategy(&strategy_adapter).unwrap(),
        Strategy::Momentum {
            period: 20,
            threshold: 0.05,
        }
    );
}
