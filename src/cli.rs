//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_feed_adapter::CsvFeedAdapter;
use crate::adapters::csv_ledger_adapter::CsvLedgerAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_account_adapter::JsonAccountAdapter;
use crate::adapters::json_history_adapter::JsonHistoryAdapter;
use crate::domain::backtest::{
    run_backtest, BacktestOutcome, BacktestResult, BacktestSettings,
};
use crate::domain::bar::PriceBar;
use crate::domain::config_validation::{validate_backtest_config, validate_strategy_config};
use crate::domain::error::MocktraderError;
use crate::domain::strategy::Strategy;
use crate::ports::account_port::AccountPort;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::history_port::{HistoryPort, StoredResult};
use crate::ports::ledger_port::LedgerPort;

/// Minimum account balance required to start a backtest.
pub const MIN_BACKTEST_CASH: f64 = 10_000.0;

#[derive(Parser, Debug)]
#[command(name = "mocktrader", about = "Mock stock-investing backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest against the configured ticker
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Separate strategy config file (defaults to the main config)
        #[arg(short, long)]
        strategy: Option<PathBuf>,
        #[arg(long)]
        ticker: Option<String>,
    },
    /// Show past runs ranked by profit rate
    Rankings {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Show one stored run in detail
    Show {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        id: u64,
    },
    /// Delete all stored run history
    ClearHistory {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Inspect or modify the account balance
    Account {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        deposit: Option<f64>,
        #[arg(long)]
        withdraw: Option<f64>,
        /// Reset the account to the given starting balance
        #[arg(long)]
        reset: Option<f64>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the available data range for the configured ticker
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            strategy,
            ticker,
        } => run_backtest_cmd(&config, strategy.as_ref(), ticker.as_deref()),
        Command::Rankings { config, limit } => run_rankings(&config, limit),
        Command::Show { config, id } => run_show(&config, id),
        Command::ClearHistory { config } => run_clear_history(&config),
        Command::Account {
            config,
            deposit,
            withdraw,
            reset,
        } => run_account(&config, deposit, withdraw, reset),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, ticker } => run_info(&config, ticker.as_deref()),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = MocktraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Build the strategy from `[strategy]`, falling back to documented defaults
/// for any missing key.
pub fn build_strategy(config: &dyn ConfigPort) -> Result<Strategy, MocktraderError> {
    let kind = config
        .get_string("strategy", "kind")
        .unwrap_or_else(|| "sma_crossover".to_string());

    let strategy = match kind.as_str() {
        "sma_crossover" => Strategy::SmaCrossover {
            fast: config.get_int("strategy", "fast", 5) as usize,
            slow: config.get_int("strategy", "slow", 20) as usize,
        },
        "ema_crossover" => Strategy::EmaCrossover {
            fast: config.get_int("strategy", "fast", 12) as usize,
            slow: config.get_int("strategy", "slow", 26) as usize,
        },
        "rsi" => Strategy::Rsi {
            period: config.get_int("strategy", "period", 14) as usize,
            oversold: config.get_double("strategy", "oversold", 30.0),
            overbought: config.get_double("strategy", "overbought", 70.0),
        },
        "macd" => Strategy::Macd {
            fast: config.get_int("strategy", "fast", 12) as usize,
            slow: config.get_int("strategy", "slow", 26) as usize,
            signal: config.get_int("strategy", "signal", 9) as usize,
        },
        "bollinger" => Strategy::Bollinger {
            period: config.get_int("strategy", "period", 20) as usize,
            num_std: config.get_double("strategy", "num_std", 2.0),
        },
        "momentum" => Strategy::Momentum {
            period: config.get_int("strategy", "period", 10) as usize,
            threshold: config.get_double("strategy", "threshold", 0.02),
        },
        other => {
            return Err(MocktraderError::ConfigInvalid {
                section: "strategy".to_string(),
                key: "kind".to_string(),
                reason: format!("unknown strategy kind '{other}'"),
            });
        }
    };

    Ok(strategy)
}

pub fn build_settings(config: &dyn ConfigPort) -> BacktestSettings {
    BacktestSettings {
        fee_rate: config.get_double("backtest", "fee_rate", 0.0005),
        cooldown_bars: config.get_int("backtest", "cooldown", 0) as u32,
        order_ratio: config.get_double("backtest", "order_ratio", 0.3),
    }
}

/// Trailing bar count for a period label; `None` means the whole series.
pub fn period_bars(period: &str) -> Option<usize> {
    match period {
        "1mo" => Some(21),
        "3mo" => Some(63),
        "6mo" => Some(126),
        "1y" => Some(252),
        _ => None,
    }
}

fn resolve_ticker(ticker_override: Option<&str>, config: &dyn ConfigPort) -> Option<String> {
    ticker_override
        .map(|t| t.to_uppercase())
        .or_else(|| config.get_string("backtest", "ticker"))
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
}

fn storage_path(config: &dyn ConfigPort, key: &str, default: &str) -> PathBuf {
    PathBuf::from(
        config
            .get_string("storage", key)
            .unwrap_or_else(|| default.to_string()),
    )
}

fn run_backtest_cmd(
    config_path: &PathBuf,
    strategy_path: Option<&PathBuf>,
    ticker_override: Option<&str>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Strategy may live in its own file; otherwise the main config carries it.
    let strategy_adapter: Option<FileConfigAdapter>;
    let strategy_config: &dyn ConfigPort = if let Some(strat_path) = strategy_path {
        eprintln!("Loading strategy from {}", strat_path.display());
        strategy_adapter = Some(match load_config(strat_path) {
            Ok(a) => a,
            Err(code) => return code,
        });
        strategy_adapter.as_ref().unwrap()
    } else {
        &adapter
    };

    if let Err(e) = validate_strategy_config(strategy_config) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let strategy = match build_strategy(strategy_config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("Strategy: {} - {}", strategy.name(), strategy.description());

    let settings = build_settings(&adapter);
    let Some(ticker) = resolve_ticker(ticker_override, &adapter) else {
        eprintln!("error: ticker is required");
        return ExitCode::from(2);
    };

    let account = JsonAccountAdapter::new(storage_path(&adapter, "account_path", "assets/account.json"));
    let initial_cash = match account.balance() {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if initial_cash < MIN_BACKTEST_CASH {
        eprintln!(
            "error: account balance {initial_cash:.0} is below the {MIN_BACKTEST_CASH:.0} minimum; deposit first"
        );
        return ExitCode::from(4);
    }

    let data_path = adapter
        .get_string("data", "path")
        .unwrap_or_else(|| "data".to_string());
    let feed = CsvFeedAdapter::new(PathBuf::from(&data_path));

    let bars = match feed.fetch_bars(&ticker) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let period = adapter
        .get_string("backtest", "period")
        .unwrap_or_else(|| "3mo".to_string());
    let bars: Vec<PriceBar> = match period_bars(&period) {
        Some(n) if bars.len() > n => bars[bars.len() - n..].to_vec(),
        _ => bars,
    };

    if bars.is_empty() {
        let e = MocktraderError::NoData { ticker };
        eprintln!("error: {e}");
        return (&e).into();
    }

    eprintln!(
        "Running backtest: {} bars of {} ({} to {})",
        bars.len(),
        ticker,
        bars[0].date,
        bars[bars.len() - 1].date,
    );
    eprintln!(
        "  cash {:.0}, fee {:.4}%, cooldown {} bars, order ratio {:.0}%",
        initial_cash,
        settings.fee_rate * 100.0,
        settings.cooldown_bars,
        settings.order_ratio * 100.0,
    );

    let mut ledger =
        CsvLedgerAdapter::new(storage_path(&adapter, "ledger_path", "assets/trades.csv"));
    if let Err(e) = ledger.clear() {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let outcome = match run_backtest(&bars, &strategy, initial_cash, &settings, &mut ledger) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    print_outcome(&outcome, &strategy);

    if let Err(e) = account.set_balance(outcome.final_equity) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    if !outcome.trades.is_empty() {
        let history = JsonHistoryAdapter::new(storage_path(
            &adapter,
            "history_path",
            "assets/backtest_history.json",
        ));
        let result =
            BacktestResult::from_outcome(outcome, &ticker, &period, &strategy, &settings);
        match history.add_result(&result) {
            Ok(id) => eprintln!("\nResult saved as run #{id} (see `rankings`)"),
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
    }

    ExitCode::SUCCESS
}

fn print_outcome(outcome: &BacktestOutcome, strategy: &Strategy) {
    if outcome.trades.is_empty() {
        let c = &outcome.counts;
        eprintln!("\n=== No Trades Executed ===");
        eprintln!("Buy signals:        {}", c.buy_signals);
        eprintln!("Sell signals:       {}", c.sell_signals);
        eprintln!("Cooldown blocked:   {}", c.blocked_by_cooldown);
        eprintln!("No asset to sell:   {}", c.blocked_by_no_asset);
        eprintln!("Not enough cash:    {}", c.blocked_by_no_cash);
        eprintln!("Failed fills:       {}", c.failed_fills);
        if c.buy_signals == 0 && c.sell_signals == 0 {
            eprintln!(
                "\n{} never fired on this series; try another strategy or a longer period",
                strategy.name()
            );
        }
        return;
    }

    eprintln!("\n=== Backtest Results ===");
    eprintln!("Initial cash:     {:.0}", outcome.initial_cash);
    eprintln!("Final equity:     {:.0}", outcome.final_equity);
    eprintln!("Profit/Loss:      {:+.0}", outcome.profit_loss);
    eprintln!("Profit rate:      {:+.2}%", outcome.profit_rate);
    eprintln!("Trades:           {}", outcome.trades.len());
    eprintln!("Total fees:       {:.2}", outcome.total_fees);

    eprintln!("\n=== Benchmark (Buy & Hold) ===");
    eprintln!("Final value:      {:.0}", outcome.benchmark.final_value);
    eprintln!("Profit rate:      {:+.2}%", outcome.benchmark.profit_rate);
    let diff = outcome.benchmark.outperformance;
    if diff > 0.0 {
        eprintln!("Strategy beats buy & hold by {diff:.2} points");
    } else if diff < 0.0 {
        eprintln!("Strategy trails buy & hold by {:.2} points", -diff);
    } else {
        eprintln!("Strategy matches buy & hold");
    }
}

fn run_rankings(config_path: &PathBuf, limit: usize) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let history = JsonHistoryAdapter::new(storage_path(
        &adapter,
        "history_path",
        "assets/backtest_history.json",
    ));

    let rankings = match history.rankings(limit) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if rankings.is_empty() {
        eprintln!("No backtest history yet; run `backtest` first");
        return ExitCode::SUCCESS;
    }

    println!(
        "{:<4} {:<5} {:>10} {:<8} {:<28} {:<20}",
        "rank", "id", "profit", "ticker", "strategy", "run at"
    );
    for (rank, stored) in rankings.iter().enumerate() {
        println!(
            "{:<4} {:<5} {:>+9.2}% {:<8} {:<28} {:<20}",
            rank + 1,
            stored.id,
            stored.result.profit_rate,
            stored.result.ticker,
            stored.result.strategy,
            stored.run_at,
        );
    }

    match history.statistics() {
        Ok(stats) => eprintln!(
            "\n{} runs | avg {:+.2}% | best {:+.2}% | worst {:+.2}% | {} up / {} down",
            stats.total_runs,
            stats.avg_profit_rate,
            stats.best_profit_rate,
            stats.worst_profit_rate,
            stats.positive_runs,
            stats.negative_runs,
        ),
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }

    ExitCode::SUCCESS
}

fn run_show(config_path: &PathBuf, id: u64) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let history = JsonHistoryAdapter::new(storage_path(
        &adapter,
        "history_path",
        "assets/backtest_history.json",
    ));

    match history.get_by_id(id) {
        Ok(Some(stored)) => {
            print_result_detail(&stored);
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("error: no stored run with id {id}");
            ExitCode::from(3)
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn print_result_detail(stored: &StoredResult) {
    let r = &stored.result;
    println!("Run #{} ({})", stored.id, stored.run_at);
    println!("Ticker:       {} ({})", r.ticker, r.period);
    println!("Strategy:     {}", r.strategy);

    let params: Vec<String> = r
        .strategy_params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect();
    println!("Parameters:   {}", params.join(", "));
    println!(
        "Settings:     fee {:.4}%, cooldown {} bars, order ratio {:.0}%",
        r.settings.fee_rate * 100.0,
        r.settings.cooldown_bars,
        r.settings.order_ratio * 100.0,
    );
    println!("Initial cash: {:.0}", r.initial_cash);
    println!("Final equity: {:.0}", r.final_equity);
    println!("Profit/Loss:  {:+.0} ({:+.2}%)", r.profit_loss, r.profit_rate);
    println!(
        "Benchmark:    {:+.2}% ({:+.2} points vs strategy)",
        r.benchmark.profit_rate, r.benchmark.outperformance,
    );
    println!("Fees:         {:.2}", r.total_fees);

    println!("\nTrades ({}):", r.trades_count);
    println!("{:<4} {:<6} {:>6} {:>12} {:>12} {:>10}", "#", "side", "bar", "price", "qty", "fee");
    for (i, trade) in r.trades.iter().take(20).enumerate() {
        println!(
            "{:<4} {:<6} {:>6} {:>12.2} {:>12.4} {:>10.2}",
            i + 1,
            trade.side,
            trade.ts,
            trade.price,
            trade.qty,
            trade.fee,
        );
    }
    if r.trades.len() > 20 {
        println!("... and {} more", r.trades.len() - 20);
    }
}

fn run_clear_history(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let history = JsonHistoryAdapter::new(storage_path(
        &adapter,
        "history_path",
        "assets/backtest_history.json",
    ));

    match history.clear() {
        Ok(()) => {
            eprintln!("Backtest history cleared");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_account(
    config_path: &PathBuf,
    deposit: Option<f64>,
    withdraw: Option<f64>,
    reset: Option<f64>,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let account =
        JsonAccountAdapter::new(storage_path(&adapter, "account_path", "assets/account.json"));

    if let Some(amount) = reset {
        match account.reset(amount) {
            Ok(()) => eprintln!("Account reset to {amount:.0}"),
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
    }

    if let Some(amount) = deposit {
        match account.deposit(amount) {
            Ok(balance) => eprintln!("Deposited {amount:.0}, balance now {balance:.0}"),
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
    }

    if let Some(amount) = withdraw {
        match account.withdraw(amount) {
            Ok(balance) => eprintln!("Withdrew {amount:.0}, balance now {balance:.0}"),
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
    }

    match account.summary() {
        Ok(summary) => {
            println!("Balance:          {:.0}", summary.cash);
            println!("Total deposits:   {:.0}", summary.total_deposit);
            println!("Total withdrawn:  {:.0}", summary.total_withdrawal);
            println!("Net deposits:     {:.0}", summary.total_deposit - summary.total_withdrawal);
            println!("Opened:           {}", summary.created_at);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    match build_strategy(&adapter) {
        Ok(strategy) => {
            eprintln!("Strategy: {} - {}", strategy.name(), strategy.description());
            eprintln!("Configuration is valid");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_info(config_path: &PathBuf, ticker_override: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let data_path = adapter
        .get_string("data", "path")
        .unwrap_or_else(|| "data".to_string());
    let feed = CsvFeedAdapter::new(PathBuf::from(&data_path));

    match resolve_ticker(ticker_override, &adapter) {
        Some(ticker) => match feed.data_range(&ticker) {
            Ok(Some((first, last, count))) => {
                println!("{ticker}: {count} bars, {first} to {last}");
                ExitCode::SUCCESS
            }
            Ok(None) => {
                eprintln!("{ticker}: no data found under {data_path}");
                ExitCode::from(5)
            }
            Err(e) => {
                eprintln!("error: {e}");
                (&e).into()
            }
        },
        None => match feed.list_tickers() {
            Ok(tickers) if tickers.is_empty() => {
                eprintln!("No price files under {data_path}");
                ExitCode::SUCCESS
            }
            Ok(tickers) => {
                for t in &tickers {
                    println!("{t}");
                }
                eprintln!("{} tickers found", tickers.len());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                (&e).into()
            }
        },
    }
}
