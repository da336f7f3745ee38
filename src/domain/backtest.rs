//! Backtest driver: the event loop over a daily bar series.
//!
//! Signals are evaluated on each bar's close and filled on the *next* bar's
//! open with slippage, so a decision can never see the price it executes at.
//! At most one pending signal exists at a time: the terminal-bar guard stops
//! new signals on the last bar and resolution always clears the slot.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::bar::{close_prices, PriceBar};
use super::error::MocktraderError;
use super::execution::{can_execute, execute_market};
use super::portfolio::{Portfolio, Side, Trade};
use super::strategy::{Action, Strategy};
use crate::ports::ledger_port::LedgerPort;

/// Slippage applied to next-open fills: paid on buys, conceded on sells.
pub const SLIPPAGE_RATE: f64 = 0.001;

/// Smallest cash balance worth sending a buy order for.
pub const MIN_ORDER_CASH: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSettings {
    pub fee_rate: f64,
    pub cooldown_bars: u32,
    pub order_ratio: f64,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        BacktestSettings {
            fee_rate: 0.0005,
            cooldown_bars: 0,
            order_ratio: 0.3,
        }
    }
}

/// Why signals did or did not become orders. Reported so a zero-trade run
/// is explainable rather than a mystery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalCounts {
    pub buy_signals: u32,
    pub sell_signals: u32,
    pub blocked_by_cooldown: u32,
    pub blocked_by_no_asset: u32,
    pub blocked_by_no_cash: u32,
    pub failed_fills: u32,
}

/// Buy-and-hold comparison computed alongside the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
    pub final_value: f64,
    pub profit_rate: f64,
    pub outperformance: f64,
}

/// In-memory product of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestOutcome {
    pub initial_cash: f64,
    pub final_equity: f64,
    pub profit_loss: f64,
    pub profit_rate: f64,
    pub total_fees: f64,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<f64>,
    pub counts: SignalCounts,
    pub benchmark: Benchmark,
}

/// The persisted record of one run, as handed to the history sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub ticker: String,
    pub period: String,
    pub strategy: String,
    pub strategy_params: BTreeMap<String, f64>,
    pub initial_cash: f64,
    pub final_equity: f64,
    pub profit_loss: f64,
    pub profit_rate: f64,
    pub trades_count: usize,
    pub total_fees: f64,
    pub trades: Vec<Trade>,
    pub benchmark: Benchmark,
    pub settings: BacktestSettings,
    pub counts: SignalCounts,
}

impl BacktestResult {
    pub fn from_outcome(
        outcome: BacktestOutcome,
        ticker: &str,
        period: &str,
        strategy: &Strategy,
        settings: &BacktestSettings,
    ) -> Self {
        BacktestResult {
            ticker: ticker.to_string(),
            period: period.to_string(),
            strategy: strategy.name(),
            strategy_params: strategy.params(),
            initial_cash: outcome.initial_cash,
            final_equity: outcome.final_equity,
            profit_loss: outcome.profit_loss,
            profit_rate: outcome.profit_rate,
            trades_count: outcome.trades.len(),
            total_fees: outcome.total_fees,
            trades: outcome.trades,
            benchmark: outcome.benchmark,
            settings: settings.clone(),
            counts: outcome.counts,
        }
    }
}

/// Run one backtest over `bars`, appending each fill to `ledger` as it
/// happens. Gating rejections are counted, not errors; a zero-trade run
/// still produces a complete outcome.
pub fn run_backtest(
    bars: &[PriceBar],
    strategy: &Strategy,
    initial_cash: f64,
    settings: &BacktestSettings,
    ledger: &mut dyn LedgerPort,
) -> Result<BacktestOutcome, MocktraderError> {
    if bars.is_empty() {
        return Err(MocktraderError::Data {
            reason: "cannot backtest an empty price series".into(),
        });
    }

    let prices = close_prices(bars);
    let rule_name = strategy.name();
    let last_idx = bars.len() - 1;

    let mut pf = Portfolio::new(initial_cash);
    let mut trades: Vec<Trade> = Vec::new();
    let mut equity_curve: Vec<f64> = Vec::with_capacity(bars.len());
    let mut counts = SignalCounts::default();
    let mut pending: Option<(Action, usize)> = None;

    for (idx, bar) in bars.iter().enumerate() {
        // Mark to market on today's close before anything else.
        pf.last_price = bar.close;
        equity_curve.push(pf.equity());

        // Resolve yesterday's signal at today's open. The slot is cleared
        // whether or not the fill succeeds; failures are counted, not retried.
        if let Some((action, _signal_idx)) = pending.take() {
            let side = match action {
                Action::Buy => Side::Buy,
                Action::Sell => Side::Sell,
                Action::Keep => unreachable!("Keep is never scheduled"),
            };
            let execution_price = match side {
                Side::Buy => bar.open * (1.0 + SLIPPAGE_RATE),
                Side::Sell => bar.open * (1.0 - SLIPPAGE_RATE),
            };
            let order_cash = pf.cash * settings.order_ratio;

            match execute_market(
                &mut pf,
                side,
                execution_price,
                idx as i64,
                settings.fee_rate,
                order_cash,
                &rule_name,
            ) {
                Ok(trade) => {
                    ledger.append(&trade)?;
                    trades.push(trade);
                }
                Err(_) => counts.failed_fills += 1,
            }
        }

        debug_assert!(pending.is_none());

        let action = strategy.decide(&prices[..=idx]);
        match action {
            Action::Keep => continue,
            Action::Buy => counts.buy_signals += 1,
            Action::Sell => counts.sell_signals += 1,
        }

        // Last bar: nothing left to fill on.
        if idx >= last_idx {
            continue;
        }

        if !can_execute(idx as i64, pf.last_trade_ts, settings.cooldown_bars) {
            counts.blocked_by_cooldown += 1;
            continue;
        }

        if action == Action::Sell && pf.asset_qty == 0.0 {
            counts.blocked_by_no_asset += 1;
            continue;
        }

        if action == Action::Buy && pf.cash < MIN_ORDER_CASH {
            counts.blocked_by_no_cash += 1;
            continue;
        }

        pending = Some((action, idx));
    }

    // Whatever is still held gets liquidated at the final close. Fee applies,
    // slippage does not: this is a bookkeeping close-out, not a market order.
    if pf.asset_qty > 0.0 {
        let final_price = prices[last_idx];
        let qty = pf.asset_qty;
        let sell_value = qty * final_price;
        let fee = sell_value * settings.fee_rate;
        pf.cash += sell_value - fee;
        pf.asset_qty = 0.0;

        let final_trade = Trade {
            ts: last_idx as i64,
            side: Side::Sell,
            price: final_price,
            qty,
            fee,
            rule_name: format!("{rule_name} (liquidation)"),
        };
        ledger.append(&final_trade)?;
        trades.push(final_trade);
    }

    let benchmark_qty = initial_cash / bars[0].open;
    let benchmark_final = benchmark_qty * bars[last_idx].close;
    let benchmark_rate = (benchmark_final - initial_cash) / initial_cash * 100.0;

    let final_equity = pf.equity();
    let profit_loss = final_equity - initial_cash;
    let profit_rate = profit_loss / initial_cash * 100.0;
    let total_fees = trades.iter().map(|t| t.fee).sum();

    Ok(BacktestOutcome {
        initial_cash,
        final_equity,
        profit_loss,
        profit_rate,
        total_fees,
        trades,
        equity_curve,
        counts,
        benchmark: Benchmark {
            final_value: benchmark_final,
            profit_rate: benchmark_rate,
            outperformance: profit_rate - benchmark_rate,
        },
    })
}
