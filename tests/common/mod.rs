#![allow(dead_code)]

use chrono::NaiveDate;
use mocktrader::domain::bar::PriceBar;
use mocktrader::domain::error::MocktraderError;
use mocktrader::domain::portfolio::Trade;
use mocktrader::ports::data_port::DataPort;
use mocktrader::ports::ledger_port::LedgerPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self, ticker: &str) -> Result<Vec<PriceBar>, MocktraderError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(MocktraderError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(ticker) {
            Some(bars) => Ok(bars.clone()),
            None => Err(MocktraderError::NoData {
                ticker: ticker.to_string(),
            }),
        }
    }

    fn list_tickers(&self) -> Result<Vec<String>, MocktraderError> {
        let mut tickers: Vec<String> = self.data.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }

    fn data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, MocktraderError> {
        match self.data.get(ticker) {
            Some(bars) if !bars.is_empty() => Ok(Some((
                bars[0].date,
                bars[bars.len() - 1].date,
                bars.len(),
            ))),
            _ => Ok(None),
        }
    }
}

/// In-memory ledger double.
pub struct MemoryLedger {
    pub trades: Vec<Trade>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self { trades: Vec::new() }
    }
}

impl LedgerPort for MemoryLedger {
    fn append(&mut self, trade: &Trade) -> Result<(), MocktraderError> {
        self.trades.push(trade.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), MocktraderError> {
        self.trades.clear();
        Ok(())
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn make_bar(day_offset: u64, open: f64, close: f64) -> PriceBar {
    PriceBar {
        date: date(2024, 1, 1) + chrono::Days::new(day_offset),
        open,
        high: open.max(close),
        low: open.min(close),
        close,
        volume: 10_000,
    }
}

/// Flat-open bars where open == close, one per day starting 2024-01-01.
pub fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(i as u64, close, close))
        .collect()
}

pub fn rising_bars(n: usize, start: f64) -> Vec<PriceBar> {
    let closes: Vec<f64> = (0..n).map(|i| start + i as f64).collect();
    bars_from_closes(&closes)
}
