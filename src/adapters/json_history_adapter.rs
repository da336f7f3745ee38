//! JSON run-history store adapter.
//!
//! Stores every completed backtest as one entry in a JSON array. Ids are
//! sequential from 1 in insertion order; rankings sort a copy by profit
//! rate and never reorder the file.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::MocktraderError;
use crate::ports::history_port::{HistoryPort, HistoryStats, StoredResult};
use chrono::Local;
use std::fs;
use std::path::PathBuf;

pub struct JsonHistoryAdapter {
    path: PathBuf,
}

impl JsonHistoryAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn storage_err(&self, action: &str, e: impl std::fmt::Display) -> MocktraderError {
        MocktraderError::Storage {
            reason: format!("{} {}: {}", action, self.path.display(), e),
        }
    }

    fn load(&self) -> Result<Vec<StoredResult>, MocktraderError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content =
            fs::read_to_string(&self.path).map_err(|e| self.storage_err("failed to read", e))?;
        serde_json::from_str(&content).map_err(|e| self.storage_err("failed to parse", e))
    }

    fn save(&self, history: &[StoredResult]) -> Result<(), MocktraderError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| self.storage_err("failed to create directory for", e))?;
        }
        let content = serde_json::to_string_pretty(history)
            .map_err(|e| self.storage_err("failed to serialize", e))?;
        fs::write(&self.path, content).map_err(|e| self.storage_err("failed to write", e))
    }
}

impl HistoryPort for JsonHistoryAdapter {
    fn add_result(&self, result: &BacktestResult) -> Result<u64, MocktraderError> {
        let mut history = self.load()?;
        let id = history.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        history.push(StoredResult {
            id,
            run_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            result: result.clone(),
        });
        self.save(&history)?;
        Ok(id)
    }

    fn rankings(&self, limit: usize) -> Result<Vec<StoredResult>, MocktraderError> {
        let mut history = self.load()?;
        history.sort_by(|a, b| {
            b.result
                .profit_rate
                .partial_cmp(&a.result.profit_rate)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        history.truncate(limit);
        Ok(history)
    }

    fn get_by_id(&self, id: u64) -> Result<Option<StoredResult>, MocktraderError> {
        Ok(self.load()?.into_iter().find(|r| r.id == id))
    }

    fn clear(&self) -> Result<(), MocktraderError> {
        self.save(&[])
    }

    fn statistics(&self) -> Result<HistoryStats, MocktraderError> {
        let history = self.load()?;
        if history.is_empty() {
            return Ok(HistoryStats::default());
        }

        let rates: Vec<f64> = history.iter().map(|r| r.result.profit_rate).collect();
        let sum: f64 = rates.iter().sum();

        Ok(HistoryStats {
            total_runs: history.len(),
            avg_profit_rate: sum / rates.len() as f64,
            best_profit_rate: rates.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            worst_profit_rate: rates.iter().cloned().fold(f64::INFINITY, f64::min),
            positive_runs: rates.iter().filter(|&&r| r > 0.0).count(),
            negative_runs: rates.iter().filter(|&&r| r < 0.0).count(),
        })
    }
}
