//! Backtest run-history port trait.

use serde::{Deserialize, Serialize};

use crate::domain::backtest::BacktestResult;
use crate::domain::error::MocktraderError;

/// One stored run: the sink assigns the id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    pub id: u64,
    pub run_at: String,
    #[serde(flatten)]
    pub result: BacktestResult,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryStats {
    pub total_runs: usize,
    pub avg_profit_rate: f64,
    pub best_profit_rate: f64,
    pub worst_profit_rate: f64,
    pub positive_runs: usize,
    pub negative_runs: usize,
}

pub trait HistoryPort {
    /// Persist a completed run and return its assigned id.
    fn add_result(&self, result: &BacktestResult) -> Result<u64, MocktraderError>;

    /// Stored runs ranked by profit rate, best first, at most `limit`.
    fn rankings(&self, limit: usize) -> Result<Vec<StoredResult>, MocktraderError>;

    fn get_by_id(&self, id: u64) -> Result<Option<StoredResult>, MocktraderError>;

    fn clear(&self) -> Result<(), MocktraderError>;

    fn statistics(&self) -> Result<HistoryStats, MocktraderError>;
}
