//! Append-only CSV trade ledger adapter.
//!
//! The first append establishes the header; each later append adds one row.
//! Rows land on disk before `append` returns, so an interrupted run leaves
//! a readable prefix.

use crate::domain::error::MocktraderError;
use crate::domain::portfolio::Trade;
use crate::ports::ledger_port::LedgerPort;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;

const HEADER: [&str; 6] = ["ts", "side", "price", "qty", "fee", "rule"];

pub struct CsvLedgerAdapter {
    path: PathBuf,
}

impl CsvLedgerAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn storage_err(&self, action: &str, e: impl std::fmt::Display) -> MocktraderError {
        MocktraderError::Storage {
            reason: format!("{} {}: {}", action, self.path.display(), e),
        }
    }

    /// Read every trade recorded so far. A missing file is an empty ledger.
    pub fn read_trades(&self) -> Result<Vec<Trade>, MocktraderError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content =
            fs::read_to_string(&self.path).map_err(|e| self.storage_err("failed to read", e))?;
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut trades = Vec::new();

        for result in rdr.deserialize() {
            let trade: Trade = result.map_err(|e| self.storage_err("failed to parse", e))?;
            trades.push(trade);
        }

        Ok(trades)
    }
}

impl LedgerPort for CsvLedgerAdapter {
    fn append(&mut self, trade: &Trade) -> Result<(), MocktraderError> {
        let write_header = !self.path.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.storage_err("failed to open", e))?;

        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if write_header {
            wtr.write_record(HEADER)
                .map_err(|e| self.storage_err("failed to write header to", e))?;
        }

        wtr.serialize(trade)
            .map_err(|e| self.storage_err("failed to append to", e))?;
        wtr.flush()
            .map_err(|e| self.storage_err("failed to flush", e))?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), MocktraderError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| self.storage_err("failed to remove", e))?;
        }
        Ok(())
    }
}
