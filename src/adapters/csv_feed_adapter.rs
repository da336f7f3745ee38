//! CSV price feed adapter.
//!
//! Expects one `{TICKER}.csv` per symbol in the base directory with
//! `date,open,high,low,close,volume` columns, dates as YYYY-MM-DD. Bars are
//! sorted chronologically on load regardless of file order.

use crate::domain::bar::PriceBar;
use crate::domain::error::MocktraderError;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvFeedAdapter {
    base_path: PathBuf,
}

impl CsvFeedAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{ticker}.csv"))
    }

    fn field<'a>(
        record: &'a csv::StringRecord,
        index: usize,
        name: &str,
        ticker: &str,
    ) -> Result<&'a str, MocktraderError> {
        record.get(index).ok_or_else(|| MocktraderError::Data {
            reason: format!("{ticker}: missing {name} column"),
        })
    }

    fn number(
        record: &csv::StringRecord,
        index: usize,
        name: &str,
        ticker: &str,
    ) -> Result<f64, MocktraderError> {
        Self::field(record, index, name, ticker)?
            .parse()
            .map_err(|e| MocktraderError::Data {
                reason: format!("{ticker}: invalid {name} value: {e}"),
            })
    }

    fn parse_record(
        record: &csv::StringRecord,
        ticker: &str,
    ) -> Result<PriceBar, MocktraderError> {
        let date_str = Self::field(record, 0, "date", ticker)?;
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
            MocktraderError::Data {
                reason: format!("{ticker}: invalid date: {e}"),
            }
        })?;

        let volume: i64 = Self::field(record, 5, "volume", ticker)?
            .parse()
            .map_err(|e| MocktraderError::Data {
                reason: format!("{ticker}: invalid volume value: {e}"),
            })?;

        Ok(PriceBar {
            date,
            open: Self::number(record, 1, "open", ticker)?,
            high: Self::number(record, 2, "high", ticker)?,
            low: Self::number(record, 3, "low", ticker)?,
            close: Self::number(record, 4, "close", ticker)?,
            volume,
        })
    }
}

impl DataPort for CsvFeedAdapter {
    fn fetch_bars(&self, ticker: &str) -> Result<Vec<PriceBar>, MocktraderError> {
        let path = self.csv_path(ticker);
        if !path.exists() {
            return Err(MocktraderError::NoData {
                ticker: ticker.to_string(),
            });
        }

        let content = fs::read_to_string(&path).map_err(|e| MocktraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| MocktraderError::Data {
                reason: format!("{ticker}: CSV parse error: {e}"),
            })?;
            bars.push(Self::parse_record(&record, ticker)?);
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn list_tickers(&self) -> Result<Vec<String>, MocktraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| MocktraderError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut tickers = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| MocktraderError::Data {
                reason: format!("directory entry error: {e}"),
            })?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(ticker) = name_str.strip_suffix(".csv") {
                tickers.push(ticker.to_string());
            }
        }

        tickers.sort();
        Ok(tickers)
    }

    fn data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, MocktraderError> {
        if !self.csv_path(ticker).exists() {
            return Ok(None);
        }

        let bars = self.fetch_bars(ticker)?;
        match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Ok(Some((first.date, last.date, bars.len()))),
            _ => Ok(None),
        }
    }
}
