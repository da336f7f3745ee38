//! Price data access port trait.

use crate::domain::bar::PriceBar;
use crate::domain::error::MocktraderError;
use chrono::NaiveDate;

pub trait DataPort {
    /// Full chronological bar series for a ticker.
    fn fetch_bars(&self, ticker: &str) -> Result<Vec<PriceBar>, MocktraderError>;

    fn list_tickers(&self) -> Result<Vec<String>, MocktraderError>;

    /// First date, last date, and bar count, if any data exists.
    fn data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, MocktraderError>;
}
