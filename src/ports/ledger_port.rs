//! Trade ledger port trait.

use crate::domain::error::MocktraderError;
use crate::domain::portfolio::Trade;

/// Append-only sink for fills, written incrementally during a run so a
/// crash leaves a consistent prefix.
pub trait LedgerPort {
    fn append(&mut self, trade: &Trade) -> Result<(), MocktraderError>;

    /// Drop all previously recorded trades (start of a fresh run).
    fn clear(&mut self) -> Result<(), MocktraderError>;
}
