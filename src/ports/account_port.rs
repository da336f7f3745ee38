//! Account balance persistence port trait.

use crate::domain::error::MocktraderError;

#[derive(Debug, Clone, PartialEq)]
pub struct AccountSummary {
    pub cash: f64,
    pub total_deposit: f64,
    pub total_withdrawal: f64,
    pub created_at: String,
}

pub trait AccountPort {
    fn balance(&self) -> Result<f64, MocktraderError>;

    /// Add funds; returns the new balance. Non-positive amounts are errors.
    fn deposit(&self, amount: f64) -> Result<f64, MocktraderError>;

    /// Remove funds; returns the new balance. Overdrafts are errors.
    fn withdraw(&self, amount: f64) -> Result<f64, MocktraderError>;

    /// Overwrite the cash balance (post-backtest settlement).
    fn set_balance(&self, amount: f64) -> Result<(), MocktraderError>;

    fn reset(&self, initial: f64) -> Result<(), MocktraderError>;

    fn summary(&self) -> Result<AccountSummary, MocktraderError>;
}
