//! JSON account store adapter.
//!
//! One JSON document holding the cash balance and deposit/withdrawal
//! totals. Created with a default balance on first use.

use crate::domain::error::MocktraderError;
use crate::ports::account_port::{AccountPort, AccountSummary};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_INITIAL_CASH: f64 = 1_000_000.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    cash: f64,
    total_deposit: f64,
    total_withdrawal: f64,
    created_at: String,
}

impl Account {
    fn fresh(initial: f64) -> Self {
        Account {
            cash: initial,
            total_deposit: initial,
            total_withdrawal: 0.0,
            created_at: Local::now().format("%Y-%m-%d").to_string(),
        }
    }
}

pub struct JsonAccountAdapter {
    path: PathBuf,
}

impl JsonAccountAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn storage_err(&self, action: &str, e: impl std::fmt::Display) -> MocktraderError {
        MocktraderError::Storage {
            reason: format!("{} {}: {}", action, self.path.display(), e),
        }
    }

    fn load(&self) -> Result<Account, MocktraderError> {
        if !self.path.exists() {
            let account = Account::fresh(DEFAULT_INITIAL_CASH);
            self.save(&account)?;
            return Ok(account);
        }

        let content =
            fs::read_to_string(&self.path).map_err(|e| self.storage_err("failed to read", e))?;
        serde_json::from_str(&content).map_err(|e| self.storage_err("failed to parse", e))
    }

    fn save(&self, account: &Account) -> Result<(), MocktraderError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| self.storage_err("failed to create directory for", e))?;
        }
        let content = serde_json::to_string_pretty(account)
            .map_err(|e| self.storage_err("failed to serialize", e))?;
        fs::write(&self.path, content).map_err(|e| self.storage_err("failed to write", e))
    }
}

impl AccountPort for JsonAccountAdapter {
    fn balance(&self) -> Result<f64, MocktraderError> {
        Ok(self.load()?.cash)
    }

    fn deposit(&self, amount: f64) -> Result<f64, MocktraderError> {
        if amount <= 0.0 || !amount.is_finite() {
            return Err(MocktraderError::InvalidAmount { amount });
        }
        let mut account = self.load()?;
        account.cash += amount;
        account.total_deposit += amount;
        self.save(&account)?;
        Ok(account.cash)
    }

    fn withdraw(&self, amount: f64) -> Result<f64, MocktraderError> {
        if amount <= 0.0 || !amount.is_finite() {
            return Err(MocktraderError::InvalidAmount { amount });
        }
        let mut account = self.load()?;
        if account.cash < amount {
            return Err(MocktraderError::InsufficientFunds {
                balance: account.cash,
                requested: amount,
            });
        }
        account.cash -= amount;
        account.total_withdrawal += amount;
        self.save(&account)?;
        Ok(account.cash)
    }

    fn set_balance(&self, amount: f64) -> Result<(), MocktraderError> {
        let mut account = self.load()?;
        account.cash = amount;
        self.save(&account)
    }

    fn reset(&self, initial: f64) -> Result<(), MocktraderError> {
        if initial <= 0.0 || !initial.is_finite() {
            return Err(MocktraderError::InvalidAmount { amount: initial });
        }
        self.save(&Account::fresh(initial))
    }

    fn summary(&self) -> Result<AccountSummary, MocktraderError> {
        let account = self.load()?;
        Ok(AccountSummary {
            cash: account.cash,
            total_deposit: account.total_deposit,
            total_withdrawal: account.total_withdrawal,
            created_at: account.created_at,
        })
    }
}
