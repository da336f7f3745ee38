//! Concrete adapter implementations for ports.

pub mod csv_feed_adapter;
pub mod csv_ledger_adapter;
pub mod file_config_adapter;
pub mod json_account_adapter;
pub mod json_history_adapter;
