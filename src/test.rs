//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::model::{Amount, Expense};
use crate::store::Store;
use crate::{utils, Config};
use std::str::FromStr;
use tempfile::TempDir;

/// Test environment that sets up a spend home directory with a Config.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with an initialized home directory and no ledger file.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("spend");
        let config = Config::create(&root).await.unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> Store {
        self.config.store()
    }

    /// Appends an expense with a fixed timestamp.
    pub async fn insert(&self, amount: &str, category: &str, note: &str, timestamp: &str) {
        let expense = Expense::new(Amount::from_str(amount).unwrap(), category, note, timestamp);
        self.store().append(expense).await.unwrap();
    }

    /// Replaces the ledger file with raw `contents`.
    pub async fn write_ledger(&self, contents: &str) {
        utils::write(self.config.ledger_path(), contents)
            .await
            .unwrap();
    }

    /// Counts the files in the backups directory.
    pub async fn backup_count(&self) -> usize {
        let mut dir = utils::read_dir(self.config.backups()).await.unwrap();
        let mut count = 0;
        while dir.next_entry().await.unwrap().is_some() {
            count += 1;
        }
        count
    }
}
