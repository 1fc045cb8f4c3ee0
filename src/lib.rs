//! A small personal expense ledger.
//!
//! Expenses are kept in a single JSON file, which the `store` reads and rewrites in full on every
//! operation. The `report` module produces read-only views over a loaded `Ledger`.

pub mod args;
mod backup;
pub mod commands;
mod config;
mod error;
pub mod model;
pub mod report;
mod store;
mod utils;

#[cfg(test)]
mod test;

pub use backup::Backup;
pub use config::Config;
pub use error::{Error, ErrorType, Result};
pub use store::{Appended, Loaded, Store};
