//! The add command.

use crate::commands::Out;
use crate::error::Error;
use crate::model::{Amount, Expense};
use crate::{Config, Result};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

/// The largest amount a single expense may record.
const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Records a new expense stamped with the current time and appends it to the ledger.
///
/// # Arguments
/// - `amount` - The raw amount text, e.g. `12.50` or `$12.50`. Must be a non-negative number.
/// - `category` - Free text, stored trimmed and lowercased. Must not be empty.
/// - `note` - Optional free text. An empty note is stored as `N/A`.
///
/// # Errors
/// - A `Validation` error if `amount` or `category` is rejected. Nothing is written.
/// - An `Io` error if the ledger file cannot be read or written.
pub async fn add(
    config: &Config,
    amount: &str,
    category: &str,
    note: Option<&str>,
) -> Result<Out<Expense>> {
    let amount = parse_amount(amount)?;
    let category = parse_category(category)?;
    let expense = Expense::now(amount, category, note.unwrap_or_default());
    debug!("Appending {expense:?}");

    let appended = config.store().append(expense.clone()).await?;
    let message = match &appended.quarantined {
        None => "Expense saved successfully".to_string(),
        Some(path) => format!(
            "Expense saved successfully. The previous ledger file could not be read and was moved \
            to {}",
            path.display()
        ),
    };
    Ok(Out::new(message, expense))
}

/// Parses user input into an `Amount`, rejecting anything that is not a non-negative number of at
/// most one trillion.
pub fn parse_amount(input: &str) -> Result<Amount> {
    let amount = Amount::from_str(input).map_err(|_| {
        Error::validation(format!(
            "Invalid amount '{}'. Please enter a number.",
            input.trim()
        ))
    })?;
    if amount.is_negative() {
        return Err(Error::validation(format!(
            "Invalid amount '{}'. The amount cannot be negative.",
            input.trim()
        )));
    }
    if amount.value() > Decimal::from(MAX_AMOUNT) {
        return Err(Error::validation(format!(
            "Invalid amount '{}'. The amount cannot be more than {MAX_AMOUNT}.",
            input.trim()
        )));
    }
    Ok(amount)
}

/// Trims `input` and rejects it if nothing is left.
pub fn parse_category(input: &str) -> Result<&str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("The category cannot be empty."));
    }
    Ok(trimmed)
}
