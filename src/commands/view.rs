//! Read-only commands: list, totals and range.
//!
//! A missing ledger file reads as an empty ledger. An unreadable one is returned as a `Corrupt`
//! error so that the caller can report it differently from "no expenses".

use crate::commands::{Out, NO_EXPENSES, NO_EXPENSES_IN_RANGE};
use crate::report::{self, DateRange, Row, Totals};
use crate::{Config, Result};

/// Lists every expense in ledger order.
pub async fn list(config: &Config) -> Result<Out<Vec<Row>>> {
    let ledger = config.store().load().await?;
    if ledger.is_empty() {
        return Ok(NO_EXPENSES.into());
    }
    let rows = report::list_all(&ledger);
    let message = format!(
        "--- All Expenses ---\n{}",
        report::render_rows(&rows, config.amount_format(), false)
    );
    Ok(Out::new(message, rows))
}

/// Shows the total spent per category, in the order categories were first recorded.
pub async fn totals(config: &Config) -> Result<Out<Totals>> {
    let ledger = config.store().load().await?;
    if ledger.is_empty() {
        return Ok(NO_EXPENSES.into());
    }
    let totals = report::totals_by_category(&ledger);
    let message = format!(
        "--- Totals by Category ---\n{}",
        totals.render(config.amount_format())
    );
    Ok(Out::new(message, totals))
}

/// Lists the expenses dated between `start` and `end` inclusive. Both are `YYYY-MM-DD` and are
/// validated before the ledger is read.
pub async fn range(config: &Config, start: &str, end: &str) -> Result<Out<Vec<Row>>> {
    let range = DateRange::new(report::parse_date(start)?, report::parse_date(end)?);
    let ledger = config.store().load().await?;
    if ledger.is_empty() {
        return Ok(NO_EXPENSES.into());
    }
    let rows = report::filter_by_date_range(&ledger, range);
    if rows.is_empty() {
        return Ok(NO_EXPENSES_IN_RANGE.into());
    }
    let message = format!(
        "--- Expenses from {} to {} ---\n{}",
        range.start,
        range.end,
        report::render_rows(&rows, config.amount_format(), false)
    );
    Ok(Out::new(message, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_list_missing_ledger() {
        let env = TestEnv::new().await;
        let out = list(env.config()).await.unwrap();
        assert_eq!(out.message(), NO_EXPENSES);
        assert!(out.structure().is_none());
    }

    #[tokio::test]
    async fn test_list_corrupt_ledger() {
        let env = TestEnv::new().await;
        env.write_ledger("[1, 2").await;
        let err = list(env.config()).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Corrupt);
    }

    #[tokio::test]
    async fn test_list_rows() {
        let env = TestEnv::new().await;
        env.insert("4.5", "food", "coffee", "2024-03-15T08:00:00").await;
        env.insert("20", "transport", "", "2024-03-16T09:00:00").await;
        let out = list(env.config()).await.unwrap();
        assert_eq!(out.structure().unwrap().len(), 2);
        assert!(out
            .message()
            .contains("2024-03-15 |     $4.50 | food         | coffee"));
        assert!(out
            .message()
            .contains("2024-03-16 |    $20.00 | transport    | N/A"));
    }

    #[tokio::test]
    async fn test_list_tolerates_bad_amount() {
        let env = TestEnv::new().await;
        env.write_ledger(r#"[{"amount": "n/a", "category": "food", "timestamp": "2024-01-01"}]"#)
            .await;
        let out = list(env.config()).await.unwrap();
        assert!(out.message().contains("$0.00"));
    }

    #[tokio::test]
    async fn test_totals() {
        let env = TestEnv::new().await;
        env.insert("10.00", "food", "", "2024-03-01T00:00:00").await;
        env.insert("5.50", "food", "", "2024-03-02T00:00:00").await;
        env.insert("3.00", "transport", "", "2024-03-03T00:00:00").await;
        let out = totals(env.config()).await.unwrap();
        let t = out.structure().unwrap();
        assert_eq!(t.entries()[0].category, "food");
        assert_eq!(t.entries()[1].category, "transport");
        assert_eq!(t.get("food").unwrap().to_string(), "$15.50");
        assert_eq!(t.get("transport").unwrap().to_string(), "$3.00");
    }

    #[tokio::test]
    async fn test_range() {
        let env = TestEnv::new().await;
        env.insert("1", "a", "", "2024-03-15T10:00:00").await;
        env.insert("2", "b", "", "2024-03-16T00:00:01").await;
        let out = range(env.config(), "2024-03-15", "2024-03-15").await.unwrap();
        let rows = out.structure().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, "a");
        assert!(out.message().starts_with("--- Expenses from 2024-03-15 to 2024-03-15 ---"));
    }

    #[tokio::test]
    async fn test_range_no_match() {
        let env = TestEnv::new().await;
        env.insert("1", "a", "", "2024-03-15T10:00:00").await;
        let out = range(env.config(), "2025-01-01", "2025-12-31").await.unwrap();
        assert_eq!(out.message(), NO_EXPENSES_IN_RANGE);
    }

    #[tokio::test]
    async fn test_range_invalid_date() {
        let env = TestEnv::new().await;
        let err = range(env.config(), "2024-03-15", "tomorrow")
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }
}
