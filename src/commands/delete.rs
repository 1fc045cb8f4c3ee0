//! The delete command.

use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::{AmountFormat, Confirmation, Expense, Ledger, Position};
use crate::report::Row;
use crate::store::Store;
use crate::{Config, Result};
use std::io::{BufRead, Write};
use tracing::debug;

/// Deletes the expense at `position` (1-based, as shown by `list`) after asking `confirm`.
///
/// `confirm` receives the row that is about to be deleted. Anything other than
/// `Confirmation::Yes` cancels the delete and leaves the ledger untouched. Before the ledger is
/// rewritten, the previous file is copied into the backups directory.
///
/// # Errors
/// - A `Validation` error if `position` is outside `1..=len`. Nothing is written.
/// - A `Corrupt` error if the ledger file cannot be parsed.
pub async fn delete<F>(config: &Config, position: Position, confirm: F) -> Result<Out<Expense>>
where
    F: FnOnce(&Row) -> Result<Confirmation>,
{
    let store = config.store();
    let ledger = store.load().await?;
    let row = Row::new(position.get(), ledger.get(position)?);
    let answer = confirm(&row)?;
    match remove_confirmed(&store, &ledger, position, answer).await? {
        None => Ok("Deletion cancelled.".into()),
        Some(expense) => Ok(Out::new(
            format!(
                "Deleted expense {position}: {}",
                row.render(config.amount_format())
            ),
            expense,
        )),
    }
}

/// Removes the expense at `position` from the ledger file if `answer` is yes. `ledger` is the copy
/// the user was shown. Returns the removed expense, or `None` if the delete was cancelled.
pub(crate) async fn remove_confirmed(
    store: &Store,
    ledger: &Ledger,
    position: Position,
    answer: Confirmation,
) -> Result<Option<Expense>> {
    let _ = ledger.index_of(position)?;
    if !answer.is_yes() {
        debug!("Deletion of expense {position} cancelled");
        return Ok(None);
    }
    Ok(Some(store.remove(position).await?))
}

/// Shows `row` and asks whether to delete it. Only `yes` or `y` confirm.
pub fn prompt_confirmation<R, W>(
    input: &mut R,
    output: &mut W,
    row: &Row,
    format: AmountFormat,
) -> Result<Confirmation>
where
    R: BufRead,
    W: Write,
{
    write!(
        output,
        "Delete {}? (yes/no): ",
        row.render(format)
    )
    .and_then(|_| output.flush())
    .pub_result(ErrorType::Io)?;
    let mut answer = String::new();
    let _ = input.read_line(&mut answer).pub_result(ErrorType::Io)?;
    Ok(Confirmation::from_answer(&answer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use std::io::Cursor;

    async fn env_with_three() -> TestEnv {
        let env = TestEnv::new().await;
        env.insert("1", "a", "one", "2024-03-01T00:00:00").await;
        env.insert("2", "b", "two", "2024-03-02T00:00:00").await;
        env.insert("3", "c", "three", "2024-03-03T00:00:00").await;
        env
    }

    #[tokio::test]
    async fn test_delete_confirmed() {
        let env = env_with_three().await;
        let before = env.store().load().await.unwrap();

        let out = delete(env.config(), Position::new(2), |row| {
            assert_eq!(row.note, "two");
            Ok("yes".parse().unwrap())
        })
        .await
        .unwrap();
        assert!(out.message().starts_with("Deleted expense 2"));
        assert_eq!(out.structure().unwrap(), &before.expenses()[1]);

        let after = env.store().load().await.unwrap();
        assert_eq!(
            after.expenses(),
            &[before.expenses()[0].clone(), before.expenses()[2].clone()]
        );
        assert_eq!(env.backup_count().await, 1);
    }

    #[tokio::test]
    async fn test_delete_declined() {
        let env = env_with_three().await;
        let before = env.store().load().await.unwrap();
        let out = delete(env.config(), Position::new(2), |_| Ok("no".parse().unwrap()))
            .await
            .unwrap();
        assert_eq!(out.message(), "Deletion cancelled.");
        assert!(out.structure().is_none());
        assert_eq!(env.store().load().await.unwrap(), before);
        assert_eq!(env.backup_count().await, 0);
    }

    #[tokio::test]
    async fn test_delete_out_of_range() {
        let env = env_with_three().await;
        let before = env.store().load().await.unwrap();
        for p in [0, 4] {
            let err = delete(env.config(), Position::new(p), |_| {
                panic!("should not ask for confirmation")
            })
            .await
            .unwrap_err();
            assert!(err.is_validation());
        }
        assert_eq!(env.store().load().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_delete_corrupt() {
        let env = TestEnv::new().await;
        env.write_ledger("{{{").await;
        let err = delete(env.config(), Position::new(1), |_| Ok(Confirmation::Yes))
            .await
            .unwrap_err();
        assert!(err.is_corrupt());
    }

    #[test]
    fn test_prompt_confirmation() {
        let row = Row {
            position: 1,
            date: "2024-03-01".to_string(),
            amount: crate::model::Amount::ZERO,
            category: "a".to_string(),
            note: "N/A".to_string(),
        };
        let mut output = Vec::new();
        let answer = prompt_confirmation(
            &mut Cursor::new("Y\n"),
            &mut output,
            &row,
            AmountFormat::default(),
        )
        .unwrap();
        assert!(answer.is_yes());
        assert!(String::from_utf8(output).unwrap().starts_with("Delete 2024-03-01"));

        let answer = prompt_confirmation(
            &mut Cursor::new(""),
            &mut Vec::new(),
            &row,
            AmountFormat::default(),
        )
        .unwrap();
        assert!(!answer.is_yes());
    }
}
