//! The interactive menu.
//!
//! Each menu action runs to completion or fails on its own; a failure is reported and the menu is
//! shown again. End of input at any prompt leaves the current action, and end of input at the menu
//! prompt quits.

use crate::commands::delete::remove_confirmed;
use crate::commands::{add, list, parse_amount, parse_category, prompt_confirmation, range};
use crate::commands::{totals, Out, NO_EXPENSES};
use crate::error::{Error, ErrorType, IntoResult};
use crate::model::Position;
use crate::report::{self, Row};
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Debug;
use std::io::{BufRead, Write};
use tracing::debug;

const MENU: &str = "
==== Expense Tracker ====
1. Add a new expense
2. View all expenses
3. View totals by category
4. Filter expenses by date range
5. Delete an expense
6. Quit";

/// Runs the menu loop, reading answers from `input` and writing prompts and reports to `output`.
pub async fn menu<R, W>(config: &Config, input: &mut R, output: &mut W) -> Result<Out<()>>
where
    R: BufRead,
    W: Write,
{
    loop {
        say(output, MENU)?;
        let choice = match ask(input, output, "Enter your choice (1-6): ")? {
            Some(choice) => choice,
            None => break,
        };
        debug!("Menu choice '{choice}'");
        let result = match choice.as_str() {
            "1" => add_flow(config, input, output).await,
            "2" => show(output, list(config).await),
            "3" => show(output, totals(config).await),
            "4" => range_flow(config, input, output).await,
            "5" => delete_flow(config, input, output).await,
            "6" | "q" | "quit" => break,
            other => say(output, &format!("Invalid choice '{other}'.")),
        };
        if let Err(e) = result {
            say(output, &describe(&e))?;
        }
    }
    Ok("Goodbye.".into())
}

async fn add_flow<R, W>(config: &Config, input: &mut R, output: &mut W) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let amount = loop {
        let Some(text) = ask(input, output, "Enter the amount spent: ")? else {
            return Ok(());
        };
        match parse_amount(&text) {
            Ok(_) => break text,
            Err(e) => say(output, &e.to_string())?,
        }
    };
    let category = loop {
        let prompt = "Enter the category (e.g., food, transport, etc.): ";
        let Some(text) = ask(input, output, prompt)? else {
            return Ok(());
        };
        match parse_category(&text) {
            Ok(_) => break text,
            Err(e) => say(output, &e.to_string())?,
        }
    };
    let note = ask(input, output, "Enter a note. (Optional): ")?.unwrap_or_default();
    show(output, add(config, &amount, &category, Some(&note)).await)
}

async fn range_flow<R, W>(config: &Config, input: &mut R, output: &mut W) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let Some(start) = ask(input, output, "Enter a start date (YYYY-MM-DD): ")? else {
        return Ok(());
    };
    let Some(end) = ask(input, output, "Enter an end date (YYYY-MM-DD): ")? else {
        return Ok(());
    };
    show(output, range(config, &start, &end).await)
}

async fn delete_flow<R, W>(config: &Config, input: &mut R, output: &mut W) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let store = config.store();
    let ledger = store.load().await?;
    if ledger.is_empty() {
        return say(output, NO_EXPENSES);
    }
    let format = config.amount_format();
    say(
        output,
        report::render_rows(&report::list_all(&ledger), format, true).trim_end(),
    )?;

    let position = loop {
        let prompt = "Enter the number of the expense to delete (blank to cancel): ";
        let text = ask(input, output, prompt)?.unwrap_or_default();
        if text.is_empty() {
            return say(output, "Deletion cancelled.");
        }
        match text
            .parse::<Position>()
            .and_then(|p| ledger.index_of(p).map(|_| p))
        {
            Ok(p) => break p,
            Err(e) => say(output, &e.to_string())?,
        }
    };

    let row = Row::new(position.get(), ledger.get(position)?);
    let answer = prompt_confirmation(input, output, &row, format)?;
    match remove_confirmed(&store, &ledger, position, answer).await? {
        Some(_) => say(output, "Expense deleted."),
        None => say(output, "Deletion cancelled."),
    }
}

/// Writes the message of a command's output, or passes its error through.
fn show<W, T>(output: &mut W, out: Result<Out<T>>) -> Result<()>
where
    W: Write,
    T: Serialize + Clone + Debug,
{
    say(output, out?.message().trim_end())
}

fn describe(e: &Error) -> String {
    match e.error_type() {
        ErrorType::Corrupt => format!("Could not read expenses. {e}"),
        _ => e.to_string(),
    }
}

fn say<W: Write>(output: &mut W, text: &str) -> Result<()> {
    writeln!(output, "{text}").pub_result(ErrorType::Io)
}

/// Writes `prompt` and reads one line. Returns `None` at end of input.
fn ask<R, W>(input: &mut R, output: &mut W, prompt: &str) -> Result<Option<String>>
where
    R: BufRead,
    W: Write,
{
    write!(output, "{prompt}")
        .and_then(|_| output.flush())
        .pub_result(ErrorType::Io)?;
    let mut line = String::new();
    let n = input.read_line(&mut line).pub_result(ErrorType::Io)?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use std::io::Cursor;

    async fn run(env: &TestEnv, script: &str) -> String {
        let mut input = Cursor::new(script.to_string());
        let mut output = Vec::new();
        let out = menu(env.config(), &mut input, &mut output).await.unwrap();
        assert_eq!(out.message(), "Goodbye.");
        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn test_menu_quit() {
        let env = TestEnv::new().await;
        let text = run(&env, "6\n").await;
        assert!(text.contains("==== Expense Tracker ===="));
    }

    #[tokio::test]
    async fn test_menu_eof_quits() {
        let env = TestEnv::new().await;
        run(&env, "").await;
    }

    #[tokio::test]
    async fn test_menu_add_reprompts_bad_amount() {
        let env = TestEnv::new().await;
        let text = run(&env, "1\nabc\n12.50\n\nFood\n\n2\n6\n").await;
        assert!(text.contains("Invalid amount 'abc'"));
        assert!(text.contains("The category cannot be empty."));
        assert!(text.contains("Expense saved successfully"));
        assert!(text.contains("$12.50 | food         | N/A"));
        assert_eq!(env.store().load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_menu_views_empty() {
        let env = TestEnv::new().await;
        let text = run(&env, "2\n3\n5\n6\n").await;
        assert_eq!(text.matches(NO_EXPENSES).count(), 3);
    }

    #[tokio::test]
    async fn test_menu_corrupt_view_continues() {
        let env = TestEnv::new().await;
        env.write_ledger("not json").await;
        let text = run(&env, "2\n6\n").await;
        assert!(text.contains("Could not read expenses."));
        assert_eq!(text.matches("==== Expense Tracker ====").count(), 2);
    }

    #[tokio::test]
    async fn test_menu_totals() {
        let env = TestEnv::new().await;
        env.insert("10", "food", "", "2024-03-01T00:00:00").await;
        env.insert("3", "transport", "", "2024-03-02T00:00:00").await;
        env.insert("5.5", "food", "", "2024-03-03T00:00:00").await;
        let text = run(&env, "3\n6\n").await;
        let food = text.find("food            : $15.50").unwrap();
        let transport = text.find("transport       : $3.00").unwrap();
        assert!(food < transport);
    }

    #[tokio::test]
    async fn test_menu_range_invalid_date() {
        let env = TestEnv::new().await;
        let text = run(&env, "4\n2024-01-01\nsoon\n6\n").await;
        assert!(text.contains("Invalid date 'soon'"));
    }

    #[tokio::test]
    async fn test_menu_delete_reprompts_then_deletes() {
        let env = TestEnv::new().await;
        env.insert("1", "a", "one", "2024-03-01T00:00:00").await;
        env.insert("2", "b", "two", "2024-03-02T00:00:00").await;
        env.insert("3", "c", "three", "2024-03-03T00:00:00").await;
        let text = run(&env, "5\n0\n9\nx\n2\nYES\n6\n").await;
        assert!(text.contains("  2. 2024-03-02"));
        assert!(text.contains("Position 0 is out of range"));
        assert!(text.contains("Position 9 is out of range"));
        assert!(text.contains("'x' is not a valid position"));
        assert!(text.contains("Expense deleted."));
        let notes: Vec<String> = env
            .store()
            .load()
            .await
            .unwrap()
            .iter()
            .map(|e| e.note().to_string())
            .collect();
        assert_eq!(notes, vec!["one", "three"]);
    }

    #[tokio::test]
    async fn test_menu_delete_declined() {
        let env = TestEnv::new().await;
        env.insert("1", "a", "one", "2024-03-01T00:00:00").await;
        let text = run(&env, "5\n1\nnope\n6\n").await;
        assert!(text.contains("Deletion cancelled."));
        assert_eq!(env.store().load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_menu_invalid_choice() {
        let env = TestEnv::new().await;
        let text = run(&env, "9\nq\n").await;
        assert!(text.contains("Invalid choice '9'."));
    }
}
