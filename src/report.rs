//! Read-only views over a loaded `Ledger`: the full listing, totals by category, and the date range
//! filter. None of these mutate the ledger or touch the filesystem.

use crate::error::{Error, Result};
use crate::model::{Amount, AmountFormat, Expense, Ledger};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt::Write;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Naive date-time layouts accepted in timestamps, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// One expense as it appears in a listing.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Row {
    /// The 1-based position of the expense in the ledger.
    pub position: usize,
    /// The date portion of the timestamp.
    pub date: String,
    pub amount: Amount,
    pub category: String,
    pub note: String,
}

impl Row {
    pub(crate) fn new(position: usize, expense: &Expense) -> Self {
        Self {
            position,
            date: expense.date_str().to_string(),
            amount: expense.amount(),
            category: expense.category().to_string(),
            note: expense.note().to_string(),
        }
    }

    /// e.g. `2024-03-15 |    $4.50 | food         | coffee`
    pub fn render(&self, format: AmountFormat) -> String {
        format!(
            "{} | {:>9} | {:<12} | {}",
            self.date,
            self.amount.display(format).to_string(),
            self.category,
            self.note
        )
    }
}

/// The running total for one category.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Amount,
}

/// Totals by category, in the order each category was first seen in the ledger.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Totals(Vec<CategoryTotal>);

impl Totals {
    pub fn entries(&self) -> &[CategoryTotal] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the total for `category`, if it appeared in the ledger.
    pub fn get(&self, category: &str) -> Option<Amount> {
        self.0
            .iter()
            .find(|t| t.category == category)
            .map(|t| t.total)
    }

    /// One line per category, e.g. `food            : $15.50`
    pub fn render(&self, format: AmountFormat) -> String {
        let mut s = String::new();
        for t in &self.0 {
            let _ = writeln!(s, "{:<15} : {}", t.category, t.total.display(format));
        }
        s
    }

    fn add(&mut self, category: &str, amount: Amount) {
        match self.0.iter_mut().find(|t| t.category == category) {
            Some(t) => t.total = t.total.saturating_add(amount),
            None => self.0.push(CategoryTotal {
                category: category.to_string(),
                total: amount,
            }),
        }
    }
}

/// An inclusive range of calendar dates. A range whose start is after its end is empty.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Every expense in ledger order.
pub fn list_all(ledger: &Ledger) -> Vec<Row> {
    ledger
        .iter()
        .enumerate()
        .map(|(ix, e)| Row::new(ix + 1, e))
        .collect()
}

/// Sums amounts per category. Categories appear in first-seen order. A total that would exceed
/// the largest representable amount stays at that amount.
pub fn totals_by_category(ledger: &Ledger) -> Totals {
    let mut totals = Totals::default();
    for e in ledger {
        totals.add(e.category(), e.amount());
    }
    totals
}

/// The expenses whose timestamp falls on a date within `range`. Expenses whose timestamp cannot be
/// parsed are left out.
pub fn filter_by_date_range(ledger: &Ledger, range: DateRange) -> Vec<Row> {
    ledger
        .iter()
        .enumerate()
        .filter(|(_, e)| {
            parse_timestamp_date(e.timestamp())
                .map(|d| range.contains(d))
                .unwrap_or(false)
        })
        .map(|(ix, e)| Row::new(ix + 1, e))
        .collect()
}

/// Renders rows one per line. With `numbered`, each line is prefixed with the row's position.
pub fn render_rows(rows: &[Row], format: AmountFormat, numbered: bool) -> String {
    let mut s = String::new();
    for row in rows {
        if numbered {
            let _ = write!(s, "{:>3}. ", row.position);
        }
        let _ = writeln!(s, "{}", row.render(format));
    }
    s
}

/// Extracts the calendar date from an ISO-8601 timestamp. Accepts RFC 3339 with an offset, naive
/// date-times with a `T` or space separator, and bare dates.
pub fn parse_timestamp_date(timestamp: &str) -> Option<NaiveDate> {
    let s = timestamp.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// Parses a user-supplied `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| {
        Error::validation(format!(
            "Invalid date '{}', expected YYYY-MM-DD",
            s.trim()
        ))
    })
}
