use crate::model::Amount;
use chrono::Local;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

/// The note written when the user does not provide one.
pub const NO_NOTE: &str = "N/A";

/// The category substituted when an entry has none.
pub const UNCATEGORIZED: &str = "uncategorized";

/// The timestamp format used when creating an expense, e.g. `2024-03-15T10:00:00.123456`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

const AMOUNT_KEY: &str = "amount";
const CATEGORY_KEY: &str = "category";
const NOTE_KEY: &str = "note";
const TIMESTAMP_KEY: &str = "timestamp";

/// A single spending event.
///
/// Expenses are never modified after creation. The `timestamp` is captured when the expense is
/// created and is kept as text; it is not re-validated when read back.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize)]
pub struct Expense {
    amount: Amount,
    category: String,
    note: String,
    timestamp: String,
}

impl Expense {
    /// Creates an expense, normalizing `category` (trimmed, lowercase) and `note` (empty becomes
    /// `N/A`).
    pub fn new(
        amount: Amount,
        category: impl AsRef<str>,
        note: impl AsRef<str>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            category: normalize_category(category.as_ref()),
            note: normalize_note(note.as_ref()),
            timestamp: timestamp.into(),
        }
    }

    /// Creates an expense stamped with the current local time.
    pub fn now(amount: Amount, category: impl AsRef<str>, note: impl AsRef<str>) -> Self {
        Self::new(amount, category, note, now_timestamp())
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// The date portion of the timestamp: its first 10 characters, i.e. `YYYY-MM-DD` for a
    /// well-formed timestamp.
    pub fn date_str(&self) -> &str {
        match self.timestamp.char_indices().nth(10) {
            Some((ix, _)) => &self.timestamp[..ix],
            None => &self.timestamp,
        }
    }

    /// Decodes one entry of the ledger file. This never fails: missing or malformed fields are
    /// replaced with defaults and reported as `Issue`s. `position` is the 1-based position of the
    /// entry in the file and is only used for reporting.
    pub fn decode(position: usize, value: &Value) -> Decoded {
        let mut issues = Vec::new();
        let mut issue = |field: Field, problem: Problem| {
            issues.push(Issue {
                position,
                field,
                problem,
            })
        };

        let empty = Map::new();
        let obj = match value.as_object() {
            Some(obj) => obj,
            None => {
                issue(Field::Entry, Problem::NotAnObject);
                &empty
            }
        };

        let amount = match obj.get(AMOUNT_KEY) {
            None | Some(Value::Null) => {
                issue(Field::Amount, Problem::Missing);
                Amount::ZERO
            }
            Some(v) => match Amount::from_json(v) {
                Some(a) => a,
                None if v.is_string() => {
                    issue(Field::Amount, Problem::Unparsable);
                    Amount::ZERO
                }
                None => {
                    issue(Field::Amount, Problem::WrongType);
                    Amount::ZERO
                }
            },
        };

        let category = match obj.get(CATEGORY_KEY) {
            Some(Value::String(s)) => s.as_str(),
            None | Some(Value::Null) => {
                issue(Field::Category, Problem::Missing);
                UNCATEGORIZED
            }
            Some(_) => {
                issue(Field::Category, Problem::WrongType);
                UNCATEGORIZED
            }
        };

        let note = match obj.get(NOTE_KEY) {
            Some(Value::String(s)) => s.as_str(),
            None | Some(Value::Null) => NO_NOTE,
            Some(_) => {
                issue(Field::Note, Problem::WrongType);
                NO_NOTE
            }
        };

        let timestamp = match obj.get(TIMESTAMP_KEY) {
            Some(Value::String(s)) => s.clone(),
            None | Some(Value::Null) => {
                issue(Field::Timestamp, Problem::Missing);
                String::new()
            }
            Some(_) => {
                issue(Field::Timestamp, Problem::WrongType);
                String::new()
            }
        };

        Decoded {
            expense: Expense::new(amount, category, note, timestamp),
            issues,
        }
    }
}

/// The result of decoding one ledger entry.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Decoded {
    pub expense: Expense,
    pub issues: Vec<Issue>,
}

/// A recoverable problem found while decoding a ledger entry.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
pub struct Issue {
    /// The 1-based position of the entry in the ledger file.
    pub position: usize,
    pub field: Field,
    pub problem: Problem,
}

impl Display for Issue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.field {
            Field::Entry => write!(f, "entry {}: {}", self.position, self.problem),
            field => write!(f, "entry {}: {field} {}", self.position, self.problem),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Entry,
    Amount,
    Category,
    Note,
    Timestamp,
}

serde_plain::derive_display_from_serialize!(Field);

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Problem {
    #[serde(rename = "is missing")]
    Missing,
    #[serde(rename = "has the wrong type")]
    WrongType,
    #[serde(rename = "is not a number")]
    Unparsable,
    #[serde(rename = "is not an object")]
    NotAnObject,
}

serde_plain::derive_display_from_serialize!(Problem);

/// Trims and lowercases a category. An empty category becomes `uncategorized`.
pub fn normalize_category(category: &str) -> String {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        UNCATEGORIZED.to_string()
    } else {
        trimmed.to_lowercase()
    }
}

fn normalize_note(note: &str) -> String {
    let trimmed = note.trim();
    if trimmed.is_empty() {
        NO_NOTE.to_string()
    } else {
        trimmed.to_string()
    }
}

fn now_timestamp() -> String {
    Local::now().naive_local().format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn amt(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[test]
    fn test_new_normalizes() {
        let e = Expense::new(amt("4.50"), "  Food ", "", "2024-03-15T10:00:00");
        assert_eq!(e.category(), "food");
        assert_eq!(e.note(), NO_NOTE);
        assert_eq!(e.date_str(), "2024-03-15");
    }

    #[test]
    fn test_now_timestamp_shape() {
        let e = Expense::now(amt("1"), "misc", "x");
        assert_eq!(e.timestamp().len(), 26);
        assert_eq!(&e.timestamp()[10..11], "T");
        assert!(chrono::NaiveDateTime::parse_from_str(e.timestamp(), TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn test_date_str_short_timestamp() {
        let e = Expense::new(amt("1"), "misc", "x", "2024");
        assert_eq!(e.date_str(), "2024");
    }

    #[test]
    fn test_serialized_keys() {
        let e = Expense::new(amt("10.5"), "food", "lunch", "2024-03-15T10:00:00");
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(
            v,
            json!({
                "amount": 10.5,
                "category": "food",
                "note": "lunch",
                "timestamp": "2024-03-15T10:00:00"
            })
        );
    }

    #[test]
    fn test_decode_well_formed() {
        let v = json!({
            "amount": 10.0,
            "category": "food",
            "note": "lunch",
            "timestamp": "2024-03-15T10:00:00"
        });
        let d = Expense::decode(1, &v);
        assert!(d.issues.is_empty());
        assert_eq!(
            d.expense,
            Expense::new(amt("10"), "food", "lunch", "2024-03-15T10:00:00")
        );
    }

    #[test]
    fn test_decode_legacy_values() {
        let v = json!({
            "amount": "12.25",
            "category": " Transport ",
            "note": "",
            "timestamp": "2024-03-15T10:00:00"
        });
        let d = Expense::decode(1, &v);
        assert!(d.issues.is_empty());
        assert_eq!(d.expense.amount(), amt("12.25"));
        assert_eq!(d.expense.category(), "transport");
        assert_eq!(d.expense.note(), NO_NOTE);
    }

    #[test]
    fn test_decode_bad_fields() {
        let v = json!({ "amount": "lots", "category": 7, "note": ["x"] });
        let d = Expense::decode(3, &v);
        assert_eq!(d.expense.amount(), Amount::ZERO);
        assert_eq!(d.expense.category(), UNCATEGORIZED);
        assert_eq!(d.expense.note(), NO_NOTE);
        assert_eq!(d.expense.timestamp(), "");
        let problems: Vec<(Field, Problem)> =
            d.issues.iter().map(|i| (i.field, i.problem)).collect();
        assert_eq!(
            problems,
            vec![
                (Field::Amount, Problem::Unparsable),
                (Field::Category, Problem::WrongType),
                (Field::Note, Problem::WrongType),
                (Field::Timestamp, Problem::Missing),
            ]
        );
        assert_eq!(d.issues[0].to_string(), "entry 3: amount is not a number");
    }

    #[test]
    fn test_decode_not_an_object() {
        let d = Expense::decode(2, &json!(42));
        assert_eq!(d.issues[0].field, Field::Entry);
        assert_eq!(d.issues[0].to_string(), "entry 2: is not an object");
        assert_eq!(d.expense.category(), UNCATEGORIZED);
    }

    #[test]
    fn test_decode_missing_note_is_not_an_issue() {
        let v = json!({ "amount": 1, "category": "food", "timestamp": "2024-01-01" });
        let d = Expense::decode(1, &v);
        assert!(d.issues.is_empty());
        assert_eq!(d.expense.note(), NO_NOTE);
    }
}
