use crate::error::{Error, Result};
use crate::model::Expense;
use serde::Serialize;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The full, ordered collection of expenses. Order is insertion order, and a record's 1-based
/// position in this sequence is how the user refers to it when deleting.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Ledger(Vec<Expense>);

impl Ledger {
    pub fn new(expenses: Vec<Expense>) -> Self {
        Self(expenses)
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Expense> {
        self.0.iter()
    }

    pub fn last(&self) -> Option<&Expense> {
        self.0.last()
    }

    pub fn push(&mut self, expense: Expense) {
        self.0.push(expense)
    }

    /// Returns the expense at `position`, or a validation error if it is out of range.
    pub fn get(&self, position: Position) -> Result<&Expense> {
        let ix = self.index_of(position)?;
        Ok(&self.0[ix])
    }

    /// Removes and returns the expense at `position`. An out-of-range position is a validation
    /// error and leaves the ledger untouched.
    pub fn remove(&mut self, position: Position) -> Result<Expense> {
        let ix = self.index_of(position)?;
        Ok(self.0.remove(ix))
    }

    /// Converts a 1-based `position` into a 0-based index into this ledger.
    pub fn index_of(&self, position: Position) -> Result<usize> {
        let len = self.len();
        if len == 0 {
            return Err(Error::validation("There are no expenses to choose from"));
        }
        match position.get() {
            p if (1..=len).contains(&p) => Ok(p - 1),
            p => Err(Error::validation(format!(
                "Position {p} is out of range, choose a number from 1 to {len}"
            ))),
        }
    }
}

impl From<Vec<Expense>> for Ledger {
    fn from(value: Vec<Expense>) -> Self {
        Ledger(value)
    }
}

impl FromIterator<Expense> for Ledger {
    fn from_iter<T: IntoIterator<Item = Expense>>(iter: T) -> Self {
        Ledger(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a Expense;
    type IntoIter = std::slice::Iter<'a, Expense>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A 1-based position in the ledger as shown in a numbered listing. Any number parses; range
/// checking happens against a loaded `Ledger`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Position(usize);

impl Position {
    pub const fn new(position: usize) -> Self {
        Self(position)
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for Position {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<usize>()
            .map(Position)
            .map_err(|_| Error::validation(format!("'{}' is not a valid position", s.trim())))
    }
}

/// The user's answer to "are you sure?". Only `yes` or `y`, in any case, confirm.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum Confirmation {
    Yes,
    #[default]
    No,
}

impl Confirmation {
    /// Interprets a typed answer. Only `yes` or `y`, in any case, confirm.
    pub fn from_answer(answer: &str) -> Self {
        match answer.trim().to_lowercase().as_str() {
            "yes" | "y" => Confirmation::Yes,
            _ => Confirmation::No,
        }
    }

    pub fn is_yes(&self) -> bool {
        *self == Confirmation::Yes
    }
}

impl FromStr for Confirmation {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Confirmation::from_answer(s))
    }
}
