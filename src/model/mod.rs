//! Types that represent the core data model: `Expense`, the `Ledger` that holds them, and the
//! `Amount` type.
mod amount;
mod expense;
mod ledger;

pub use amount::{Amount, AmountError, AmountFormat};
pub use expense::{normalize_category, Decoded, Expense, Field, Issue, Problem};
pub use expense::{NO_NOTE, UNCATEGORIZED};
pub use ledger::{Confirmation, Ledger, Position};
