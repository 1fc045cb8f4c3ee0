//! These structs provide the CLI interface for the spend CLI.

use crate::model::Position;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// spend: A command-line ledger for personal spending.
///
/// Each expense has an amount, a category, an optional note and the time it was recorded. Expenses
/// are kept in a JSON file in the spend home directory. Run `spend init` once to create the
/// directory, then `spend add` to record expenses and `list`, `totals` or `range` to review them.
///
/// `spend menu` offers the same operations as an interactive menu.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the spend home directory and its configuration file.
    Init,
    /// Record a new expense, timestamped now.
    Add(AddArgs),
    /// List every expense in the order it was recorded.
    List,
    /// Show the total spent per category.
    Totals,
    /// List the expenses recorded between two dates, inclusive.
    Range(RangeArgs),
    /// Delete one expense by its position in `spend list`.
    Delete(DeleteArgs),
    /// Run the interactive menu.
    Menu,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the ledger and configuration are held. Defaults to ~/spend
    #[arg(long, env = "SPEND_HOME", default_value_t = default_spend_home())]
    spend_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, spend_home: PathBuf) -> Self {
        Self {
            log_level,
            spend_home: spend_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn spend_home(&self) -> &DisplayPath {
        &self.spend_home
    }
}

/// (Not shown): Args for the `spend add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The amount spent, e.g. 12.50
    #[arg(allow_hyphen_values = true)]
    amount: String,

    /// The category, e.g. food or transport. Stored in lowercase.
    category: String,

    /// An optional note.
    #[arg(long, short)]
    note: Option<String>,
}

impl AddArgs {
    pub fn new(amount: impl Into<String>, category: impl Into<String>, note: Option<String>) -> Self {
        Self {
            amount: amount.into(),
            category: category.into(),
            note,
        }
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}

/// (Not shown): Args for the `spend range` command.
#[derive(Debug, Parser, Clone)]
pub struct RangeArgs {
    /// The first date to include, YYYY-MM-DD
    start: String,

    /// The last date to include, YYYY-MM-DD
    end: String,
}

impl RangeArgs {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }
}

/// (Not shown): Args for the `spend delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The number shown next to the expense by `spend menu`, or its line number in `spend list`.
    position: Position,

    /// Answer the confirmation question up front. Only "yes" or "y" deletes. When omitted, you are
    /// asked on stdin.
    #[arg(long)]
    confirm: Option<String>,
}

impl DeleteArgs {
    pub fn new(position: Position, confirm: Option<String>) -> Self {
        Self { position, confirm }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn confirm(&self) -> Option<&str> {
        self.confirm.as_deref()
    }
}

fn default_spend_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("spend"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --spend-home or SPEND_HOME instead of relying on the default \
                spend home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("spend")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
