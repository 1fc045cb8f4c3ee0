//! The ledger store: durable read-modify-write access to the ledger file.
//!
//! The ledger file is a JSON array of expense objects. Every operation reads or writes the whole
//! file; nothing is cached between calls. There is no locking, so two writers racing on the same
//! file will lose one of the updates.
//!
//! `append` and `remove` work on the entries as they were read, so entries they do not touch are
//! written back unchanged, including legacy values and keys this crate does not know about.

use crate::backup::{Backup, CORRUPT, NORMALIZED, PRE_DELETE};
use crate::error::{Error, ErrorType, IntoResult, Res, Result};
use crate::model::{Expense, Issue, Ledger, Position};
use crate::utils;
use anyhow::{anyhow, Context};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Mediates access to one ledger file.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    backup: Backup,
}

/// A ledger as read from disk, together with any problems found in individual entries.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Loaded {
    pub ledger: Ledger,
    pub issues: Vec<Issue>,
}

/// The outcome of an `append`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Appended {
    /// The number of expenses in the ledger after the append.
    pub count: usize,
    /// Where an unreadable ledger file was moved before the append started a fresh ledger.
    pub quarantined: Option<PathBuf>,
}

/// What was found at the ledger path.
enum Raw {
    Missing,
    Entries(Vec<Value>),
    Corrupt(anyhow::Error),
}

impl Store {
    pub fn new(path: impl Into<PathBuf>, backup: Backup) -> Self {
        Self {
            path: path.into(),
            backup,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Loads the ledger. A missing file is an empty ledger. A file that is not a JSON array is a
    /// `Corrupt` error. Malformed entries are replaced with defaults and logged.
    pub async fn load(&self) -> Result<Ledger> {
        Ok(self.load_with_issues().await?.ledger)
    }

    /// Like `load`, but also returns the problems found in individual entries.
    pub async fn load_with_issues(&self) -> Result<Loaded> {
        match self.read_raw().await.pub_result(ErrorType::Io)? {
            Raw::Missing => {
                debug!("No ledger file at {}", self.path.display());
                Ok(Loaded::default())
            }
            Raw::Entries(entries) => Ok(decode_all(&entries)),
            Raw::Corrupt(e) => Err(self.corrupt(e)),
        }
    }

    /// Appends `expense` to the end of the ledger and rewrites the whole file.
    ///
    /// If the existing file is unreadable it is moved into the backups directory and the append
    /// starts from an empty ledger. The returned `Appended` carries the backup path in that case.
    pub async fn append(&self, expense: Expense) -> Result<Appended> {
        let (mut entries, quarantined) = match self.read_raw().await.pub_result(ErrorType::Io)? {
            Raw::Missing => (Vec::new(), None),
            Raw::Entries(entries) => (entries, None),
            Raw::Corrupt(e) => {
                warn!(
                    "The ledger file {} could not be read ({e:#}), moving it aside and starting a \
                    new ledger",
                    self.path.display()
                );
                let moved = self
                    .backup
                    .quarantine(CORRUPT, &self.path)
                    .await
                    .pub_result(ErrorType::Io)?;
                warn!("The unreadable ledger file was moved to {}", moved.display());
                (Vec::new(), Some(moved))
            }
        };
        let value = serde_json::to_value(&expense)
            .context("Unable to serialize the expense")
            .pub_result(ErrorType::Io)?;
        entries.push(value);
        self.write(&entries, entries.len())
            .await
            .pub_result(ErrorType::Io)?;
        Ok(Appended {
            count: entries.len(),
            quarantined,
        })
    }

    /// Removes the entry at `position` and rewrites the file, keeping every other entry exactly as
    /// it was read. The previous file is copied into the backups directory first.
    ///
    /// # Errors
    /// - A `Validation` error if `position` is outside `1..=len`. Nothing is written.
    /// - A `Corrupt` error if the ledger file cannot be parsed.
    pub async fn remove(&self, position: Position) -> Result<Expense> {
        let mut entries = match self.read_raw().await.pub_result(ErrorType::Io)? {
            Raw::Missing => Vec::new(),
            Raw::Entries(entries) => entries,
            Raw::Corrupt(e) => return Err(self.corrupt(e)),
        };
        let mut ledger = decode_all(&entries).ledger;
        let ix = ledger.index_of(position)?;
        if let Some(backup) = self.snapshot().await? {
            info!("Saved a copy of the ledger to {}", backup.display());
        }
        let _ = entries.remove(ix);
        self.write(&entries, entries.len())
            .await
            .pub_result(ErrorType::Io)?;
        ledger.remove(position)
    }

    /// Overwrites the ledger file with exactly `ledger`, in order.
    ///
    /// If the file being replaced is unreadable, or holds entries that are not in canonical form
    /// (legacy amounts, mixed-case categories, missing fields, unknown keys), it is copied into the
    /// backups directory before being overwritten.
    pub async fn save_all(&self, ledger: &Ledger) -> Result<()> {
        let keep_copy = match self.read_raw().await.pub_result(ErrorType::Io)? {
            Raw::Missing => false,
            Raw::Entries(entries) => !is_canonical(&entries).pub_result(ErrorType::Io)?,
            Raw::Corrupt(_) => true,
        };
        if keep_copy {
            let backup = self
                .backup
                .snapshot(NORMALIZED, &self.path)
                .await
                .pub_result(ErrorType::Io)?;
            warn!(
                "The ledger file is being rewritten and did not match its canonical form, the \
                previous file was saved to {}",
                backup.display()
            );
        }
        self.write(ledger, ledger.len())
            .await
            .pub_result(ErrorType::Io)
    }

    /// Copies the current ledger file into the backups directory. Returns `None` if there is no
    /// ledger file yet.
    pub async fn snapshot(&self) -> Result<Option<PathBuf>> {
        if !self.exists() {
            return Ok(None);
        }
        let path = self
            .backup
            .snapshot(PRE_DELETE, &self.path)
            .await
            .pub_result(ErrorType::Io)?;
        debug!("Saved ledger snapshot to {}", path.display());
        Ok(Some(path))
    }

    async fn read_raw(&self) -> Res<Raw> {
        let text = match utils::read_if_exists(&self.path).await? {
            None => return Ok(Raw::Missing),
            Some(text) => text,
        };
        Ok(match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(entries)) => Raw::Entries(entries),
            Ok(_) => Raw::Corrupt(anyhow!("expected a JSON array of expenses")),
            Err(e) => Raw::Corrupt(anyhow::Error::new(e).context("invalid JSON")),
        })
    }

    fn corrupt(&self, e: anyhow::Error) -> Error {
        Error::new(
            ErrorType::Corrupt,
            e.context(format!(
                "The ledger file {} could not be read",
                self.path.display()
            )),
        )
    }

    async fn write<T>(&self, contents: &T, count: usize) -> Res<()>
    where
        T: Serialize + ?Sized,
    {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                utils::make_dir(parent).await?;
            }
        }
        let mut buf = Vec::new();
        let mut ser =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        contents
            .serialize(&mut ser)
            .context("Unable to serialize the ledger")?;
        utils::write_atomic(&self.path, buf).await?;
        debug!("Wrote {count} expense(s) to {}", self.path.display());
        Ok(())
    }
}

/// Whether `entries` would be written back identically after decoding.
fn is_canonical(entries: &[Value]) -> Res<bool> {
    let decoded = decode_all_quietly(entries);
    let rewritten = serde_json::to_value(&decoded).context("Unable to serialize the ledger")?;
    Ok(rewritten.as_array().map(Vec::as_slice) == Some(entries))
}

fn decode_all_quietly(entries: &[Value]) -> Ledger {
    entries
        .iter()
        .enumerate()
        .map(|(ix, value)| Expense::decode(ix + 1, value).expense)
        .collect()
}

fn decode_all(entries: &[Value]) -> Loaded {
    let mut loaded = Loaded::default();
    for (ix, value) in entries.iter().enumerate() {
        let decoded = Expense::decode(ix + 1, value);
        for issue in &decoded.issues {
            warn!("Malformed expense, {issue}");
        }
        loaded.issues.extend(decoded.issues);
        loaded.ledger.push(decoded.expense);
    }
    loaded
}
