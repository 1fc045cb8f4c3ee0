//! Backup management for the ledger file.
//!
//! Backups are written to `$SPEND_HOME/.backups` with names of the form
//! `{prefix}.YYYY-MM-DD-NNN.json` where `NNN` is a sequence number within the day. Only the newest
//! `backup_copies` files of each prefix are kept.

use crate::error::Res;
use crate::utils;
use anyhow::Context;
use chrono::Local;
use std::path::{Path, PathBuf};

/// Prefix for the snapshot taken before a delete rewrites the ledger.
pub const PRE_DELETE: &str = "pre-delete";

/// Prefix for a ledger file that could not be parsed and was moved aside.
pub const CORRUPT: &str = "corrupt";

/// Prefix for the copy taken before a full rewrite changes entries that were not stored in
/// canonical form.
pub const NORMALIZED: &str = "normalized";

const EXTENSION: &str = "json";

/// Manages backup file creation and rotation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
}

impl Backup {
    pub fn new(backups_dir: impl Into<PathBuf>, backup_copies: u32) -> Self {
        Self {
            backups_dir: backups_dir.into(),
            backup_copies,
        }
    }

    /// Copies `source` into the backups directory under `prefix` and rotates old copies.
    ///
    /// Returns the path to the created backup file.
    pub async fn snapshot(&self, prefix: &str, source: &Path) -> Res<PathBuf> {
        let path = self.next_path(prefix).await?;
        utils::copy(source, &path).await?;
        self.rotate(prefix).await?;
        Ok(path)
    }

    /// Moves `source` into the backups directory under `prefix` and rotates old copies. After
    /// this, `source` no longer exists.
    ///
    /// Returns the path to the moved file.
    pub async fn quarantine(&self, prefix: &str, source: &Path) -> Res<PathBuf> {
        let path = self.next_path(prefix).await?;
        utils::rename(source, &path).await?;
        self.rotate(prefix).await?;
        Ok(path)
    }

    async fn next_path(&self, prefix: &str) -> Res<PathBuf> {
        utils::make_dir(&self.backups_dir).await?;
        let date = today();
        let seq = self.next_sequence_number(prefix, &date).await?;
        Ok(self
            .backups_dir
            .join(format!("{prefix}.{date}-{seq:03}.{EXTENSION}")))
    }

    /// Scans the backups directory for existing files with the given prefix and date,
    /// and returns the next sequence number.
    async fn next_sequence_number(&self, prefix: &str, date: &str) -> Res<u32> {
        let mut max_seq: u32 = 0;

        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if let Some(seq) = parse_sequence_number(&name, prefix, date) {
                max_seq = max_seq.max(seq);
            }
        }

        Ok(max_seq + 1)
    }

    /// Rotates old backup files, keeping only `backup_copies` files with the given prefix.
    async fn rotate(&self, prefix: &str) -> Res<()> {
        let mut files: Vec<(PathBuf, String)> = Vec::new();

        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if is_backup_file(&name, prefix) {
                files.push((entry.path(), name));
            }
        }

        // Sort by filename (which sorts by date and sequence number due to format)
        files.sort_by(|a, b| a.1.cmp(&b.1));

        let to_delete = files.len().saturating_sub(self.backup_copies as usize);
        for (path, _) in files.into_iter().take(to_delete) {
            utils::remove(&path).await?;
        }

        Ok(())
    }
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Parses the sequence number from a backup filename.
/// Returns None if the filename doesn't match `{prefix}.{date}-{NNN}.json`.
fn parse_sequence_number(filename: &str, prefix: &str, date: &str) -> Option<u32> {
    let remainder = filename.strip_prefix(&format!("{prefix}.{date}-"))?;
    let seq_str = remainder.strip_suffix(&format!(".{EXTENSION}"))?;
    seq_str.parse().ok()
}

fn is_backup_file(filename: &str, prefix: &str) -> bool {
    filename.starts_with(&format!("{prefix}.")) && filename.ends_with(&format!(".{EXTENSION}"))
}
