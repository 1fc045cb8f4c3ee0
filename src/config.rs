//! Configuration file handling.
//!
//! The configuration file is stored at `$SPEND_HOME/config.json` and contains settings for the
//! application including where the ledger file lives, how many backups to keep, and how amounts
//! are rendered.

use crate::backup::Backup;
use crate::error::{ErrorType, IntoResult, Res, Result};
use crate::model::AmountFormat;
use crate::store::Store;
use crate::utils;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "spend";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const BACKUPS: &str = ".backups";
const CONFIG_JSON: &str = "config.json";
const EXPENSES_JSON: &str = "expenses.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$SPEND_HOME` and from there it loads `$SPEND_HOME/config.json`. It provides paths
/// to other items that are either configurable or are expected in a certain location within the
/// home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    ledger_path: PathBuf,
}

impl Config {
    /// Creates the data directory, its backups subdirectory, and an initial `config.json` file
    /// with default settings.
    ///
    /// # Errors
    /// - Returns an error if a `config.json` already exists in `dir`.
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>) -> Res<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the spend home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.is_file() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            )
        }

        let backups = root.join(BACKUPS);
        utils::make_dir(&backups).await?;

        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;
        let ledger_path = config_file.ledger_path(&root);

        Ok(Self {
            root,
            backups,
            config_path,
            config_file,
            ledger_path,
        })
    }

    /// This will
    /// - validate that `spend_home` exists and that the config file exists
    /// - load the config file
    /// - validate that the backups directory exists
    /// - return the loaded configuration object
    pub async fn load(spend_home: impl Into<PathBuf>) -> Result<Self> {
        Self::load_inner(spend_home.into())
            .await
            .pub_result(ErrorType::Config)
    }

    async fn load_inner(spend_home: PathBuf) -> Res<Self> {
        let maybe_relative = spend_home;
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The spend home directory is missing, run 'spend init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'spend init' first",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let ledger_path = config_file.ledger_path(&root);

        let config = Self {
            backups: root.join(BACKUPS),
            root,
            config_path,
            config_file,
            ledger_path,
        };
        if !config.backups.is_dir() {
            bail!(
                "The backups directory is missing '{}'",
                config.backups.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    /// The resolved path to the ledger file.
    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// How amounts are rendered in reports.
    pub fn amount_format(&self) -> AmountFormat {
        AmountFormat::new(true, self.config_file.thousands_separator)
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self.backups.clone(), self.backup_copies())
    }

    /// Creates a `Store` for the configured ledger file.
    pub fn store(&self) -> Store {
        Store::new(self.ledger_path.clone(), self.backup())
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "spend",
///   "config_version": 1,
///   "ledger_file": "expenses.json",
///   "backup_copies": 5,
///   "thousands_separator": false
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "spend"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Path to the ledger file (optional, relative to the home directory or absolute)
    /// Defaults to $SPEND_HOME/expenses.json if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ledger_file: Option<PathBuf>,

    /// Number of backup copies to keep per kind of backup
    #[serde(default = "default_backup_copies")]
    backup_copies: u32,

    /// Whether amounts are rendered with commas as thousands separators
    #[serde(default)]
    thousands_separator: bool,
}

fn default_backup_copies() -> u32 {
    BACKUP_COPIES
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            ledger_file: None,
            backup_copies: BACKUP_COPIES,
            thousands_separator: false,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it belongs to another app
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version <= CONFIG_VERSION,
            "Config version {} is unsupported. Is a newer version of spend available?",
            config.config_version
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    /// Returns the stored `ledger_file` if it is absolute, otherwise resolves it against `root`.
    fn ledger_path(&self, root: &Path) -> PathBuf {
        match &self.ledger_file {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => root.join(p),
            None => root.join(EXPENSES_JSON),
        }
    }
}
