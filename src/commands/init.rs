use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Creates the data directory, its backups subdirectory, and an initial `config.json` file with
/// default settings. The ledger file itself is created by the first `add`.
///
/// # Errors
/// - Returns an error if the directory has already been initialized.
/// - Returns an error if any file operations fail.
pub async fn init(spend_home: &Path) -> Result<Out<PathBuf>> {
    let config = Config::create(spend_home)
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;
    Ok(Out::new(
        format!(
            "Successfully created the spend directory at {}",
            config.root().display()
        ),
        config.ledger_path().to_path_buf(),
    ))
}
