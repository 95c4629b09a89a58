//! Reads the origin remote of an existing local checkout.

use crate::constants::VCS_DIR;
use crate::errors::{Error, Result};
use std::path::Path;

/// Returns `true` if `dir` contains a version-control metadata directory.
pub fn has_vcs_dir(dir: &Path) -> bool {
    dir.join(VCS_DIR).is_dir()
}

/// Reads `remote.origin.url` from `<dir>/.git/config`.
///
/// Only the repository's own config file is consulted, never the user's
/// global or system configuration.
///
/// # Errors
/// Returns [`Error::LocalStateError`] if the config file cannot be opened or
/// has no origin remote.
pub fn origin_url(dir: &Path) -> Result<String> {
    let config_path = dir.join(VCS_DIR).join("config");
    let config = git2::Config::open(&config_path).map_err(|e| {
        Error::LocalStateError(format!(
            "Cannot read '{}': {}",
            config_path.display(),
            e.message()
        ))
    })?;

    match config.get_string("remote.origin.url") {
        Ok(url) => Ok(url),
        Err(e) if e.code() == git2::ErrorCode::NotFound => Err(Error::LocalStateError(format!(
            "No origin remote configured in '{}'",
            config_path.display()
        ))),
        Err(e) => Err(Error::LocalStateError(format!(
            "Cannot read the origin remote from '{}': {}",
            config_path.display(),
            e.message()
        ))),
    }
}
