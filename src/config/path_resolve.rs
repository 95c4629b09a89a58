// src/config/path_resolve.rs

use crate::errors::{ConfigError, Result};
use std::path::PathBuf;

/// Resolves the working directory string to an absolute, canonicalized directory path.
pub(super) fn resolve_directory(dir_str: &str) -> Result<PathBuf> {
    let resolved = PathBuf::from(dir_str)
        .canonicalize()
        .map_err(|e| ConfigError::InvalidValue {
            option: "--dir".to_string(),
            reason: format!("Failed to resolve directory '{}': {}", dir_str, e),
        })?;
    if !resolved.is_dir() {
        return Err(ConfigError::InvalidValue {
            option: "--dir".to_string(),
            reason: format!("'{}' is not a directory", dir_str),
        }
        .into());
    }
    Ok(resolved)
}
