// src/config/validation.rs

use super::ConfigBuilder;
use crate::errors::{ConfigError, Result};

/// Validates combinations of options on the `ConfigBuilder`.
///
/// `--init` only records an origin, so every option that shapes a sync is
/// rejected alongside it.
pub(super) fn validate_builder_options(builder: &ConfigBuilder) -> Result<()> {
    if builder.init.is_some() {
        if builder.repo.is_some() {
            return Err(ConfigError::Conflict {
                option1: "--init".to_string(),
                option2: "REPO".to_string(),
            }
            .into());
        }
        if builder.branch.is_some() {
            return Err(ConfigError::Conflict {
                option1: "--init".to_string(),
                option2: "--branch".to_string(),
            }
            .into());
        }
        if builder.fallback.unwrap_or(false) {
            return Err(ConfigError::Conflict {
                option1: "--init".to_string(),
                option2: "--fallback".to_string(),
            }
            .into());
        }
    }
    Ok(())
}
