//! Defines the core `Config` struct and related types for application configuration.
//!
//! This module consolidates the settings parsed and validated from the CLI and
//! the environment, making them available to the rest of the application in a
//! structured and type-safe manner.

use crate::constants::{
    API_URL_ENV, DEFAULT_API_URL, DEFAULT_WEB_URL, TOKEN_ENV, WEB_URL_ENV,
};
use crate::errors::{ConfigError, Result};
use crate::github::RepositoryReference;
use crate::materialize::TransferMethod;
use std::fmt;
use std::path::PathBuf;
use url::Url;

pub use builder::ConfigBuilder;
mod builder;
mod path_resolve;
mod validation;

/// What a run does with its target directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Record the origin in the directory without contacting the remote.
    Init(RepositoryReference),
    /// Mirror the repository into `<directory>/<name>`.
    Clone(RepositoryReference),
    /// Update the directory from the repository it already mirrors.
    Update,
}

/// Where and how to reach the hosting API.
#[derive(Clone, PartialEq, Eq)]
pub struct GitHubConfig {
    /// Base URL of the REST API.
    pub api_url: Url,
    /// Base URL serving branch archives.
    pub web_url: Url,
    /// Personal access token sent as a bearer token.
    pub token: Option<String>,
    pub user_agent: String,
}

// The token must never end up in logs.
impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_url", &self.api_url.as_str())
            .field("web_url", &self.web_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl GitHubConfig {
    /// Reads `GITPULL_API_URL`, `GITPULL_WEB_URL` and `GITHUB_TOKEN` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the settings from any key lookup, falling back to the public GitHub endpoints.
    ///
    /// Empty values count as unset.
    ///
    /// ```
    /// use gitpull::config::GitHubConfig;
    ///
    /// let config = GitHubConfig::from_lookup(|key| match key {
    ///     "GITPULL_API_URL" => Some("http://127.0.0.1:8080".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(config.api_url.as_str(), "http://127.0.0.1:8080/");
    /// assert_eq!(config.web_url.as_str(), "https://github.com/");
    /// assert!(config.token.is_none());
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let url = |key: &str, default: &str| -> Result<Url> {
            let raw = value(key).unwrap_or_else(|| default.to_string());
            let parsed = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidValue {
                option: key.to_string(),
                reason: format!("'{}' is not a valid URL: {}", raw, e),
            })?;
            if parsed.cannot_be_a_base() {
                return Err(ConfigError::InvalidValue {
                    option: key.to_string(),
                    reason: format!("'{}' cannot be used as a base URL", raw),
                }
                .into());
            }
            Ok(parsed)
        };

        Ok(Self {
            api_url: url(API_URL_ENV, DEFAULT_API_URL)?,
            web_url: url(WEB_URL_ENV, DEFAULT_WEB_URL)?,
            token: value(TOKEN_ENV).map(|t| t.trim().to_string()),
            user_agent: format!("gitpull/{}", env!("CARGO_PKG_VERSION")),
        })
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            web_url: Url::parse(DEFAULT_WEB_URL).expect("default web URL is valid"),
            token: None,
            user_agent: format!("gitpull/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// The complete configuration for one `gitpull` run.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    /// An explicit branch. `None` lets the sync driver choose.
    pub branch: Option<String>,
    pub transfer: TransferMethod,
    /// The absolute, canonical directory the command operates in.
    pub directory: PathBuf,
    pub github: GitHubConfig,
}

impl Config {
    /// The directory whose contents and records the run manages.
    ///
    /// In clone mode this is `<directory>/<name>`; otherwise the directory itself.
    pub fn target_dir(&self) -> PathBuf {
        match &self.mode {
            Mode::Clone(reference) => self.directory.join(reference.name()),
            Mode::Init(_) | Mode::Update => self.directory.clone(),
        }
    }

    /// Creates a default `Config` for testing purposes.
    #[doc(hidden)]
    pub fn new_for_test() -> Self {
        Self {
            mode: Mode::Update,
            branch: None,
            transfer: TransferMethod::Archive,
            directory: PathBuf::from("."),
            github: GitHubConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;

    #[test]
    fn test_lookup_overrides_and_token() {
        let config = GitHubConfig::from_lookup(|key| match key {
            "GITPULL_WEB_URL" => Some("http://mirror.local/github".to_string()),
            "GITHUB_TOKEN" => Some(" ghp_secret \n".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.api_url.as_str(), "https://api.github.com/");
        assert_eq!(config.web_url.as_str(), "http://mirror.local/github");
        assert_eq!(config.token.as_deref(), Some("ghp_secret"));
        assert!(config.user_agent.starts_with("gitpull/"));
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let config = GitHubConfig::from_lookup(|_| Some("   ".to_string())).unwrap();
        assert_eq!(config, GitHubConfig::default());
    }

    #[test]
    fn test_invalid_url_is_config_error() {
        let result = GitHubConfig::from_lookup(|key| {
            (key == "GITPULL_API_URL").then(|| "not a url".to_string())
        });
        match result {
            Err(Error::Config(ConfigError::InvalidValue { option, .. })) => {
                assert_eq!(option, "GITPULL_API_URL")
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = GitHubConfig {
            token: Some("ghp_secret".to_string()),
            ..GitHubConfig::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("ghp_secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_target_dir_per_mode() {
        let reference = RepositoryReference::new("octo", "demo").unwrap();
        let mut config = Config::new_for_test();
        config.directory = PathBuf::from("/work");

        assert_eq!(config.target_dir(), PathBuf::from("/work"));
        config.mode = Mode::Clone(reference.clone());
        assert_eq!(config.target_dir(), PathBuf::from("/work/demo"));
        config.mode = Mode::Init(reference);
        assert_eq!(config.target_dir(), PathBuf::from("/work"));
    }
}
