use super::{
    path_resolve::resolve_directory, validation::validate_builder_options, Config, GitHubConfig,
    Mode,
};
use crate::cli::Cli;
use crate::errors::Result;
use crate::github::parse_repo_arg;
use crate::materialize::TransferMethod;

/// A builder for creating a [`Config`] programmatically.
///
/// # Examples
///
/// ```
/// use gitpull::config::{ConfigBuilder, GitHubConfig, Mode};
///
/// let dir = tempfile::tempdir().unwrap();
/// let config = ConfigBuilder::new()
///     .repo("https://github.com/octo/demo.git")
///     .branch("dev")
///     .directory(dir.path().to_str().unwrap())
///     .github(GitHubConfig::default())
///     .build()
///     .unwrap();
///
/// assert!(matches!(config.mode, Mode::Clone(ref r) if r.to_string() == "octo/demo"));
/// assert_eq!(config.branch.as_deref(), Some("dev"));
/// assert!(config.target_dir().ends_with("demo"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    pub(super) repo: Option<String>,
    pub(super) init: Option<String>,
    pub(super) branch: Option<String>,
    pub(super) fallback: Option<bool>,
    pub(super) directory: Option<String>,
    pub(super) github: Option<GitHubConfig>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder pre-populated with the parsed command line.
    pub fn from_cli(cli: Cli) -> Self {
        Self {
            repo: cli.repo,
            init: cli.init,
            branch: cli.branch,
            fallback: Some(cli.fallback),
            directory: Some(cli.dir),
            github: None,
        }
    }

    /// The repository to clone into `<directory>/<name>`.
    pub fn repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = Some(repo.into());
        self
    }

    /// The repository to record in the directory without syncing.
    pub fn init(mut self, repo: impl Into<String>) -> Self {
        self.init = Some(repo.into());
        self
    }

    /// An explicit branch. `?` means "choose for me".
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Uses the per-file transfer instead of the archive.
    pub fn fallback(mut self, fallback: bool) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Overrides the API settings. When unset they are read from the environment.
    pub fn github(mut self, github: GitHubConfig) -> Self {
        self.github = Some(github);
        self
    }

    /// Validates the options and produces the final [`Config`].
    ///
    /// # Errors
    /// * [`Error::Config`](crate::errors::Error::Config) for conflicting options,
    ///   an unusable directory or a malformed API URL.
    /// * [`Error::InvalidReference`](crate::errors::Error::InvalidReference) for
    ///   a repository that cannot be parsed.
    pub fn build(self) -> Result<Config> {
        validate_builder_options(&self)?;

        let mode = match (&self.init, &self.repo) {
            (Some(init), _) => Mode::Init(parse_repo_arg(init)?),
            (None, Some(repo)) => Mode::Clone(parse_repo_arg(repo)?),
            (None, None) => Mode::Update,
        };

        let branch = self
            .branch
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty() && b != "?");

        let transfer = if self.fallback.unwrap_or(false) {
            TransferMethod::PerFile
        } else {
            TransferMethod::Archive
        };

        let directory = resolve_directory(self.directory.as_deref().unwrap_or("."))?;

        let github = match self.github {
            Some(github) => github,
            None => GitHubConfig::from_env()?,
        };

        Ok(Config {
            mode,
            branch,
            transfer,
            directory,
            github,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ConfigError, Error};
    use clap::Parser;
    use tempfile::tempdir;

    fn builder_in(dir: &std::path::Path) -> ConfigBuilder {
        ConfigBuilder::new()
            .directory(dir.to_str().unwrap())
            .github(GitHubConfig::default())
    }

    #[test]
    fn test_defaults_to_update_mode_with_archive() {
        let temp = tempdir().unwrap();
        let config = builder_in(temp.path()).build().unwrap();

        assert_eq!(config.mode, Mode::Update);
        assert_eq!(config.transfer, TransferMethod::Archive);
        assert_eq!(config.branch, None);
        assert!(config.directory.is_absolute());
        assert_eq!(config.target_dir(), config.directory);
    }

    #[test]
    fn test_question_mark_branch_means_none() {
        let temp = tempdir().unwrap();
        let config = builder_in(temp.path()).branch("?").build().unwrap();
        assert_eq!(config.branch, None);

        let config = builder_in(temp.path()).branch(" dev ").build().unwrap();
        assert_eq!(config.branch.as_deref(), Some("dev"));
    }

    #[test]
    fn test_from_cli_maps_every_option() {
        let temp = tempdir().unwrap();
        let dir = temp.path().to_str().unwrap();
        let cli = Cli::parse_from([
            "gitpull",
            "octo/demo",
            "--branch",
            "feature/x",
            "--fallback",
            "--dir",
            dir,
        ]);

        let config = ConfigBuilder::from_cli(cli)
            .github(GitHubConfig::default())
            .build()
            .unwrap();

        assert!(matches!(config.mode, Mode::Clone(ref r) if r.name() == "demo"));
        assert_eq!(config.branch.as_deref(), Some("feature/x"));
        assert_eq!(config.transfer, TransferMethod::PerFile);
        assert!(config.target_dir().ends_with("demo"));
    }

    #[test]
    fn test_init_mode() {
        let temp = tempdir().unwrap();
        let config = builder_in(temp.path())
            .init("github.com/octo/demo")
            .build()
            .unwrap();
        assert!(matches!(config.mode, Mode::Init(ref r) if r.owner() == "octo"));
    }

    #[test]
    fn test_init_conflicts_with_repo() {
        let temp = tempdir().unwrap();
        let result = builder_in(temp.path())
            .init("octo/demo")
            .repo("octo/demo")
            .build();
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::Conflict { .. }))
        ));
    }

    #[test]
    fn test_invalid_repo_is_invalid_reference() {
        let temp = tempdir().unwrap();
        let result = builder_in(temp.path()).repo("not-a-repo").build();
        assert!(matches!(result, Err(Error::InvalidReference { .. })));
    }

    #[test]
    fn test_missing_directory_is_rejected() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("nope");
        let result = builder_in(&missing).build();
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue { .. }))
        ));
    }
}
