//! `gitpull` is a library and command-line tool for mirroring the latest state
//! of a GitHub repository into a local directory over plain HTTPS, for networks
//! where `git` traffic is blocked.
//!
//! A run moves through three stages:
//! 1.  **Resolve**: work out the repository (argument, `.gitpull` record, or the
//!     origin of a local `.git` checkout), the branch, and its latest commit.
//! 2.  **Compare**: check the commit against the `.gitpull.version` record; if
//!     they match, stop without touching anything.
//! 3.  **Materialize**: download the branch snapshot (zip archive, or file by
//!     file via the trees/blobs API) into the target, then rewrite the records.
//!
//! The remote sits behind the [`Remote`](github::Remote) trait, so the whole
//! flow can be driven against the in-memory [`MockRemote`](github::MockRemote).
//!
//! # Example: Library Usage
//!
//! ```
//! use gitpull::config::{ConfigBuilder, GitHubConfig};
//! use gitpull::github::MockRemote;
//! use gitpull::prompt::TerminalPrompter;
//! use gitpull::{execute, CancellationToken, RunOutcome};
//! use std::io::{Cursor, Write};
//!
//! // 1. An archive as GitHub would serve it: everything under one top-level folder.
//! let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
//! zip.start_file("demo-main/README.md", zip::write::SimpleFileOptions::default())
//!     .unwrap();
//! zip.write_all(b"# demo\n").unwrap();
//! let archive = zip.finish().unwrap().into_inner();
//!
//! let remote = MockRemote::new()
//!     .with_branches(&["main"])
//!     .with_commit("main", "0123456789abcdef0123456789abcdef01234567")
//!     .with_archive("main", archive);
//!
//! // 2. Clone `octo/demo` into a temporary directory.
//! let workdir = tempfile::tempdir().unwrap();
//! let config = ConfigBuilder::new()
//!     .repo("octo/demo")
//!     .directory(workdir.path().to_str().unwrap())
//!     .github(GitHubConfig::default())
//!     .build()
//!     .unwrap();
//!
//! let prompter = TerminalPrompter::new(Cursor::new(Vec::new()), Vec::new());
//! let token = CancellationToken::new();
//! let outcome = execute(&config, &remote, &prompter, None, &token).unwrap();
//!
//! // 3. The snapshot and both records are on disk.
//! let target = workdir.path().join("demo");
//! assert!(matches!(outcome, RunOutcome::Synced(_)));
//! assert_eq!(std::fs::read_to_string(target.join("README.md")).unwrap(), "# demo\n");
//! assert_eq!(
//!     std::fs::read_to_string(target.join(".gitpull")).unwrap(),
//!     "https://github.com/octo/demo\n"
//! );
//! ```

pub mod cancellation;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod github;
pub mod local;
pub mod materialize;
pub mod prelude;
pub mod progress;
pub mod prompt;
pub mod signal;
pub mod state;
pub mod sync;

// Re-export key public types for easier use as a library
pub use cancellation::CancellationToken;
pub use config::{Config, ConfigBuilder, Mode};
pub use errors::{Error, Result};

use crate::github::{parse_remote_url, parse_repo_arg, GitHubClient, Remote, RepositoryReference};
use crate::progress::{NoOpProgress, ProgressReporter};
use crate::prompt::{Prompter, TerminalPrompter};
use crate::state::{FsStateStore, StateStore};
use crate::sync::{resolve_reference, SyncReport, SyncRequest, Syncer};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What a completed run did.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// `--init` recorded the origin of `directory`.
    Initialized {
        reference: RepositoryReference,
        directory: PathBuf,
    },
    /// A sync ran; the report tells whether anything was downloaded.
    Synced(SyncReport),
}

/// Runs `gitpull` as the command line does: against the GitHub API, asking
/// questions on the terminal.
///
/// # Arguments
/// * `config` - The configuration for the entire run.
/// * `token` - Cancelled when the user presses Ctrl+C.
/// * `progress` - An optional progress bar for downloads and extraction.
pub fn run(
    config: &Config,
    token: &CancellationToken,
    progress: Option<Arc<dyn ProgressReporter>>,
) -> Result<RunOutcome> {
    let client = GitHubClient::new(&config.github)?;
    let prompter = TerminalPrompter::stdio().with_cancellation(token.clone());
    execute(config, &client, &prompter, progress, token)
}

/// Runs `gitpull` against any [`Remote`] and [`Prompter`].
///
/// This is the primary entry point for running the tool's logic programmatically.
///
/// # Errors
/// * [`Error::LocalStateError`] when cloning into a path that is not a
///   directory or that already mirrors a different repository, or when an
///   update finds no repository to pull.
/// * Any error of the sync stages, unchanged.
pub fn execute(
    config: &Config,
    remote: &dyn Remote,
    prompter: &dyn Prompter,
    progress: Option<Arc<dyn ProgressReporter>>,
    token: &CancellationToken,
) -> Result<RunOutcome> {
    let progress: Arc<dyn ProgressReporter> = progress.unwrap_or_else(|| Arc::new(NoOpProgress));
    let result = execute_mode(config, remote, prompter, &*progress, token);
    progress.clear();
    result
}

fn execute_mode(
    config: &Config,
    remote: &dyn Remote,
    prompter: &dyn Prompter,
    progress: &dyn ProgressReporter,
    token: &CancellationToken,
) -> Result<RunOutcome> {
    let target = config.target_dir();
    let store = FsStateStore::new(&target);

    let reference = match &config.mode {
        Mode::Init(reference) => {
            store.write_origin(&reference.canonical_url())?;
            log::info!("Recorded {} as the origin of {}", reference, target.display());
            return Ok(RunOutcome::Initialized {
                reference: reference.clone(),
                directory: target,
            });
        }
        Mode::Clone(reference) => {
            check_clone_target(&target, &store, reference)?;
            reference.clone()
        }
        Mode::Update => resolve_reference(&target, &store, prompter)?,
    };

    let request = SyncRequest {
        reference,
        branch: config.branch.clone(),
        transfer: config.transfer,
        target,
    };
    let report = Syncer::new(remote, prompter, progress, token).sync(&request, &store)?;
    Ok(RunOutcome::Synced(report))
}

/// A clone target may be missing, or an existing directory mirroring the same repository.
fn check_clone_target(
    target: &Path,
    store: &FsStateStore,
    reference: &RepositoryReference,
) -> Result<()> {
    if !target.exists() {
        return Ok(());
    }
    if !target.is_dir() {
        return Err(Error::LocalStateError(format!(
            "'{}' already exists and is not a directory",
            target.display()
        )));
    }
    if let Some(origin) = store.read_origin()? {
        let existing = parse_remote_url(&origin).or_else(|_| parse_repo_arg(&origin))?;
        if &existing != reference {
            return Err(Error::LocalStateError(format!(
                "Directory '{}' already mirrors {}, not {}",
                target.display(),
                existing,
                reference
            )));
        }
    }
    log::info!("Directory '{}' exists; updating it in place", target.display());
    Ok(())
}
