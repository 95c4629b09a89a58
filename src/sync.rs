//! The reconciliation driver: decides whether a target is up to date and, if not, mirrors the branch into it.
//!
//! A run resolves a repository, a branch and that branch's latest commit, then
//! compares the commit with the stored last-commit record:
//!
//! * equal: [`SyncState::UpToDate`], nothing is fetched and nothing is written;
//! * absent: [`SyncState::Uninitialized`], different: [`SyncState::UpdateAvailable`];
//!   both materialize the snapshot and, only on success, rewrite the origin
//!   and last-commit records, ending in [`SyncState::Synced`].

use crate::cancellation::CancellationToken;
use crate::constants::SHORT_SHA_LEN;
use crate::errors::{Error, Result};
use crate::github::{parse_remote_url, parse_repo_arg, Remote, RepositoryReference};
use crate::local;
use crate::materialize::{materialize, MaterializeStats, TransferMethod};
use crate::progress::ProgressReporter;
use crate::prompt::Prompter;
use crate::state::StateStore;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Where a target stands relative to the remote branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No commit has been recorded yet.
    Uninitialized,
    /// The recorded commit is the branch's latest commit.
    UpToDate,
    /// The branch moved since the recorded commit.
    UpdateAvailable,
    /// The snapshot was written and both records were updated.
    Synced,
}

/// Compares the recorded commit with the freshly resolved one.
///
/// ```
/// use gitpull::sync::{assess, SyncState};
///
/// assert_eq!(assess(None, "abc"), SyncState::Uninitialized);
/// assert_eq!(assess(Some("abc"), "abc"), SyncState::UpToDate);
/// assert_eq!(assess(Some("abc"), "def"), SyncState::UpdateAvailable);
/// ```
pub fn assess(previous: Option<&str>, current: &str) -> SyncState {
    match previous {
        None => SyncState::Uninitialized,
        Some(previous) if previous == current => SyncState::UpToDate,
        Some(_) => SyncState::UpdateAvailable,
    }
}

/// The abbreviated form of a commit identifier, for display only.
pub fn short_sha(sha: &str) -> &str {
    sha.get(..SHORT_SHA_LEN).unwrap_or(sha)
}

/// What to sync and where.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub reference: RepositoryReference,
    /// An explicit branch; `None` lets the driver choose.
    pub branch: Option<String>,
    pub transfer: TransferMethod,
    pub target: PathBuf,
}

/// The outcome of one sync run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub reference: RepositoryReference,
    pub branch: String,
    /// The commit recorded before this run.
    pub previous: Option<String>,
    /// The branch's latest commit, now recorded.
    pub commit: String,
    /// [`SyncState::UpToDate`] or [`SyncState::Synced`].
    pub state: SyncState,
    /// Present when a snapshot was written.
    pub stats: Option<MaterializeStats>,
}

impl SyncReport {
    pub fn short_commit(&self) -> &str {
        short_sha(&self.commit)
    }

    pub fn short_previous(&self) -> Option<&str> {
        self.previous.as_deref().map(short_sha)
    }
}

/// Runs syncs against one remote, asking `prompter` when a choice is needed.
pub struct Syncer<'a> {
    remote: &'a dyn Remote,
    prompter: &'a dyn Prompter,
    progress: &'a dyn ProgressReporter,
    token: &'a CancellationToken,
}

impl<'a> Syncer<'a> {
    pub fn new(
        remote: &'a dyn Remote,
        prompter: &'a dyn Prompter,
        progress: &'a dyn ProgressReporter,
        token: &'a CancellationToken,
    ) -> Self {
        Self {
            remote,
            prompter,
            progress,
            token,
        }
    }

    /// Chooses the branch to pull.
    ///
    /// An explicit branch is used as given, without listing branches. Otherwise
    /// the user picks when the repository has several branches; a single branch
    /// is taken as is, and an empty listing falls back to the default branch.
    ///
    /// # Errors
    /// [`Error::Aborted`] if the user quits the branch menu.
    pub fn resolve_branch(
        &self,
        reference: &RepositoryReference,
        explicit: Option<&str>,
    ) -> Result<String> {
        if let Some(branch) = explicit {
            log::debug!("Using branch from the command line: {}", branch);
            return Ok(branch.to_string());
        }

        let default = self.remote.default_branch(reference)?;
        log::info!("Default branch: {}", default);
        let branches = self.remote.list_branches(reference)?;
        match branches.len() {
            0 => Ok(default),
            1 => Ok(branches.into_iter().next().unwrap_or(default)),
            _ => self
                .prompter
                .select_branch(&branches, &default)?
                .ok_or(Error::Aborted),
        }
    }

    /// Brings the target described by `request` up to date, recording the result in `store`.
    ///
    /// A failure before the records are rewritten leaves them untouched, so the
    /// next run starts from the same recorded state.
    #[instrument(level = "debug", skip(self, request, store), fields(repo = %request.reference, target = %request.target.display()))]
    pub fn sync(&self, request: &SyncRequest, store: &dyn StateStore) -> Result<SyncReport> {
        self.token.check()?;
        let reference = &request.reference;
        log::info!("Repository: {}", reference);

        let branch = self.resolve_branch(reference, request.branch.as_deref())?;
        self.token.check()?;
        let commit = self.remote.latest_commit(reference, &branch)?;
        self.token.check()?;
        let previous = store.read_last_commit()?;

        let mut report = SyncReport {
            reference: reference.clone(),
            branch,
            previous,
            commit,
            state: SyncState::UpToDate,
            stats: None,
        };

        match assess(report.previous.as_deref(), &report.commit) {
            SyncState::UpToDate => {
                log::info!(
                    "Already up to date at {} ({})",
                    report.short_commit(),
                    report.branch
                );
                return Ok(report);
            }
            SyncState::UpdateAvailable => log::info!(
                "Upgrading: {} -> {}",
                report.short_previous().unwrap_or_default(),
                report.short_commit()
            ),
            SyncState::Uninitialized | SyncState::Synced => log::info!(
                "Pulling {} at {}",
                report.branch,
                report.short_commit()
            ),
        }

        let stats = materialize(
            self.remote,
            reference,
            &report.branch,
            request.transfer,
            &request.target,
            self.progress,
            self.token,
        )?;
        self.token.check()?;

        store.write_origin(&reference.canonical_url())?;
        store.write_last_commit(&report.commit)?;

        report.state = SyncState::Synced;
        report.stats = Some(stats);
        Ok(report)
    }
}

/// Works out which repository an existing directory mirrors.
///
/// Sources, in order: the stored origin record, the origin remote of a local
/// `.git` checkout, then the prompter.
///
/// # Errors
/// * [`Error::InvalidReference`] if the chosen source does not name a repository.
/// * [`Error::LocalStateError`] if no source yields an answer.
pub fn resolve_reference(
    dir: &Path,
    store: &dyn StateStore,
    prompter: &dyn Prompter,
) -> Result<RepositoryReference> {
    if let Some(origin) = store.read_origin()? {
        log::debug!("Using stored origin: {}", origin);
        return parse_remote_url(&origin).or_else(|_| parse_repo_arg(&origin));
    }

    if local::has_vcs_dir(dir) {
        log::info!("Reading git config...");
        let url = local::origin_url(dir)?;
        log::info!("Remote URL: {}", url);
        return parse_remote_url(&url);
    }

    match prompter.ask_repository()? {
        Some(answer) => parse_repo_arg(&answer),
        None => Err(Error::LocalStateError(format!(
            "No repository to pull into '{}': no origin record, no .git directory, and no repository given.\n\
             Provide one: gitpull owner/repo, or gitpull --init owner/repo",
            dir.display()
        ))),
    }
}
