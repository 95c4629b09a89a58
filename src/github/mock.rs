//! Mock remote implementation for deterministic testing.
//!
//! The mock stores branches, commits, archives and blobs in memory, records every
//! call it receives, and can be told to fail a given operation.
//!
//! # Example
//!
//! ```
//! use gitpull::github::{MockRemote, Remote, RepositoryReference};
//!
//! let remote = MockRemote::new()
//!     .with_default_branch("main")
//!     .with_branches(&["main", "dev"])
//!     .with_commit("dev", "0123456789abcdef0123456789abcdef01234567");
//!
//! let repo = RepositoryReference::new("octo", "demo").unwrap();
//! assert_eq!(remote.default_branch(&repo).unwrap(), "main");
//! assert_eq!(remote.list_branches(&repo).unwrap(), vec!["main", "dev"]);
//! assert!(remote.latest_commit(&repo, "dev").unwrap().starts_with("0123"));
//! assert!(remote.latest_commit(&repo, "gone").is_err());
//! ```

use super::api::{Remote, RemoteFileEntry};
use super::url::RepositoryReference;
use crate::constants::BRANCHES_PER_PAGE;
use crate::errors::{Error, Result};
use crate::materialize::is_vcs_metadata;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex, MutexGuard};

/// Operations of the [`Remote`] trait, used to select failures and count calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    DefaultBranch,
    BranchPage,
    LatestCommit,
    OpenArchive,
    FileTree,
    Blob,
}

/// A failure the mock should produce, convertible into an [`Error`].
#[derive(Debug, Clone)]
pub enum MockFailure {
    NotFound(String),
    Status(u16),
    Network(String),
}

impl MockFailure {
    fn to_error(&self) -> Error {
        match self {
            MockFailure::NotFound(what) => Error::NotFound(what.clone()),
            MockFailure::Status(status) => Error::RemoteError {
                status: *status,
                reason: "mock failure".to_string(),
            },
            MockFailure::Network(msg) => Error::NetworkError(msg.clone()),
        }
    }
}

/// Mock remote for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone)]
pub struct MockRemote {
    inner: Arc<Mutex<MockRemoteInner>>,
    page_size: usize,
}

#[derive(Debug, Default)]
struct MockRemoteInner {
    default_branch: String,
    branch_pages: Vec<Vec<String>>,
    commits: HashMap<String, String>,
    archives: HashMap<String, Vec<u8>>,
    trees: HashMap<String, Vec<RemoteFileEntry>>,
    blobs: HashMap<String, Vec<u8>>,
    failures: HashMap<MockOp, MockFailure>,
    calls: Vec<(MockOp, String)>,
}

impl Default for MockRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRemote {
    /// Creates an empty mock whose default branch is `main`.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockRemoteInner {
                default_branch: "main".to_string(),
                ..Default::default()
            })),
            page_size: BRANCHES_PER_PAGE,
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockRemoteInner> {
        // A panic in another test thread must not hide this test's assertions.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Overrides the page size used for branch pagination.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the default branch name.
    pub fn with_default_branch(self, branch: &str) -> Self {
        self.lock().default_branch = branch.to_string();
        self
    }

    /// Serves `branches`, split into pages of the configured size.
    pub fn with_branches(self, branches: &[&str]) -> Self {
        let pages = branches
            .chunks(self.page_size.max(1))
            .map(|chunk| chunk.iter().map(|s| s.to_string()).collect())
            .collect();
        self.set_branch_pages(pages);
        self
    }

    /// Sets the commit a branch resolves to.
    pub fn with_commit(self, branch: &str, sha: &str) -> Self {
        self.set_commit(branch, sha);
        self
    }

    /// Sets the archive bytes served for a branch.
    pub fn with_archive(self, branch: &str, bytes: Vec<u8>) -> Self {
        self.lock().archives.insert(branch.to_string(), bytes);
        self
    }

    /// Adds a file to a branch's tree listing, served through the blob endpoint.
    pub fn with_file(self, branch: &str, path: &str, content: &[u8]) -> Self {
        {
            let mut inner = self.lock();
            let content_id = format!("blob-{}-{}", branch, path);
            inner.blobs.insert(content_id.clone(), content.to_vec());
            inner
                .trees
                .entry(branch.to_string())
                .or_default()
                .push(RemoteFileEntry {
                    path: path.to_string(),
                    content_id,
                });
        }
        self
    }

    /// Replaces the branch pages served, page 1 first.
    pub fn set_branch_pages(&self, pages: Vec<Vec<String>>) {
        self.lock().branch_pages = pages;
    }

    /// Moves a branch to a new commit.
    pub fn set_commit(&self, branch: &str, sha: &str) {
        self.lock()
            .commits
            .insert(branch.to_string(), sha.to_string());
    }

    /// Makes every subsequent call of `op` fail.
    pub fn fail_on(&self, op: MockOp, failure: MockFailure) {
        self.lock().failures.insert(op, failure);
    }

    /// Every call received so far, with its main argument.
    pub fn calls(&self) -> Vec<(MockOp, String)> {
        self.lock().calls.clone()
    }

    /// Number of calls received for `op`.
    pub fn call_count(&self, op: MockOp) -> usize {
        self.lock().calls.iter().filter(|(o, _)| *o == op).count()
    }

    fn record(&self, op: MockOp, arg: impl Into<String>) -> Result<MutexGuard<'_, MockRemoteInner>> {
        let mut inner = self.lock();
        inner.calls.push((op, arg.into()));
        if let Some(failure) = inner.failures.get(&op).cloned() {
            return Err(failure.to_error());
        }
        Ok(inner)
    }
}

impl Remote for MockRemote {
    fn default_branch(&self, repo: &RepositoryReference) -> Result<String> {
        let inner = self.record(MockOp::DefaultBranch, repo.to_string())?;
        Ok(inner.default_branch.clone())
    }

    fn branch_page(&self, _repo: &RepositoryReference, page: u32) -> Result<Vec<String>> {
        let inner = self.record(MockOp::BranchPage, page.to_string())?;
        Ok(inner
            .branch_pages
            .get(page.saturating_sub(1) as usize)
            .cloned()
            .unwrap_or_default())
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    fn latest_commit(&self, repo: &RepositoryReference, branch: &str) -> Result<String> {
        let inner = self.record(MockOp::LatestCommit, branch)?;
        inner
            .commits
            .get(branch)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Branch {} in {}", branch, repo)))
    }

    fn open_archive(
        &self,
        repo: &RepositoryReference,
        branch: &str,
    ) -> Result<Box<dyn Read + Send>> {
        let inner = self.record(MockOp::OpenArchive, branch)?;
        let bytes = inner
            .archives
            .get(branch)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Archive for {}@{}", repo, branch)))?;
        Ok(Box::new(Cursor::new(bytes)))
    }

    fn file_tree(&self, repo: &RepositoryReference, branch: &str) -> Result<Vec<RemoteFileEntry>> {
        let inner = self.record(MockOp::FileTree, branch)?;
        let files = inner
            .trees
            .get(branch)
            .ok_or_else(|| Error::NotFound(format!("Repository or branch {}@{}", repo, branch)))?;
        Ok(files
            .iter()
            .filter(|entry| !is_vcs_metadata(&entry.path))
            .cloned()
            .collect())
    }

    fn blob(&self, _repo: &RepositoryReference, content_id: &str) -> Result<Vec<u8>> {
        let inner = self.record(MockOp::Blob, content_id)?;
        inner
            .blobs
            .get(content_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Blob {}", content_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_tree_leaves_out_git_metadata() {
        let remote = MockRemote::new()
            .with_file("main", "README.md", b"hi")
            .with_file("main", ".git/config", b"[core]")
            .with_file("main", ".github/ci.yml", b"on: push");
        let repo = RepositoryReference::new("octo", "demo").unwrap();

        let paths: Vec<String> = remote
            .file_tree(&repo, "main")
            .unwrap()
            .into_iter()
            .map(|entry| entry.path)
            .collect();

        assert_eq!(paths, vec!["README.md", ".github/ci.yml"]);
    }
}
