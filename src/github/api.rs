//! The remote collaborator surface: repository metadata, branches, commits,
//! archives, trees and blobs.
//!
//! [`Remote`] is the seam between the sync driver and the hosting API. The
//! production implementation is [`GitHubClient`](super::GitHubClient); tests use
//! [`MockRemote`](super::MockRemote).

use super::url::RepositoryReference;
use crate::constants::BRANCHES_PER_PAGE;
use crate::errors::{Error, Result};
use crate::materialize::is_vcs_metadata;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use std::io::Read;

/// A file in a branch snapshot, as listed by the recursive tree endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileEntry {
    /// Path relative to the repository root, `/`-separated.
    pub path: String,
    /// Blob identifier used to fetch the content.
    pub content_id: String,
}

/// Read operations against the hosting API.
///
/// All operations are idempotent and side-effect free on the remote. They share
/// one failure classification: HTTP 404 is [`Error::NotFound`], any other
/// non-success status is [`Error::RemoteError`], and a transport failure is
/// [`Error::NetworkError`].
pub trait Remote: Send + Sync {
    /// Resolves the repository's default branch name.
    fn default_branch(&self, repo: &RepositoryReference) -> Result<String>;

    /// Fetches one page (1-based) of branch names.
    fn branch_page(&self, repo: &RepositoryReference, page: u32) -> Result<Vec<String>>;

    /// The number of branches a full page holds. A shorter page ends pagination.
    fn page_size(&self) -> usize {
        BRANCHES_PER_PAGE
    }

    /// Lists every branch, following pagination, in the order received.
    fn list_branches(&self, repo: &RepositoryReference) -> Result<Vec<String>> {
        let mut branches = Vec::new();
        for page in BranchPages::new(self, repo) {
            branches.extend(page?);
        }
        Ok(branches)
    }

    /// Resolves a branch to the full identifier of its latest commit.
    fn latest_commit(&self, repo: &RepositoryReference, branch: &str) -> Result<String>;

    /// Opens a streaming download of the branch snapshot as a zip archive.
    fn open_archive(
        &self,
        repo: &RepositoryReference,
        branch: &str,
    ) -> Result<Box<dyn Read + Send>>;

    /// Lists every file of the branch snapshot, excluding version-control metadata.
    fn file_tree(&self, repo: &RepositoryReference, branch: &str) -> Result<Vec<RemoteFileEntry>>;

    /// Fetches the raw bytes of a blob.
    fn blob(&self, repo: &RepositoryReference, content_id: &str) -> Result<Vec<u8>>;
}

/// A lazy, finite sequence of branch pages.
///
/// Each call to `next` requests one page. The sequence ends after the first page
/// shorter than [`Remote::page_size`], or at an empty page, or after yielding an
/// error. Restarting means building a new `BranchPages`.
pub struct BranchPages<'a, R: Remote + ?Sized> {
    remote: &'a R,
    repo: &'a RepositoryReference,
    next_page: u32,
    done: bool,
}

impl<'a, R: Remote + ?Sized> BranchPages<'a, R> {
    /// Starts at page 1.
    pub fn new(remote: &'a R, repo: &'a RepositoryReference) -> Self {
        Self {
            remote,
            repo,
            next_page: 1,
            done: false,
        }
    }
}

impl<R: Remote + ?Sized> Iterator for BranchPages<'_, R> {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let page = self.next_page;
        log::debug!("Fetching branch page {} for {}", page, self.repo);
        match self.remote.branch_page(self.repo, page) {
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
            Ok(names) if names.is_empty() => {
                self.done = true;
                None
            }
            Ok(names) => {
                if names.len() < self.remote.page_size() {
                    self.done = true;
                }
                self.next_page += 1;
                Some(Ok(names))
            }
        }
    }
}

/// One item of the recursive tree listing.
#[derive(Deserialize, Debug)]
pub(crate) struct TreeItem {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: String,
}

/// Keeps the blobs of a tree listing and drops version-control metadata.
pub(crate) fn snapshot_files(items: Vec<TreeItem>) -> Vec<RemoteFileEntry> {
    items
        .into_iter()
        .filter(|item| item.kind == "blob" && !is_vcs_metadata(&item.path))
        .map(|item| RemoteFileEntry {
            path: item.path,
            content_id: item.sha,
        })
        .collect()
}

/// Decodes the `content` field of a blob response according to its `encoding`.
///
/// Base64 content from the API is wrapped with newlines; whitespace is ignored.
pub(crate) fn decode_blob(content: &str, encoding: &str) -> std::result::Result<Vec<u8>, String> {
    match encoding {
        "base64" => {
            let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
            STANDARD
                .decode(compact.as_bytes())
                .map_err(|e| format!("invalid base64 blob content: {}", e))
        }
        "utf-8" | "utf8" => Ok(content.as_bytes().to_vec()),
        other => Err(format!("unsupported blob encoding '{}'", other)),
    }
}

/// Builds the `MalformedResponse` error for a payload we could not use.
pub(crate) fn malformed(url: impl ToString, reason: impl ToString) -> Error {
    Error::MalformedResponse {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{MockFailure, MockOp, MockRemote};

    fn demo() -> RepositoryReference {
        RepositoryReference::new("octo", "demo").unwrap()
    }

    fn names(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{}-{}", prefix, i)).collect()
    }

    #[test]
    fn test_pagination_stops_on_short_page_and_keeps_order() {
        let remote = MockRemote::new().with_page_size(3);
        remote.set_branch_pages(vec![names("a", 3), names("b", 3), names("c", 1)]);

        let branches = remote.list_branches(&demo()).unwrap();
        let mut expected = names("a", 3);
        expected.extend(names("b", 3));
        expected.extend(names("c", 1));
        assert_eq!(branches, expected);
        assert_eq!(remote.call_count(MockOp::BranchPage), 3);
    }

    #[test]
    fn test_pagination_stops_on_empty_page() {
        let remote = MockRemote::new().with_page_size(2);
        remote.set_branch_pages(vec![names("a", 2), vec![]]);

        let branches = remote.list_branches(&demo()).unwrap();
        assert_eq!(branches, names("a", 2));
        assert_eq!(remote.call_count(MockOp::BranchPage), 2);
    }

    #[test]
    fn test_branch_pages_is_lazy_and_restartable() {
        let remote = MockRemote::new().with_page_size(2);
        remote.set_branch_pages(vec![names("a", 2), names("b", 2), names("c", 0)]);
        let repo = demo();

        let mut pages = BranchPages::new(&remote, &repo);
        assert_eq!(pages.next().unwrap().unwrap(), names("a", 2));
        assert_eq!(remote.call_count(MockOp::BranchPage), 1);

        let restarted: Vec<_> = BranchPages::new(&remote, &repo)
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(restarted, vec![names("a", 2), names("b", 2)]);
    }

    #[test]
    fn test_pagination_error_ends_sequence() {
        let remote = MockRemote::new();
        remote.fail_on(
            MockOp::BranchPage,
            MockFailure::NotFound("Repository octo/demo".to_string()),
        );
        let repo = demo();

        let mut pages = BranchPages::new(&remote, &repo);
        assert!(matches!(pages.next(), Some(Err(Error::NotFound(_)))));
        assert!(pages.next().is_none());
    }

    #[test]
    fn test_snapshot_files_keeps_blobs_outside_git_dir() {
        let item = |path: &str, kind: &str| TreeItem {
            path: path.to_string(),
            kind: kind.to_string(),
            sha: format!("sha-{}", path),
        };
        let files = snapshot_files(vec![
            item("src", "tree"),
            item("src/lib.rs", "blob"),
            item(".git", "tree"),
            item(".git/config", "blob"),
            item(".gitignore", "blob"),
            item("vendor/sub", "commit"),
        ]);
        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["src/lib.rs", ".gitignore"]);
        assert_eq!(files[0].content_id, "sha-src/lib.rs");
    }

    #[test]
    fn test_decode_blob_handles_wrapped_base64() {
        // "hello\nworld\n" split across lines the way the API wraps it.
        let content = "aGVsbG8K\nd29ybGQK\n";
        assert_eq!(decode_blob(content, "base64").unwrap(), b"hello\nworld\n");
    }

    #[test]
    fn test_decode_blob_preserves_binary_bytes() {
        let bytes = [0u8, 255, 13, 10, 128];
        let encoded = STANDARD.encode(bytes);
        assert_eq!(decode_blob(&encoded, "base64").unwrap(), bytes);
    }

    #[test]
    fn test_decode_blob_rejects_unknown_encoding() {
        assert_eq!(decode_blob("abc", "utf-8").unwrap(), b"abc");
        assert!(decode_blob("abc", "rot13").is_err());
        assert!(decode_blob("!!!", "base64").is_err());
    }
}
