//! Writes a branch snapshot into a target directory.
//!
//! Two transfer paths exist:
//! 1.  **Archive**: download the branch as one zip archive and extract it
//!     ([`extract_archive`]).
//! 2.  **Per-file**: list the branch tree and fetch every blob individually
//!     ([`materialize_files`]). Used when archive downloads are blocked.
//!
//! Both treat the target as a pure mirror: existing files are overwritten
//! unconditionally and nothing is ever deleted.

use crate::cancellation::CancellationToken;
use crate::constants::{DOWNLOAD_CHUNK_SIZE, VCS_DIR};
use crate::errors::{io_error_with_path, Error, Result};
use crate::github::{Remote, RepositoryReference};
use crate::progress::ProgressReporter;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Component, Path, PathBuf};
use tracing::instrument;

mod archive;
mod per_file;

pub use archive::extract_archive;
pub use per_file::materialize_files;

/// How the snapshot is transferred from the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferMethod {
    /// One zip archive for the whole branch.
    #[default]
    Archive,
    /// One request per file through the trees/blobs API.
    PerFile,
}

/// Counts reported after a snapshot has been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaterializeStats {
    pub files_written: usize,
    pub entries_skipped: usize,
}

/// Returns `true` for the version-control metadata folder and anything inside it.
///
/// ```
/// use gitpull::materialize::is_vcs_metadata;
///
/// assert!(is_vcs_metadata(".git"));
/// assert!(is_vcs_metadata(".git/config"));
/// assert!(!is_vcs_metadata(".gitignore"));
/// assert!(!is_vcs_metadata("src/.git-notes"));
/// ```
pub fn is_vcs_metadata(relative_path: &str) -> bool {
    relative_path == VCS_DIR
        || relative_path
            .strip_prefix(VCS_DIR)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Converts a `/`-separated remote path into a relative filesystem path.
///
/// Returns `None` for paths that would escape the target directory (`..`, an
/// absolute root, a drive prefix) and for paths with no normal component.
pub(crate) fn safe_relative_path(relative_path: &str) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in Path::new(relative_path).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if out.as_os_str().is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Fetches the snapshot of `branch` with the chosen transfer method and writes it into `target`.
///
/// `target` is created if needed. Nothing is written when the remote fails
/// before any content arrives.
#[instrument(level = "debug", skip(remote, progress, token), fields(repo = %repo, target = %target.display()))]
pub fn materialize(
    remote: &dyn Remote,
    repo: &RepositoryReference,
    branch: &str,
    transfer: TransferMethod,
    target: &Path,
    progress: &dyn ProgressReporter,
    token: &CancellationToken,
) -> Result<MaterializeStats> {
    match transfer {
        TransferMethod::Archive => {
            let archive = download_archive(remote, repo, branch, progress, token).map_err(|e| {
                if e.is_transfer_failure() {
                    log::info!("Archive download failed; retry with --fallback to fetch files individually.");
                }
                e
            })?;
            extract_archive(archive, target, progress, token)
        }
        TransferMethod::PerFile => {
            progress.set_message("Listing files...".to_string());
            let files = remote.file_tree(repo, branch)?;
            log::info!("Downloading {} files individually", files.len());
            let files_written = materialize_files(remote, repo, &files, target, progress, token)?;
            Ok(MaterializeStats {
                files_written,
                entries_skipped: 0,
            })
        }
    }
}

/// Streams the branch archive into an anonymous temporary file and rewinds it.
///
/// The file has no name on disk, so it disappears on every exit path.
pub(crate) fn download_archive(
    remote: &dyn Remote,
    repo: &RepositoryReference,
    branch: &str,
    progress: &dyn ProgressReporter,
    token: &CancellationToken,
) -> Result<File> {
    token.check()?;
    log::info!("Downloading {}@{} as a zip archive", repo, branch);
    progress.set_message("Downloading...".to_string());
    let mut body = remote.open_archive(repo, branch)?;
    let mut file = tempfile::tempfile().map_err(|e| io_error_with_path(e, "temporary archive"))?;

    let mut buffer = vec![0u8; DOWNLOAD_CHUNK_SIZE];
    let mut total: u64 = 0;
    loop {
        token.check()?;
        let n = match body.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(Error::NetworkError(format!(
                    "archive download interrupted after {} bytes: {}",
                    total, e
                )))
            }
        };
        file.write_all(&buffer[..n])
            .map_err(|e| io_error_with_path(e, "temporary archive"))?;
        total += n as u64;
        progress.set_message(format!("Downloading... {} KiB", total / 1024));
    }
    log::debug!("Downloaded {} bytes", total);

    file.seek(SeekFrom::Start(0))
        .map_err(|e| io_error_with_path(e, "temporary archive"))?;
    Ok(file)
}
