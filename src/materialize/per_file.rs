//! Fallback transfer: fetch each blob of the tree listing and write it in place.

use super::safe_relative_path;
use crate::cancellation::CancellationToken;
use crate::errors::{io_error_with_path, Error, Result};
use crate::github::{Remote, RemoteFileEntry, RepositoryReference};
use crate::progress::ProgressReporter;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Downloads every entry of `files` into `target`, in parallel, returning the number written.
///
/// Paths are validated before anything is fetched; a path that would escape
/// `target` fails the whole operation with [`Error::MalformedResponse`]. The
/// first fetch or write failure aborts the remaining work and is returned.
#[instrument(level = "debug", skip(remote, files, progress, token), fields(repo = %repo, count = files.len()))]
pub fn materialize_files(
    remote: &dyn Remote,
    repo: &RepositoryReference,
    files: &[RemoteFileEntry],
    target: &Path,
    progress: &dyn ProgressReporter,
    token: &CancellationToken,
) -> Result<usize> {
    let planned: Vec<(PathBuf, &RemoteFileEntry)> = files
        .iter()
        .map(|entry| {
            safe_relative_path(&entry.path)
                .map(|relative| (target.join(relative), entry))
                .ok_or_else(|| Error::MalformedResponse {
                    url: repo.canonical_url(),
                    reason: format!("tree lists an unsafe path '{}'", entry.path),
                })
        })
        .collect::<Result<_>>()?;

    fs::create_dir_all(target).map_err(|e| io_error_with_path(e, target))?;
    progress.set_length(planned.len() as u64);
    progress.set_message("Downloading files...".to_string());

    planned
        .par_iter()
        .try_for_each(|(local_path, entry)| -> Result<()> {
            token.check()?;
            log::debug!("Fetching {} ({})", entry.path, entry.content_id);
            let content = remote.blob(repo, &entry.content_id)?;
            if let Some(parent) = local_path.parent() {
                fs::create_dir_all(parent).map_err(|e| io_error_with_path(e, parent))?;
            }
            fs::write(local_path, content).map_err(|e| io_error_with_path(e, local_path))?;
            progress.inc(1);
            Ok(())
        })?;

    progress.finish_with_message("Done".to_string());
    Ok(planned.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{MockFailure, MockOp, MockRemote};
    use crate::progress::NoOpProgress;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tempfile::tempdir;

    fn demo() -> RepositoryReference {
        RepositoryReference::new("octo", "demo").unwrap()
    }

    struct CountingProgress(AtomicU64);

    impl ProgressReporter for CountingProgress {
        fn set_length(&self, _len: u64) {}
        fn inc(&self, delta: u64) {
            self.0.fetch_add(delta, Ordering::Relaxed);
        }
        fn set_message(&self, _msg: String) {}
        fn finish_with_message(&self, _msg: String) {}
    }

    #[test]
    fn test_writes_every_file_verbatim() {
        let remote = MockRemote::new()
            .with_file("main", "README.md", b"# hi\r\n")
            .with_file("main", "src/deep/mod.rs", b"pub mod x;")
            .with_file("main", "assets/logo.bin", &[0xff, 0x00, 0x7f]);
        let files = remote.file_tree(&demo(), "main").unwrap();
        let temp = tempdir().unwrap();
        let progress = CountingProgress(AtomicU64::new(0));

        let written = materialize_files(
            &remote,
            &demo(),
            &files,
            temp.path(),
            &progress,
            &CancellationToken::new(),
        )
        .unwrap();

        assert_eq!(written, 3);
        assert_eq!(progress.0.load(Ordering::Relaxed), 3);
        assert_eq!(fs::read(temp.path().join("README.md")).unwrap(), b"# hi\r\n");
        assert_eq!(
            fs::read(temp.path().join("src/deep/mod.rs")).unwrap(),
            b"pub mod x;"
        );
        assert_eq!(
            fs::read(temp.path().join("assets/logo.bin")).unwrap(),
            [0xffu8, 0x00, 0x7f]
        );
        assert_eq!(remote.call_count(MockOp::Blob), 3);
    }

    #[test]
    fn test_single_fetch_failure_is_fatal() {
        let remote = MockRemote::new().with_file("main", "a.txt", b"a");
        let files = remote.file_tree(&demo(), "main").unwrap();
        remote.fail_on(MockOp::Blob, MockFailure::Network("connection reset".to_string()));
        let temp = tempdir().unwrap();

        let result = materialize_files(
            &remote,
            &demo(),
            &files,
            temp.path(),
            &NoOpProgress,
            &CancellationToken::new(),
        );

        assert!(matches!(result, Err(Error::NetworkError(_))));
        assert!(!temp.path().join("a.txt").exists());
    }

    #[test]
    fn test_missing_blob_is_not_found() {
        let remote = MockRemote::new();
        let files = vec![RemoteFileEntry {
            path: "ghost.txt".to_string(),
            content_id: "deadbeef".to_string(),
        }];
        let temp = tempdir().unwrap();

        let result = materialize_files(
            &remote,
            &demo(),
            &files,
            temp.path(),
            &NoOpProgress,
            &CancellationToken::new(),
        );

        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_unsafe_path_rejected_before_fetching() {
        let remote = MockRemote::new().with_file("main", "../outside.txt", b"x");
        let files = remote.file_tree(&demo(), "main").unwrap();
        let temp = tempdir().unwrap();
        let target = temp.path().join("inner");

        let result = materialize_files(
            &remote,
            &demo(),
            &files,
            &target,
            &NoOpProgress,
            &CancellationToken::new(),
        );

        assert!(matches!(result, Err(Error::MalformedResponse { .. })));
        assert_eq!(remote.call_count(MockOp::Blob), 0);
        assert!(!temp.path().join("outside.txt").exists());
    }

    #[test]
    fn test_cancelled_token_stops_work() {
        let remote = MockRemote::new().with_file("main", "a.txt", b"a");
        let files = remote.file_tree(&demo(), "main").unwrap();
        let temp = tempdir().unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let result =
            materialize_files(&remote, &demo(), &files, temp.path(), &NoOpProgress, &token);

        assert!(matches!(result, Err(Error::Interrupted)));
        assert_eq!(remote.call_count(MockOp::Blob), 0);
    }
}
