//! Persists the two per-directory sync records: the origin URL and the last synced commit.
//!
//! The records are independent: either may be absent without invalidating the
//! other. Each write replaces the whole value.

use crate::constants::{ORIGIN_FILE, VERSION_FILE};
use crate::errors::{io_error_with_path, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Storage for the origin and last-commit records of one target directory.
pub trait StateStore {
    /// The stored origin URL, or `None` if nothing was recorded.
    fn read_origin(&self) -> Result<Option<String>>;
    fn write_origin(&self, url: &str) -> Result<()>;
    /// The stored full commit identifier, or `None` before the first sync.
    fn read_last_commit(&self) -> Result<Option<String>>;
    fn write_last_commit(&self, sha: &str) -> Result<()>;
}

/// Keeps the records as `.gitpull` and `.gitpull.version` at the root of a directory.
///
/// Values are written with a trailing newline through a temporary file that is
/// renamed into place, so a reader never sees a half-written record. Reads drop
/// the one trailing line ending and return the rest exactly as written; a blank
/// file counts as absent.
///
/// # Examples
/// ```
/// use gitpull::state::{FsStateStore, StateStore};
///
/// let dir = tempfile::tempdir().unwrap();
/// let store = FsStateStore::new(dir.path());
/// assert_eq!(store.read_origin().unwrap(), None);
///
/// store.write_origin("https://github.com/octo/demo").unwrap();
/// assert_eq!(
///     store.read_origin().unwrap().as_deref(),
///     Some("https://github.com/octo/demo")
/// );
/// ```
#[derive(Debug, Clone)]
pub struct FsStateStore {
    dir: PathBuf,
}

impl FsStateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory holding the records.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_record(&self, file_name: &str) -> Result<Option<String>> {
        let path = self.dir.join(file_name);
        match fs::read_to_string(&path) {
            Ok(content) => {
                let value = content
                    .strip_suffix('\n')
                    .map(|v| v.strip_suffix('\r').unwrap_or(v))
                    .unwrap_or(&content);
                Ok((!value.trim().is_empty()).then(|| value.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error_with_path(e, &path)),
        }
    }

    fn write_record(&self, file_name: &str, value: &str) -> Result<()> {
        let path = self.dir.join(file_name);
        let mut temp =
            tempfile::NamedTempFile::new_in(&self.dir).map_err(|e| io_error_with_path(e, &self.dir))?;
        writeln!(temp, "{}", value).map_err(|e| io_error_with_path(e, temp.path()))?;
        temp.persist(&path)
            .map_err(|e| io_error_with_path(e.error, &path))?;
        log::debug!("Wrote {}", path.display());
        Ok(())
    }
}

impl StateStore for FsStateStore {
    fn read_origin(&self) -> Result<Option<String>> {
        self.read_record(ORIGIN_FILE)
    }

    fn write_origin(&self, url: &str) -> Result<()> {
        self.write_record(ORIGIN_FILE, url)
    }

    fn read_last_commit(&self) -> Result<Option<String>> {
        self.read_record(VERSION_FILE)
    }

    fn write_last_commit(&self, sha: &str) -> Result<()> {
        self.write_record(VERSION_FILE, sha)
    }
}

/// An in-memory [`StateStore`] that counts writes, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    origin: Mutex<Option<String>>,
    last_commit: Mutex<Option<String>>,
    writes: AtomicUsize,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with existing records without counting them as writes.
    pub fn with_records(origin: Option<&str>, last_commit: Option<&str>) -> Self {
        Self {
            origin: Mutex::new(origin.map(str::to_string)),
            last_commit: Mutex::new(last_commit.map(str::to_string)),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of record writes performed so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

fn read_slot(slot: &Mutex<Option<String>>) -> Option<String> {
    slot.lock().unwrap_or_else(|e| e.into_inner()).clone()
}

impl StateStore for MemoryStateStore {
    fn read_origin(&self) -> Result<Option<String>> {
        Ok(read_slot(&self.origin))
    }

    fn write_origin(&self, url: &str) -> Result<()> {
        *self.origin.lock().unwrap_or_else(|e| e.into_inner()) = Some(url.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn read_last_commit(&self) -> Result<Option<String>> {
        Ok(read_slot(&self.last_commit))
    }

    fn write_last_commit(&self, sha: &str) -> Result<()> {
        *self.last_commit.lock().unwrap_or_else(|e| e.into_inner()) = Some(sha.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_records_are_independent() {
        let temp = tempdir().unwrap();
        let store = FsStateStore::new(temp.path());

        store
            .write_last_commit("0123456789abcdef0123456789abcdef01234567")
            .unwrap();

        assert_eq!(store.read_origin().unwrap(), None);
        assert_eq!(
            store.read_last_commit().unwrap().as_deref(),
            Some("0123456789abcdef0123456789abcdef01234567")
        );
    }

    #[test]
    fn test_written_files_have_trailing_newline() {
        let temp = tempdir().unwrap();
        let store = FsStateStore::new(temp.path());

        store.write_origin("https://github.com/octo/demo").unwrap();
        store.write_last_commit("abc").unwrap();

        assert_eq!(
            fs::read_to_string(temp.path().join(ORIGIN_FILE)).unwrap(),
            "https://github.com/octo/demo\n"
        );
        assert_eq!(
            fs::read_to_string(temp.path().join(VERSION_FILE)).unwrap(),
            "abc\n"
        );
    }

    #[test]
    fn test_overwrite_replaces_whole_value() {
        let temp = tempdir().unwrap();
        let store = FsStateStore::new(temp.path());

        store.write_last_commit("first-and-longer").unwrap();
        store.write_last_commit("second").unwrap();

        assert_eq!(store.read_last_commit().unwrap().as_deref(), Some("second"));
        let leftovers: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers.len(), 1, "temporary files left behind: {:?}", leftovers);
    }

    #[test]
    fn test_values_round_trip_exactly() {
        let temp = tempdir().unwrap();
        let store = FsStateStore::new(temp.path());

        store.write_origin("  https://github.com/octo/demo ").unwrap();
        assert_eq!(
            store.read_origin().unwrap().as_deref(),
            Some("  https://github.com/octo/demo ")
        );
    }

    #[test]
    fn test_hand_written_records_drop_line_ending() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join(ORIGIN_FILE), "octo/demo\r\n").unwrap();
        fs::write(temp.path().join(VERSION_FILE), " \n").unwrap();
        let store = FsStateStore::new(temp.path());

        assert_eq!(store.read_origin().unwrap().as_deref(), Some("octo/demo"));
        assert_eq!(store.read_last_commit().unwrap(), None);
    }

    #[test]
    fn test_write_into_missing_directory_fails_with_io_error() {
        let temp = tempdir().unwrap();
        let store = FsStateStore::new(temp.path().join("missing"));

        let result = store.write_origin("https://github.com/octo/demo");
        assert!(matches!(result, Err(crate::errors::Error::IoError { .. })));
    }

    #[test]
    fn test_memory_store_counts_writes() {
        let store = MemoryStateStore::with_records(Some("https://github.com/octo/demo"), None);
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.read_last_commit().unwrap(), None);

        store.write_last_commit("abc").unwrap();
        store.write_origin("https://github.com/octo/other").unwrap();

        assert_eq!(store.write_count(), 2);
        assert_eq!(store.read_last_commit().unwrap().as_deref(), Some("abc"));
        assert_eq!(
            store.read_origin().unwrap().as_deref(),
            Some("https://github.com/octo/other")
        );
    }
}
