//! Extracts a branch archive, stripping its single top-level folder.

use super::{is_vcs_metadata, safe_relative_path, MaterializeStats};
use crate::cancellation::CancellationToken;
use crate::errors::{io_error_with_path, Error, Result};
use crate::progress::ProgressReporter;
use std::fs;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::instrument;
use zip::ZipArchive;

/// Extracts every entry of a zip archive into `target`.
///
/// The root prefix is the first path segment of the first entry. Entries outside
/// it are ignored, the root marker itself is dropped, and version-control
/// metadata is counted as skipped. Directory entries are created even when
/// empty. File contents are written byte for byte, replacing existing files.
///
/// `target` is only created once the archive has been opened and found non-empty.
///
/// # Errors
/// * [`Error::CorruptArchive`] if the archive or one of its entries cannot be read.
/// * [`Error::EmptyArchive`] if it has no entries.
/// * [`Error::IoError`] if writing to `target` fails.
/// * [`Error::Interrupted`] if `token` is cancelled between entries.
#[instrument(level = "debug", skip(reader, progress, token), fields(target = %target.display()))]
pub fn extract_archive<R: Read + Seek>(
    reader: R,
    target: &Path,
    progress: &dyn ProgressReporter,
    token: &CancellationToken,
) -> Result<MaterializeStats> {
    let mut archive = ZipArchive::new(reader).map_err(|e| Error::CorruptArchive(e.to_string()))?;
    if archive.is_empty() {
        return Err(Error::EmptyArchive);
    }

    let root_prefix = {
        let first = archive
            .by_index_raw(0)
            .map_err(|e| Error::CorruptArchive(e.to_string()))?;
        let first_segment = first.name().split('/').next().unwrap_or_default();
        format!("{}/", first_segment)
    };
    log::debug!("Archive root prefix: {}", root_prefix);

    fs::create_dir_all(target).map_err(|e| io_error_with_path(e, target))?;
    progress.set_length(archive.len() as u64);
    progress.set_message("Extracting...".to_string());

    let mut stats = MaterializeStats::default();
    for index in 0..archive.len() {
        token.check()?;
        let mut entry = archive
            .by_index(index)
            .map_err(|e| Error::CorruptArchive(e.to_string()))?;
        progress.inc(1);

        let name = entry.name().to_string();
        let Some(residual) = name.strip_prefix(&root_prefix) else {
            log::debug!("Ignoring entry outside the archive root: {}", name);
            continue;
        };
        if residual.is_empty() {
            continue;
        }
        if is_vcs_metadata(residual.trim_end_matches('/')) {
            log::debug!("Skipping version-control metadata: {}", residual);
            stats.entries_skipped += 1;
            continue;
        }
        let Some(relative) = safe_relative_path(residual) else {
            log::warn!("Skipping archive entry with an unsafe path: {}", name);
            stats.entries_skipped += 1;
            continue;
        };

        let out_path = target.join(relative);
        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| io_error_with_path(e, &out_path))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error_with_path(e, parent))?;
        }
        let mut content = Vec::with_capacity(entry.size().min(16 * 1024 * 1024) as usize);
        entry
            .read_to_end(&mut content)
            .map_err(|e| Error::CorruptArchive(format!("{}: {}", name, e)))?;
        fs::write(&out_path, &content).map_err(|e| io_error_with_path(e, &out_path))?;
        stats.files_written += 1;
    }

    log::info!("Extracted {} files", stats.files_written);
    progress.finish_with_message("Done".to_string());
    Ok(stats)
}
