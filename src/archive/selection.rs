//! Candidate file selection
//!
//! Walks the source tree and picks the files that are old enough to archive.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::error::ArchiveResult;

/// File name suffixes that are never archived (already compressed)
pub const EXEMPT_EXTENSIONS: [&str; 7] = [".gz", ".xz", ".bz2", ".zip", ".tar", ".tgz", ".zst"];

/// A file selected for the current bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateFile {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Path relative to the source directory, as stored in the bundle
    pub relative_path: PathBuf,
    pub modified: DateTime<Utc>,
    pub size_bytes: u64,
}

/// Check whether a file name carries an exempt compressed extension
pub fn is_exempt(file_name: &OsStr) -> bool {
    let name = file_name.to_string_lossy();
    EXEMPT_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Instant at or before which an artifact is `days` old
pub fn age_cutoff(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now - Duration::days(i64::from(days))
}

/// Select every regular file under `source` modified at or before `cutoff`
///
/// Directories named `skip_dir_name` are pruned before descending. Symlinks
/// are never followed or selected. The result is ordered by relative path.
pub fn select_candidates(
    source: &Path,
    skip_dir_name: Option<&OsStr>,
    cutoff: DateTime<Utc>,
) -> ArchiveResult<Vec<CandidateFile>> {
    let mut candidates = Vec::new();

    let walker = WalkDir::new(source)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e, skip_dir_name));

    for entry in walker {
        let entry = entry?;

        if !entry.file_type().is_file() {
            continue;
        }
        if is_exempt(entry.file_name()) {
            debug!(path = %entry.path().display(), "skipping compressed file");
            continue;
        }

        let metadata = entry.metadata()?;
        let modified: DateTime<Utc> = metadata.modified()?.into();
        if modified > cutoff {
            continue;
        }

        let relative_path = entry
            .path()
            .strip_prefix(source)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| PathBuf::from(entry.file_name()));

        debug!(path = %entry.path().display(), "selected for archival");
        candidates.push(CandidateFile {
            path: entry.path().to_path_buf(),
            relative_path,
            modified,
            size_bytes: metadata.len(),
        });
    }

    candidates.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(candidates)
}

fn is_skipped_dir(entry: &DirEntry, skip_dir_name: Option<&OsStr>) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && skip_dir_name.map_or(false, |name| entry.file_name() == name)
}
