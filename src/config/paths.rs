//! Path management for logarchive
//!
//! Resolves the source and destination of a request to canonical absolute
//! paths and enforces that the destination never lives inside the source.
//!
//! ## Resolution
//!
//! 1. Relative paths are joined onto the current working directory
//! 2. Every existing prefix is canonicalized (symlinks resolved)
//! 3. Components that do not exist yet are appended lexically, with `.` and
//!    `..` normalized

use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::config::request::ArchiveRequest;
use crate::error::{ArchiveError, ArchiveResult};

/// File name of the per-destination run log
pub const RUN_LOG_FILE: &str = "archive.log";

/// Suffix appended to the source path when no destination is given
pub const DEFAULT_DEST_SUFFIX: &str = "-archives";

/// Resolved, validated paths for one archival run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivePaths {
    source: PathBuf,
    dest: PathBuf,
}

impl ArchivePaths {
    /// Resolve and validate the paths of a request
    ///
    /// Performs no filesystem mutation.
    ///
    /// # Errors
    ///
    /// - `SourceNotFound` if the source is missing or not a directory
    /// - `InvalidDestination` if the destination equals or is nested inside
    ///   the source
    pub fn resolve(request: &ArchiveRequest) -> ArchiveResult<Self> {
        let source_dir = request.source_dir();
        match fs::metadata(source_dir) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(ArchiveError::SourceNotFound(source_dir.to_path_buf())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ArchiveError::SourceNotFound(source_dir.to_path_buf()))
            }
            Err(e) => return Err(ArchiveError::io_at(source_dir, e)),
        }

        let source = fs::canonicalize(source_dir).map_err(|e| ArchiveError::io_at(source_dir, e))?;

        let dest = match request.dest_dir() {
            Some(dest) => resolve_path(dest).map_err(|e| ArchiveError::io_at(dest, e))?,
            None => default_dest_for(&source),
        };

        if dest == source {
            return Err(ArchiveError::invalid_destination(
                dest,
                "destination is the source directory",
            ));
        }
        if dest.starts_with(&source) {
            return Err(ArchiveError::invalid_destination(
                dest,
                format!("destination is nested inside {}", source.display()),
            ));
        }

        Ok(Self { source, dest })
    }

    /// Canonical source directory
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Canonical destination directory
    pub fn dest(&self) -> &Path {
        &self.dest
    }

    /// Base name of the destination, pruned during traversal
    pub fn dest_name(&self) -> Option<&OsStr> {
        self.dest.file_name()
    }

    /// Get the path to the run log
    pub fn run_log(&self) -> PathBuf {
        self.dest.join(RUN_LOG_FILE)
    }

    /// Ensure the destination directory (and its parents) exist
    pub fn ensure_dest(&self) -> ArchiveResult<()> {
        fs::create_dir_all(&self.dest).map_err(|e| ArchiveError::io_at(&self.dest, e))
    }
}

/// Default destination for a source: a sibling named `<source>-archives`
pub fn default_dest_for(source: &Path) -> PathBuf {
    let mut dest: OsString = source.as_os_str().to_owned();
    dest.push(DEFAULT_DEST_SUFFIX);
    PathBuf::from(dest)
}

/// Resolve a path that may not exist yet to a canonical absolute form
pub fn resolve_path(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => {
                resolved.push(name);
                match fs::canonicalize(&resolved) {
                    Ok(real) => resolved = real,
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e),
                }
            }
        }
    }

    Ok(resolved)
}
