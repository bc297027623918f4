//! Custom error types for logarchive
//!
//! This module defines the error hierarchy for archival runs using thiserror
//! for ergonomic error definitions.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// The main error type for logarchive operations
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The source directory is missing or is not a directory
    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The destination equals or lives inside the source
    #[error("Invalid destination {}: {reason}", .dest.display())]
    InvalidDestination { dest: PathBuf, reason: String },

    /// Staging write or compression failed; no bundle was committed
    #[error("Failed to write bundle {}: {message}", .path.display())]
    BundleWriteFailed { path: PathBuf, message: String },

    /// The operating system refused access to a path
    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// The run log could not be appended to
    #[error("Failed to write run log {}: {message}", .path.display())]
    RunLogWriteFailed { path: PathBuf, message: String },

    /// A file is not a readable bundle
    #[error("Invalid bundle {}: {message}", .path.display())]
    InvalidBundle { path: PathBuf, message: String },

    /// Other file I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Exit status for errors without a more specific code
pub const EXIT_FAILURE: u8 = 1;
/// Exit status when the source or destination is rejected
pub const EXIT_CONFIGURATION: u8 = 2;
/// Exit status when the bundle could not be written
pub const EXIT_BUNDLE_FAILURE: u8 = 3;

impl ArchiveError {
    /// Create an "invalid destination" error
    pub fn invalid_destination(dest: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidDestination {
            dest: dest.into(),
            reason: reason.into(),
        }
    }

    /// Classify an I/O failure that happened while producing a bundle
    pub fn bundle_write(path: &Path, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::PermissionDenied {
            Self::PermissionDenied(path.to_path_buf())
        } else {
            Self::BundleWriteFailed {
                path: path.to_path_buf(),
                message: err.to_string(),
            }
        }
    }

    /// Classify an I/O failure on an arbitrary path
    pub fn io_at(path: &Path, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::PermissionDenied {
            Self::PermissionDenied(path.to_path_buf())
        } else {
            Self::Io(format!("{}: {}", path.display(), err))
        }
    }

    /// Check if this is a configuration error (raised before any mutation)
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::SourceNotFound(_) | Self::InvalidDestination { .. }
        )
    }

    /// Check if this error was raised while writing the bundle
    pub fn is_bundle_failure(&self) -> bool {
        matches!(self, Self::BundleWriteFailed { .. } | Self::PermissionDenied(_))
    }

    /// Process exit status for this error
    ///
    /// `2` for configuration errors, `3` for bundle write failures, `1` for
    /// anything else.
    pub fn exit_code(&self) -> u8 {
        if self.is_configuration() {
            EXIT_CONFIGURATION
        } else if self.is_bundle_failure() {
            EXIT_BUNDLE_FAILURE
        } else {
            EXIT_FAILURE
        }
    }
}

impl From<io::Error> for ArchiveError {
    fn from(err: io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<walkdir::Error> for ArchiveError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(Path::to_path_buf);
        match (err.into_io_error(), path) {
            (Some(io_err), Some(path)) => Self::io_at(&path, io_err),
            (Some(io_err), None) => Self::from(io_err),
            (None, path) => Self::Io(format!(
                "filesystem loop detected at {}",
                path.map(|p| p.display().to_string()).unwrap_or_default()
            )),
        }
    }
}

/// Result type alias for logarchive operations
pub type ArchiveResult<T> = Result<T, ArchiveError>;
