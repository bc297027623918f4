//! Archive requests and retention policy
//!
//! An `ArchiveRequest` is built fresh for every invocation and never mutated
//! once handed to the archiver.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Default age in days before a log file is archived
pub const DEFAULT_RETAIN_LOGS_DAYS: u32 = 7;

/// Default age in days before a bundle is pruned
pub const DEFAULT_RETAIN_ARCHIVES_DAYS: u32 = 30;

/// Retention settings applied to one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetentionPolicy {
    /// Files at least this many days old are archived
    pub retain_logs_days: u32,
    /// Bundles at least this many days old are pruned
    pub retain_archives_days: u32,
    /// Delete archived originals after the bundle is committed
    pub delete_originals: bool,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            retain_logs_days: DEFAULT_RETAIN_LOGS_DAYS,
            retain_archives_days: DEFAULT_RETAIN_ARCHIVES_DAYS,
            delete_originals: false,
        }
    }
}

/// One archival pass to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRequest {
    source_dir: PathBuf,
    dest_dir: Option<PathBuf>,
    policy: RetentionPolicy,
}

impl ArchiveRequest {
    /// Create a request with default policy and destination
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self::builder(source_dir).build()
    }

    /// Start building a request for the given source directory
    pub fn builder(source_dir: impl Into<PathBuf>) -> ArchiveRequestBuilder {
        ArchiveRequestBuilder {
            source_dir: source_dir.into(),
            dest_dir: None,
            policy: RetentionPolicy::default(),
        }
    }

    /// Directory whose files are archived
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Explicit destination, if one was given
    pub fn dest_dir(&self) -> Option<&Path> {
        self.dest_dir.as_deref()
    }

    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }
}

/// Accumulates request fields before freezing them into an `ArchiveRequest`
#[derive(Debug, Clone)]
pub struct ArchiveRequestBuilder {
    source_dir: PathBuf,
    dest_dir: Option<PathBuf>,
    policy: RetentionPolicy,
}

impl ArchiveRequestBuilder {
    /// Set the destination directory (defaults to `<source>-archives`)
    pub fn dest_dir(mut self, dest_dir: impl Into<PathBuf>) -> Self {
        self.dest_dir = Some(dest_dir.into());
        self
    }

    /// Set the destination only when one is provided
    pub fn maybe_dest_dir(mut self, dest_dir: Option<PathBuf>) -> Self {
        self.dest_dir = dest_dir;
        self
    }

    pub fn retain_logs_days(mut self, days: u32) -> Self {
        self.policy.retain_logs_days = days;
        self
    }

    pub fn retain_archives_days(mut self, days: u32) -> Self {
        self.policy.retain_archives_days = days;
        self
    }

    pub fn delete_originals(mut self, delete: bool) -> Self {
        self.policy.delete_originals = delete;
        self
    }

    /// Replace the whole policy at once
    pub fn policy(mut self, policy: RetentionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> ArchiveRequest {
        ArchiveRequest {
            source_dir: self.source_dir,
            dest_dir: self.dest_dir,
            policy: self.policy,
        }
    }
}
