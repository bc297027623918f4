//! The archival pass
//!
//! `Archiver::run` validates the request, selects candidates, commits a
//! bundle, records the run, deletes originals when asked, and prunes expired
//! bundles along with abandoned staging files. Once a bundle has been renamed into place the run is successful;
//! later cleanup failures are reported as warnings on the outcome.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::paths::ArchivePaths;
use crate::config::request::ArchiveRequest;
use crate::error::{ArchiveError, ArchiveResult};
use crate::runlog::{RunLog, RunRecord};

use super::bundle::{commit_bundle, next_bundle_path};
use super::retention::{
    prune_expired, prune_stale_staging, PruneOutcome, STALE_STAGING_MIN_DAYS,
};
use super::selection::{age_cutoff, select_candidates, CandidateFile};

/// Non-fatal problem encountered after the run was committed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArchiveWarning {
    #[error("run log {} not written: {message}", .path.display())]
    RunLogWriteFailed { path: PathBuf, message: String },

    #[error("could not delete original {}: {message}", .path.display())]
    DeleteOriginalFailed { path: PathBuf, message: String },

    #[error("could not prune {}: {message}", .path.display())]
    PruneFailed { path: PathBuf, message: String },
}

/// What one archival pass did
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveOutcome {
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    /// Committed bundle, `None` when nothing qualified
    pub bundle_path: Option<PathBuf>,
    pub file_count: usize,
    pub bytes_written: u64,
    pub pruned_archive_count: usize,
    pub pruned_archives: Vec<PathBuf>,
    /// Staging files of interrupted runs that were removed
    pub removed_staging: Vec<PathBuf>,
    pub deleted_originals: Vec<PathBuf>,
    pub warnings: Vec<ArchiveWarning>,
}

impl ArchiveOutcome {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// One-line human readable summary
    pub fn summary(&self) -> String {
        let archived = match &self.bundle_path {
            Some(path) => format!(
                "Archived {} file(s), {} bytes -> {}",
                self.file_count,
                self.bytes_written,
                path.display()
            ),
            None => "Nothing to archive".to_string(),
        };
        format!(
            "{}; pruned {} bundle(s); {} warning(s)",
            archived,
            self.pruned_archive_count,
            self.warnings.len()
        )
    }
}

/// Runs archival passes for one request
pub struct Archiver {
    request: ArchiveRequest,
}

impl Archiver {
    pub fn new(request: ArchiveRequest) -> Self {
        Self { request }
    }

    /// Run one pass using the current time
    pub fn run(&self) -> ArchiveResult<ArchiveOutcome> {
        self.run_at(Utc::now())
    }

    /// Run one pass as if it started at `now`
    pub fn run_at(&self, now: DateTime<Utc>) -> ArchiveResult<ArchiveOutcome> {
        let plan = self.plan(now)?;
        self.execute(plan)
    }

    /// Resolve the request and select candidates without touching the disk
    fn plan(&self, now: DateTime<Utc>) -> ArchiveResult<RunPlan> {
        let policy = *self.request.policy();
        let paths = ArchivePaths::resolve(&self.request)?;

        let candidates = select_candidates(
            paths.source(),
            paths.dest_name(),
            age_cutoff(now, policy.retain_logs_days),
        )?;
        info!(
            source = %paths.source().display(),
            candidates = candidates.len(),
            "selected files for archival"
        );

        Ok(RunPlan {
            paths,
            candidates,
            now,
        })
    }

    /// Commit, record, delete and prune for a planned run
    fn execute(&self, plan: RunPlan) -> ArchiveResult<ArchiveOutcome> {
        let RunPlan {
            paths,
            candidates,
            now,
        } = plan;
        let policy = *self.request.policy();
        paths.ensure_dest()?;

        let mut outcome = ArchiveOutcome {
            source_dir: paths.source().to_path_buf(),
            dest_dir: paths.dest().to_path_buf(),
            bundle_path: None,
            file_count: 0,
            bytes_written: 0,
            pruned_archive_count: 0,
            pruned_archives: Vec::new(),
            removed_staging: Vec::new(),
            deleted_originals: Vec::new(),
            warnings: Vec::new(),
        };
        let mut record = RunRecord::new(now, paths.source(), &policy);

        if !candidates.is_empty() {
            let final_path = next_bundle_path(paths.dest(), now);
            let committed = commit_bundle(&final_path, &candidates)?;
            info!(
                bundle = %committed.path.display(),
                bytes = committed.size_bytes,
                files = candidates.len(),
                "bundle committed"
            );

            record = record.with_bundle(&committed.path, committed.size_bytes, candidates.len());
            outcome.file_count = candidates.len();
            outcome.bytes_written = committed.size_bytes;
            outcome.bundle_path = Some(committed.path);
        }

        let run_log = RunLog::new(paths.run_log());
        if let Err(e) = run_log.append(&record) {
            warn!(error = %e, "failed to append run record");
            outcome.warnings.push(run_log_warning(run_log.path(), e));
        }

        if policy.delete_originals && outcome.bundle_path.is_some() {
            delete_originals(&candidates, &mut outcome);
        }

        let keep = outcome.bundle_path.clone();
        let pruned = prune_expired(
            paths.dest(),
            age_cutoff(now, policy.retain_archives_days),
            keep.as_deref(),
        );
        outcome.pruned_archives = collect_pruned(pruned, paths.dest(), &mut outcome.warnings);
        outcome.pruned_archive_count = outcome.pruned_archives.len();

        let staging_days = policy.retain_archives_days.max(STALE_STAGING_MIN_DAYS);
        let removed = prune_stale_staging(paths.dest(), age_cutoff(now, staging_days));
        outcome.removed_staging = collect_pruned(removed, paths.dest(), &mut outcome.warnings);

        info!(summary = %outcome.summary(), "archival run finished");
        Ok(outcome)
    }
}

/// Resolved paths and selected files of a run that has not mutated anything yet
struct RunPlan {
    paths: ArchivePaths,
    candidates: Vec<CandidateFile>,
    now: DateTime<Utc>,
}

/// Turn a pruning result into the removed paths, recording failures as warnings
fn collect_pruned(
    result: ArchiveResult<PruneOutcome>,
    dest: &Path,
    warnings: &mut Vec<ArchiveWarning>,
) -> Vec<PathBuf> {
    match result {
        Ok(pruned) => {
            warnings.extend(
                pruned
                    .failures
                    .into_iter()
                    .map(|(path, message)| ArchiveWarning::PruneFailed { path, message }),
            );
            pruned.pruned
        }
        Err(e) => {
            warn!(error = %e, "failed to list destination for pruning");
            warnings.push(ArchiveWarning::PruneFailed {
                path: dest.to_path_buf(),
                message: e.to_string(),
            });
            Vec::new()
        }
    }
}

/// Run one archival pass for `request`
pub fn run_archive(request: &ArchiveRequest) -> ArchiveResult<ArchiveOutcome> {
    Archiver::new(request.clone()).run()
}

/// Delete exactly the files that went into the committed bundle
fn delete_originals(candidates: &[CandidateFile], outcome: &mut ArchiveOutcome) {
    for candidate in candidates {
        match fs::remove_file(&candidate.path) {
            Ok(()) => outcome.deleted_originals.push(candidate.path.clone()),
            Err(e) => {
                warn!(path = %candidate.path.display(), error = %e, "failed to delete original");
                outcome.warnings.push(ArchiveWarning::DeleteOriginalFailed {
                    path: candidate.path.clone(),
                    message: e.to_string(),
                });
            }
        }
    }
}

fn run_log_warning(path: &Path, err: ArchiveError) -> ArchiveWarning {
    let message = match err {
        ArchiveError::RunLogWriteFailed { message, .. } => message,
        other => other.to_string(),
    };
    ArchiveWarning::RunLogWriteFailed {
        path: path.to_path_buf(),
        message,
    }
}
