//! Archive retention pruning
//!
//! Deletes bundles whose modification time is at or before the cutoff. The
//! boundary is inclusive: with a 30 day policy a bundle exactly 30 days old
//! is pruned.
//!
//! The same pass removes staging files left behind by interrupted runs.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::ArchiveResult;

use super::bundle::{list_bundles, list_staging_files, BundleInfo};

/// Result of one pruning pass
#[derive(Debug, Default)]
pub struct PruneOutcome {
    /// Bundles that were deleted
    pub pruned: Vec<PathBuf>,
    /// Bundles that should have been deleted but could not be
    pub failures: Vec<(PathBuf, String)>,
}

/// Bundles in `dest` that are expired at `cutoff`, oldest first
pub fn expired_bundles(
    dest: &Path,
    cutoff: DateTime<Utc>,
    keep: Option<&Path>,
) -> ArchiveResult<Vec<BundleInfo>> {
    let mut expired: Vec<BundleInfo> = list_bundles(dest)?
        .into_iter()
        .filter(|b| b.modified <= cutoff)
        .filter(|b| keep.map_or(true, |k| b.path != k))
        .collect();
    expired.reverse();
    Ok(expired)
}

/// Delete every expired bundle in `dest`, except `keep`
///
/// A failure on one bundle is recorded and pruning continues with the rest.
pub fn prune_expired(
    dest: &Path,
    cutoff: DateTime<Utc>,
    keep: Option<&Path>,
) -> ArchiveResult<PruneOutcome> {
    let mut outcome = PruneOutcome::default();

    for bundle in expired_bundles(dest, cutoff, keep)? {
        match fs::remove_file(&bundle.path) {
            Ok(()) => {
                info!(bundle = %bundle.filename, "pruned expired bundle");
                outcome.pruned.push(bundle.path);
            }
            Err(e) => {
                warn!(bundle = %bundle.filename, error = %e, "failed to prune bundle");
                outcome.failures.push((bundle.path, e.to_string()));
            }
        }
    }

    Ok(outcome)
}

/// Days a staging file must sit untouched before it counts as abandoned
pub const STALE_STAGING_MIN_DAYS: u32 = 1;

/// Delete staging files in `dest` last modified at or before `cutoff`
///
/// Only names of the form `<bundle name>.partial` are considered. A failure
/// on one file is recorded and the pass continues.
pub fn prune_stale_staging(dest: &Path, cutoff: DateTime<Utc>) -> ArchiveResult<PruneOutcome> {
    let mut outcome = PruneOutcome::default();

    for staged in list_staging_files(dest)?
        .into_iter()
        .filter(|s| s.modified <= cutoff)
    {
        match fs::remove_file(&staged.path) {
            Ok(()) => {
                info!(staging = %staged.filename, "removed abandoned staging file");
                outcome.pruned.push(staged.path);
            }
            Err(e) => {
                warn!(staging = %staged.filename, error = %e, "failed to remove staging file");
                outcome.failures.push((staged.path, e.to_string()));
            }
        }
    }

    Ok(outcome)
}
