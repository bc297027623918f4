//! Log archival for logarchive
//!
//! One archival pass moves aging log files into a compressed bundle and
//! prunes bundles past their retention.
//!
//! # Architecture
//!
//! - `selection`: walks the source tree and picks eligible files
//! - `bundle`: names, writes (staging + atomic rename) and inspects bundles
//! - `retention`: deletes expired bundles and abandoned staging files
//! - `archiver`: drives a full pass and reports an `ArchiveOutcome`
//!
//! # Example
//!
//! ```rust,ignore
//! use logarchive::archive::Archiver;
//! use logarchive::config::ArchiveRequest;
//!
//! let request = ArchiveRequest::builder("/var/log/app")
//!     .retain_logs_days(7)
//!     .delete_originals(true)
//!     .build();
//!
//! let outcome = Archiver::new(request).run()?;
//! println!("{}", outcome.summary());
//! ```

mod archiver;
mod bundle;
mod retention;
mod selection;

pub use archiver::{run_archive, ArchiveOutcome, ArchiveWarning, Archiver};
pub use bundle::{
    bundle_file_name, inspect_bundle, list_bundles, list_staging_files, parse_bundle_name,
    parse_staging_name, BundleEntry, BundleInfo, BUNDLE_PREFIX, BUNDLE_SUFFIX, STAGING_SUFFIX,
};
pub use retention::{
    expired_bundles, prune_expired, prune_stale_staging, PruneOutcome, STALE_STAGING_MIN_DAYS,
};
pub use selection::{age_cutoff, is_exempt, select_candidates, CandidateFile, EXEMPT_EXTENSIONS};
