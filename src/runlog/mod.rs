//! Run log for logarchive
//!
//! Every archival run, including one that found nothing to archive, appends a
//! single human-readable line to `<dest>/archive.log`:
//!
//! ```text
//! 2026-10-14T03:00:00Z | source=/var/log/app | bundle=/var/log/app-archives/logs_archive_20261014_030000.tar.gz | size=5120 | files=3 | delete_originals=false | keep_logs_days=7 | keep_archives_days=30
//! ```
//!
//! Records are never rewritten or removed by this crate.

mod logger;
mod record;

pub use logger::RunLog;
pub use record::RunRecord;
