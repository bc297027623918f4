//! Run CLI command
//!
//! Performs one archival pass and prints its summary.

use std::path::PathBuf;

use clap::Args;

use crate::archive::{ArchiveOutcome, Archiver};
use crate::config::request::{ArchiveRequest, DEFAULT_RETAIN_ARCHIVES_DAYS, DEFAULT_RETAIN_LOGS_DAYS};
use crate::display::format_size;
use crate::error::{ArchiveError, ArchiveResult};

/// Arguments of `logarchive run`
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Directory containing the logs to archive
    pub source: PathBuf,

    /// Destination directory for bundles (default: <SOURCE>-archives)
    #[arg(short, long, env = "LOGARCHIVE_DEST")]
    pub dest: Option<PathBuf>,

    /// Archive files at least this many days old
    #[arg(long, env = "LOGARCHIVE_KEEP_LOGS_DAYS", default_value_t = DEFAULT_RETAIN_LOGS_DAYS)]
    pub keep_logs_days: u32,

    /// Prune bundles at least this many days old
    #[arg(long, env = "LOGARCHIVE_KEEP_ARCHIVES_DAYS", default_value_t = DEFAULT_RETAIN_ARCHIVES_DAYS)]
    pub keep_archives_days: u32,

    /// Delete originals once they are safely bundled
    #[arg(long, env = "LOGARCHIVE_DELETE_ORIGINALS")]
    pub delete_originals: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    /// Freeze the arguments into a request
    pub fn to_request(&self) -> ArchiveRequest {
        ArchiveRequest::builder(&self.source)
            .maybe_dest_dir(self.dest.clone())
            .retain_logs_days(self.keep_logs_days)
            .retain_archives_days(self.keep_archives_days)
            .delete_originals(self.delete_originals)
            .build()
    }
}

/// Handle `logarchive run`
pub fn handle_run_command(args: RunArgs) -> ArchiveResult<ArchiveOutcome> {
    let outcome = Archiver::new(args.to_request()).run()?;

    if args.json {
        let json = serde_json::to_string_pretty(&outcome)
            .map_err(|e| ArchiveError::Io(format!("Failed to serialize outcome: {}", e)))?;
        println!("{}", json);
    } else {
        print_summary(&outcome);
    }

    Ok(outcome)
}

fn print_summary(outcome: &ArchiveOutcome) {
    println!("Archive Run");
    println!("===========");
    println!("Source:      {}", outcome.source_dir.display());
    println!("Destination: {}", outcome.dest_dir.display());

    match &outcome.bundle_path {
        Some(bundle) => {
            println!("Bundle:      {}", bundle.display());
            println!("Files:       {}", outcome.file_count);
            println!("Size:        {}", format_size(outcome.bytes_written));
        }
        None => println!("Nothing to archive."),
    }

    if !outcome.deleted_originals.is_empty() {
        println!("Deleted {} original(s).", outcome.deleted_originals.len());
    }
    println!("Pruned {} expired bundle(s).", outcome.pruned_archive_count);
    if !outcome.removed_staging.is_empty() {
        println!(
            "Removed {} abandoned staging file(s).",
            outcome.removed_staging.len()
        );
    }

    if outcome.has_warnings() {
        println!();
        println!("Warnings:");
        for warning in &outcome.warnings {
            println!("  - {}", warning);
        }
    }
}
