//! History CLI command
//!
//! Shows the most recent entries of a destination's run log.

use std::path::PathBuf;

use clap::Args;

use crate::display::format_run_history;
use crate::error::{ArchiveError, ArchiveResult};
use crate::runlog::RunLog;

use super::resolve_dest;

/// Arguments of `logarchive history`
#[derive(Args, Debug, Clone)]
pub struct HistoryArgs {
    /// Source directory the runs archived
    pub source: PathBuf,

    /// Destination directory (default: <SOURCE>-archives)
    #[arg(short, long, env = "LOGARCHIVE_DEST")]
    pub dest: Option<PathBuf>,

    /// Number of runs to show
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Print the records as JSON
    #[arg(long)]
    pub json: bool,
}

/// Handle `logarchive history`
pub fn handle_history_command(args: HistoryArgs) -> ArchiveResult<()> {
    let paths = resolve_dest(&args.source, args.dest)?;
    let run_log = RunLog::new(paths.run_log());
    let records = run_log.read_recent(args.limit)?;

    if args.json {
        let json = serde_json::to_string_pretty(&records)
            .map_err(|e| ArchiveError::Io(format!("Failed to serialize history: {}", e)))?;
        println!("{}", json);
        return Ok(());
    }

    if !run_log.exists() {
        println!("No run log at {}", run_log.path().display());
        return Ok(());
    }

    println!("{}", format_run_history(&records));
    Ok(())
}
