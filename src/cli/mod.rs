//! CLI command handlers
//!
//! This module contains the implementation of CLI commands, bridging the
//! clap argument parsing with the archival core. Each invocation builds a
//! fresh `ArchiveRequest`; nothing is shared between runs.

pub mod bundles;
pub mod history;
pub mod run;

pub use bundles::{handle_inspect_command, handle_list_command, InspectArgs, ListArgs};
pub use history::{handle_history_command, HistoryArgs};
pub use run::{handle_run_command, RunArgs};

use std::path::{Path, PathBuf};

use crate::config::{ArchivePaths, ArchiveRequest};
use crate::error::ArchiveResult;

/// Resolve the destination a source/dest pair refers to, without creating it
pub(crate) fn resolve_dest(source: &Path, dest: Option<PathBuf>) -> ArchiveResult<ArchivePaths> {
    let request = ArchiveRequest::builder(source).maybe_dest_dir(dest).build();
    ArchivePaths::resolve(&request)
}
