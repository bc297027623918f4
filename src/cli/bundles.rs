//! Bundle CLI commands
//!
//! Lists the bundles of a destination and shows what a bundle contains.

use std::path::PathBuf;

use chrono::Utc;
use clap::Args;

use crate::archive::{inspect_bundle, list_bundles};
use crate::display::{format_bundle_entries, format_bundle_list};
use crate::error::ArchiveResult;

use super::resolve_dest;

/// Arguments of `logarchive list`
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Source directory the bundles were made from
    pub source: PathBuf,

    /// Destination directory (default: <SOURCE>-archives)
    #[arg(short, long, env = "LOGARCHIVE_DEST")]
    pub dest: Option<PathBuf>,
}

/// Arguments of `logarchive inspect`
#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Path to a bundle file
    pub bundle: PathBuf,
}

/// Handle `logarchive list`
pub fn handle_list_command(args: ListArgs) -> ArchiveResult<()> {
    let paths = resolve_dest(&args.source, args.dest)?;
    let bundles = list_bundles(paths.dest())?;

    println!("Bundles in {}", paths.dest().display());
    println!();
    println!("{}", format_bundle_list(&bundles, Utc::now()));
    Ok(())
}

/// Handle `logarchive inspect`
pub fn handle_inspect_command(args: InspectArgs) -> ArchiveResult<()> {
    let entries = inspect_bundle(&args.bundle)?;

    println!("Bundle: {}", args.bundle.display());
    println!();
    println!("{}", format_bundle_entries(&entries));
    Ok(())
}
