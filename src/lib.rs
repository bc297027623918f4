//! logarchive - Scheduled archival of aging log files
//!
//! This library moves log files older than a retention window into
//! gzip-compressed tar bundles, records every run in an append-only log, and
//! prunes bundles past their own retention window.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Archive requests, policy defaults and path resolution
//! - `error`: Custom error types
//! - `archive`: Selection, bundle writing and retention pruning
//! - `runlog`: Append-only run log
//! - `cli`: Command handlers for the `logarchive` binary
//! - `display`: Terminal formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use logarchive::{run_archive, ArchiveRequest};
//!
//! let outcome = run_archive(&ArchiveRequest::new("/var/log/app"))?;
//! println!("{}", outcome.summary());
//! ```

pub mod archive;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod runlog;

pub use archive::{run_archive, ArchiveOutcome, Archiver};
pub use config::ArchiveRequest;
pub use error::{ArchiveError, ArchiveResult};
