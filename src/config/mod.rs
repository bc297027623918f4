//! Configuration module for logarchive
//!
//! This module provides:
//! - The immutable `ArchiveRequest` and its builder
//! - Retention policy defaults
//! - Canonical path resolution for source and destination directories

pub mod paths;
pub mod request;

pub use paths::ArchivePaths;
pub use request::{ArchiveRequest, ArchiveRequestBuilder, RetentionPolicy};
