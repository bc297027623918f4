//! Display formatting for terminal output
//!
//! Renders bundles, bundle contents and run history as tables.

pub mod bundle;
pub mod history;

pub use bundle::{format_age, format_bundle_entries, format_bundle_list, format_size};
pub use history::format_run_history;
