//! Bundle display formatting
//!
//! Formats bundle listings and bundle contents for terminal output.

use chrono::{DateTime, Duration, Utc};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::archive::{BundleEntry, BundleInfo};

#[derive(Tabled)]
struct BundleRow {
    #[tabled(rename = "Bundle")]
    filename: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Age")]
    age: String,
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Size")]
    size: String,
}

/// Format a list of bundles as a table
pub fn format_bundle_list(bundles: &[BundleInfo], now: DateTime<Utc>) -> String {
    if bundles.is_empty() {
        return "No bundles found.".to_string();
    }

    let rows = bundles.iter().map(|b| BundleRow {
        filename: b.filename.clone(),
        created: b.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        size: format_size(b.size_bytes),
        age: format_age(now.signed_duration_since(b.modified)),
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());

    let total: u64 = bundles.iter().map(|b| b.size_bytes).sum();
    format!(
        "{}\n\nTotal: {} bundle(s), {}",
        table,
        bundles.len(),
        format_size(total)
    )
}

/// Format the members of one bundle as a table
pub fn format_bundle_entries(entries: &[BundleEntry]) -> String {
    if entries.is_empty() {
        return "Bundle is empty.".to_string();
    }

    let rows = entries.iter().map(|e| EntryRow {
        path: e.path.display().to_string(),
        size: format_size(e.size_bytes),
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n\n{} file(s)", table, entries.len())
}

/// Format a duration in human-readable form
pub fn format_age(duration: Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    format!("{}d", hours / 24)
}

/// Format a file size in human-readable form
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
