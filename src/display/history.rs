//! Run history display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::runlog::RunRecord;

use super::bundle::format_size;

#[derive(Tabled)]
struct RunRow {
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Files")]
    files: usize,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Bundle")]
    bundle: String,
    #[tabled(rename = "Delete")]
    delete: &'static str,
    #[tabled(rename = "Keep logs/archives")]
    keep: String,
}

/// Format run records as a table, oldest first
pub fn format_run_history(records: &[RunRecord]) -> String {
    if records.is_empty() {
        return "No runs recorded.".to_string();
    }

    let rows = records.iter().map(|r| RunRow {
        when: r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        files: r.file_count,
        size: format_size(r.size_bytes),
        bundle: r
            .bundle_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "-".to_string()),
        delete: if r.delete_originals { "yes" } else { "no" },
        keep: format!("{}d/{}d", r.retain_logs_days, r.retain_archives_days),
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    table.to_string()
}
