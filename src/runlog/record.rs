//! Run record data structure
//!
//! Defines one line of the run log and its text encoding.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::Serialize;

use crate::config::request::RetentionPolicy;

const FIELD_SEPARATOR: &str = " | ";
const NO_BUNDLE: &str = "-";

/// A single run log entry
///
/// Records the outcome of one archival invocation, including runs that found
/// nothing to archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunRecord {
    /// When the run started (UTC, second precision)
    pub timestamp: DateTime<Utc>,

    /// Canonical source directory
    pub source_dir: PathBuf,

    /// Committed bundle, or `None` when nothing was archived
    pub bundle_path: Option<PathBuf>,

    /// Byte size of the committed bundle
    pub size_bytes: u64,

    /// Number of files in the bundle
    pub file_count: usize,

    pub delete_originals: bool,
    pub retain_logs_days: u32,
    pub retain_archives_days: u32,
}

impl RunRecord {
    /// Create a record for a run that archived nothing
    pub fn new(timestamp: DateTime<Utc>, source_dir: &Path, policy: &RetentionPolicy) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(0),
            source_dir: source_dir.to_path_buf(),
            bundle_path: None,
            size_bytes: 0,
            file_count: 0,
            delete_originals: policy.delete_originals,
            retain_logs_days: policy.retain_logs_days,
            retain_archives_days: policy.retain_archives_days,
        }
    }

    /// Attach the committed bundle to this record
    pub fn with_bundle(mut self, bundle_path: &Path, size_bytes: u64, file_count: usize) -> Self {
        self.bundle_path = Some(bundle_path.to_path_buf());
        self.size_bytes = size_bytes;
        self.file_count = file_count;
        self
    }

    /// Encode as a single run log line (without the trailing newline)
    ///
    /// Path values are escaped so that a `|`, `\` or line break inside a
    /// path can never be mistaken for a field separator or end of record.
    pub fn to_line(&self) -> String {
        let bundle = self
            .bundle_path
            .as_ref()
            .map(|p| escape_value(&p.display().to_string()))
            .unwrap_or_else(|| NO_BUNDLE.to_string());

        [
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            format!("source={}", escape_value(&self.source_dir.display().to_string())),
            format!("bundle={}", bundle),
            format!("size={}", self.size_bytes),
            format!("files={}", self.file_count),
            format!("delete_originals={}", self.delete_originals),
            format!("keep_logs_days={}", self.retain_logs_days),
            format!("keep_archives_days={}", self.retain_archives_days),
        ]
        .join(FIELD_SEPARATOR)
    }

    /// Parse a line written by `to_line`
    pub fn parse_line(line: &str) -> Result<Self, String> {
        let mut fields = line.split(FIELD_SEPARATOR);

        let timestamp = fields.next().ok_or("empty line")?;
        let timestamp = DateTime::parse_from_rfc3339(timestamp.trim())
            .map_err(|e| format!("bad timestamp '{}': {}", timestamp, e))?
            .with_timezone(&Utc);

        let mut source_dir = None;
        let mut bundle_path = None;
        let mut size_bytes = None;
        let mut file_count = None;
        let mut delete_originals = None;
        let mut retain_logs_days = None;
        let mut retain_archives_days = None;

        for field in fields {
            let (key, value) = field
                .split_once('=')
                .ok_or_else(|| format!("field without value: '{}'", field))?;
            match key {
                "source" => source_dir = Some(PathBuf::from(unescape_value(value)?)),
                "bundle" => {
                    bundle_path = Some(if value == NO_BUNDLE {
                        None
                    } else {
                        Some(PathBuf::from(unescape_value(value)?))
                    })
                }
                "size" => size_bytes = Some(parse_number(key, value)?),
                "files" => file_count = Some(parse_number(key, value)?),
                "delete_originals" => {
                    delete_originals = Some(
                        value
                            .parse::<bool>()
                            .map_err(|_| format!("bad delete_originals '{}'", value))?,
                    )
                }
                "keep_logs_days" => retain_logs_days = Some(parse_number(key, value)?),
                "keep_archives_days" => retain_archives_days = Some(parse_number(key, value)?),
                // Unknown keys are tolerated for forward compatibility
                _ => {}
            }
        }

        Ok(Self {
            timestamp,
            source_dir: source_dir.ok_or("missing source")?,
            bundle_path: bundle_path.ok_or("missing bundle")?,
            size_bytes: size_bytes.ok_or("missing size")?,
            file_count: file_count.unwrap_or(0),
            delete_originals: delete_originals.ok_or("missing delete_originals")?,
            retain_logs_days: retain_logs_days.ok_or("missing keep_logs_days")?,
            retain_archives_days: retain_archives_days.ok_or("missing keep_archives_days")?,
        })
    }
}

/// Backslash-escape `\\`, `|`, `\n` and `\r`
///
/// A literal `-` path is written as `\-` so it cannot be read back as the
/// empty bundle marker.
fn escape_value(value: &str) -> String {
    if value == NO_BUNDLE {
        return format!("\\{}", NO_BUNDLE);
    }

    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '|' => escaped.push_str("\\|"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn unescape_value(value: &str) -> Result<String, String> {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => unescaped.push('\\'),
            Some('|') => unescaped.push('|'),
            Some('n') => unescaped.push('\n'),
            Some('r') => unescaped.push('\r'),
            Some('-') => unescaped.push('-'),
            Some(other) => return Err(format!("unknown escape '\\{}' in '{}'", other, value)),
            None => return Err(format!("dangling escape in '{}'", value)),
        }
    }
    Ok(unescaped)
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("bad {} '{}'", key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 14, 3, 0, 0).unwrap()
    }

    #[test]
    fn test_line_format() {
        let record = RunRecord::new(
            sample_time(),
            Path::new("/var/log/app"),
            &RetentionPolicy::default(),
        )
        .with_bundle(
            Path::new("/var/log/app-archives/logs_archive_20261014_030000.tar.gz"),
            5120,
            3,
        );

        assert_eq!(
            record.to_line(),
            "2026-10-14T03:00:00Z | source=/var/log/app \
             | bundle=/var/log/app-archives/logs_archive_20261014_030000.tar.gz \
             | size=5120 | files=3 | delete_originals=false | keep_logs_days=7 \
             | keep_archives_days=30"
        );
    }

    #[test]
    fn test_zero_file_record_parses_back() {
        let record = RunRecord::new(
            sample_time(),
            Path::new("/var/log/app"),
            &RetentionPolicy::default(),
        );
        let line = record.to_line();
        assert!(line.contains("bundle=- "));

        let parsed = RunRecord::parse_line(&line).unwrap();
        assert_eq!(parsed, record);
        assert!(parsed.bundle_path.is_none());
    }

    #[test]
    fn test_subseconds_truncated() {
        let time = sample_time() + chrono::Duration::milliseconds(750);
        let record = RunRecord::new(time, Path::new("/x"), &RetentionPolicy::default());
        assert_eq!(record.timestamp, sample_time());
    }

    #[test]
    fn test_separator_and_newline_in_paths_round_trip() {
        let record = RunRecord::new(
            sample_time(),
            Path::new("/srv/app | prod\nblue\\green"),
            &RetentionPolicy::default(),
        )
        .with_bundle(
            Path::new("/srv/app | prod-archives/logs_archive_20261014_030000.tar.gz"),
            42,
            2,
        );

        let line = record.to_line();
        assert!(!line.contains('\n'));
        assert!(line.contains("source=/srv/app \\| prod\\nblue\\\\green | bundle="));

        let parsed = RunRecord::parse_line(&line).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_dash_path_is_not_the_empty_marker() {
        let record = RunRecord::new(sample_time(), Path::new("/x"), &RetentionPolicy::default())
            .with_bundle(Path::new("-"), 1, 1);

        let parsed = RunRecord::parse_line(&record.to_line()).unwrap();
        assert_eq!(parsed.bundle_path.as_deref(), Some(Path::new("-")));
    }

    #[test]
    fn test_parse_rejects_bad_escape() {
        let line = RunRecord::new(sample_time(), Path::new("/x"), &RetentionPolicy::default())
            .to_line()
            .replace("source=/x", "source=/x\\q");
        assert!(RunRecord::parse_line(&line).is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(RunRecord::parse_line("not a record").is_err());
        assert!(RunRecord::parse_line("2026-10-14T03:00:00Z | source=/x").is_err());
    }
}
