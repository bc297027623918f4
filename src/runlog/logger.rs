//! Run log writer and reader
//!
//! Appends one `RunRecord` per line to `<dest>/archive.log`.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{ArchiveError, ArchiveResult};

use super::record::RunRecord;

/// Handles the append-only run log of a destination directory
///
/// The file is opened in append mode for every write and each record is
/// emitted with a single `write_all`, so concurrent writers never truncate or
/// split each other's lines.
pub struct RunLog {
    log_path: PathBuf,
}

impl RunLog {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Append a record and flush it
    pub fn append(&self, record: &RunRecord) -> ArchiveResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| self.write_failed(e))?;

        let mut line = record.to_line();
        line.push('\n');

        file.write_all(line.as_bytes())
            .map_err(|e| self.write_failed(e))?;
        file.flush().map_err(|e| self.write_failed(e))?;

        Ok(())
    }

    /// Read all records, oldest first
    ///
    /// Lines that do not parse are skipped with a warning so that one damaged
    /// entry never hides the rest of the history.
    pub fn read_all(&self) -> ArchiveResult<Vec<RunRecord>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path).map_err(|e| ArchiveError::io_at(&self.log_path, e))?;
        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| ArchiveError::io_at(&self.log_path, e))?;
            if line.trim().is_empty() {
                continue;
            }

            match RunRecord::parse_line(&line) {
                Ok(record) => records.push(record),
                Err(message) => warn!(
                    log = %self.log_path.display(),
                    line = index + 1,
                    "Skipping malformed run log entry: {}",
                    message
                ),
            }
        }

        Ok(records)
    }

    /// Read the most recent `count` records, oldest first
    pub fn read_recent(&self, count: usize) -> ArchiveResult<Vec<RunRecord>> {
        let mut records = self.read_all()?;
        let start = records.len().saturating_sub(count);
        Ok(records.split_off(start))
    }

    pub fn exists(&self) -> bool {
        self.log_path.exists()
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    fn write_failed(&self, err: std::io::Error) -> ArchiveError {
        ArchiveError::RunLogWriteFailed {
            path: self.log_path.clone(),
            message: err.to_string(),
        }
    }
}
