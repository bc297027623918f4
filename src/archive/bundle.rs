//! Bundle naming, writing and inspection
//!
//! A bundle is a gzip-compressed tar archive named
//! `logs_archive_<YYYYMMDD_HHMMSS>.tar.gz`. It is first written to a
//! `.partial` staging file in the destination directory, synced, and then
//! renamed into place, so the final path never holds an incomplete archive.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use tracing::debug;

use crate::error::{ArchiveError, ArchiveResult};

use super::selection::CandidateFile;

pub const BUNDLE_PREFIX: &str = "logs_archive_";
pub const BUNDLE_SUFFIX: &str = ".tar.gz";
pub const STAGING_SUFFIX: &str = ".partial";

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Metadata about a bundle found in a destination directory
#[derive(Debug, Clone, Serialize)]
pub struct BundleInfo {
    pub filename: String,
    pub path: PathBuf,
    /// Timestamp encoded in the file name
    pub created_at: DateTime<Utc>,
    /// Modification time on disk; retention is judged on this
    pub modified: DateTime<Utc>,
    pub size_bytes: u64,
}

/// A bundle that has been renamed into its final path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedBundle {
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// One member of a bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleEntry {
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Build a bundle file name; `sequence` 0 is the plain name
pub fn bundle_file_name(timestamp: DateTime<Utc>, sequence: u32) -> String {
    let stamp = timestamp.format(TIMESTAMP_FORMAT);
    if sequence == 0 {
        format!("{}{}{}", BUNDLE_PREFIX, stamp, BUNDLE_SUFFIX)
    } else {
        format!("{}{}_{}{}", BUNDLE_PREFIX, stamp, sequence, BUNDLE_SUFFIX)
    }
}

/// Parse the timestamp out of a bundle file name
///
/// Accepts `logs_archive_YYYYMMDD_HHMMSS.tar.gz` and the collision form
/// `logs_archive_YYYYMMDD_HHMMSS_N.tar.gz`.
pub fn parse_bundle_name(filename: &str) -> Option<DateTime<Utc>> {
    let stem = filename
        .strip_prefix(BUNDLE_PREFIX)?
        .strip_suffix(BUNDLE_SUFFIX)?;

    // YYYYMMDD_HHMMSS is 15 characters
    let (stamp, rest) = (stem.get(..15)?, stem.get(15..)?);
    if !rest.is_empty() {
        let sequence = rest.strip_prefix('_')?;
        if sequence.is_empty() || !sequence.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }

    let naive = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;
    Some(DateTime::from_naive_utc_and_offset(naive, Utc))
}

/// Staging path used while a bundle is being written
pub fn staging_path_for(final_path: &Path) -> PathBuf {
    let mut staging = final_path.as_os_str().to_owned();
    staging.push(STAGING_SUFFIX);
    PathBuf::from(staging)
}

/// Pick a final bundle path in `dest` that is not already taken
///
/// Two runs in the same second would otherwise share a name; the second one
/// gets a `_1`, `_2`, ... suffix.
pub fn next_bundle_path(dest: &Path, timestamp: DateTime<Utc>) -> PathBuf {
    let mut sequence = 0;
    loop {
        let candidate = dest.join(bundle_file_name(timestamp, sequence));
        if !candidate.exists() && !staging_path_for(&candidate).exists() {
            return candidate;
        }
        sequence += 1;
    }
}

/// Write a gzip tar of `files` into `writer`, storing each under its relative path
///
/// Each member is read from a single open handle. Its header size is the
/// length seen at open time and exactly that many bytes are copied, so a log
/// that keeps growing while it is archived still yields a consistent member.
pub fn write_bundle<W: Write>(writer: W, files: &[CandidateFile]) -> io::Result<W> {
    let encoder = GzEncoder::new(writer, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for file in files {
        let source = File::open(&file.path)?;
        let metadata = source.metadata()?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is no longer a regular file", file.path.display()),
            ));
        }

        let len = metadata.len();
        let mut header = tar::Header::new_gnu();
        header.set_metadata(&metadata);
        header.set_size(len);

        debug!(path = %file.relative_path.display(), size = len, "adding to bundle");
        builder.append_data(&mut header, &file.relative_path, MemberReader::new(source, len))?;
    }

    let encoder = builder.into_inner()?;
    encoder.finish()
}

/// Yields exactly `len` bytes of a member, failing if the source runs short
struct MemberReader<R> {
    inner: io::Take<R>,
}

impl<R: Read> MemberReader<R> {
    fn new(inner: R, len: u64) -> Self {
        Self {
            inner: inner.take(len),
        }
    }
}

impl<R: Read> Read for MemberReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let n = self.inner.read(buf)?;
        if n == 0 && self.inner.limit() > 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("file shrank by {} bytes while being archived", self.inner.limit()),
            ));
        }
        Ok(n)
    }
}

/// Write `files` to a staging file and atomically rename it to `final_path`
///
/// On any failure the staging file is removed and `final_path` is left
/// untouched.
pub fn commit_bundle(final_path: &Path, files: &[CandidateFile]) -> ArchiveResult<CommittedBundle> {
    let staging = staging_path_for(final_path);

    let staged = stage_bundle(&staging, files);
    let size_bytes = match staged {
        Ok(size) => size,
        Err(e) => {
            let _ = fs::remove_file(&staging);
            return Err(ArchiveError::bundle_write(final_path, e));
        }
    };

    fs::rename(&staging, final_path).map_err(|e| {
        let _ = fs::remove_file(&staging);
        ArchiveError::bundle_write(final_path, e)
    })?;

    Ok(CommittedBundle {
        path: final_path.to_path_buf(),
        size_bytes,
    })
}

fn stage_bundle(staging: &Path, files: &[CandidateFile]) -> io::Result<u64> {
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(staging)?;

    let writer = write_bundle(BufWriter::new(file), files)?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;

    // Sync to disk before rename
    file.sync_all()?;
    Ok(file.metadata()?.len())
}

/// Parse the timestamp out of a staging file name (`<bundle name>.partial`)
pub fn parse_staging_name(filename: &str) -> Option<DateTime<Utc>> {
    parse_bundle_name(filename.strip_suffix(STAGING_SUFFIX)?)
}

/// List all bundles in a destination directory, newest first
pub fn list_bundles(dest: &Path) -> ArchiveResult<Vec<BundleInfo>> {
    scan_dest(dest, parse_bundle_name)
}

/// List staging files left in a destination directory, newest first
///
/// A staging file only outlives its run when the run was interrupted before
/// the rename.
pub fn list_staging_files(dest: &Path) -> ArchiveResult<Vec<BundleInfo>> {
    scan_dest(dest, parse_staging_name)
}

fn scan_dest(
    dest: &Path,
    parse_name: fn(&str) -> Option<DateTime<Utc>>,
) -> ArchiveResult<Vec<BundleInfo>> {
    if !dest.exists() {
        return Ok(Vec::new());
    }

    let mut bundles = Vec::new();
    for entry in fs::read_dir(dest).map_err(|e| ArchiveError::io_at(dest, e))? {
        let entry = entry.map_err(|e| ArchiveError::io_at(dest, e))?;
        let filename = entry.file_name().to_string_lossy().to_string();

        let Some(created_at) = parse_name(&filename) else {
            continue;
        };

        let metadata = entry.metadata().map_err(|e| ArchiveError::io_at(&entry.path(), e))?;
        if !metadata.is_file() {
            continue;
        }

        bundles.push(BundleInfo {
            filename,
            path: entry.path(),
            created_at,
            modified: metadata.modified()?.into(),
            size_bytes: metadata.len(),
        });
    }

    bundles.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.filename.cmp(&a.filename))
    });

    Ok(bundles)
}

/// Read the member list of a bundle
///
/// Fails with `InvalidBundle` if the file is not a complete gzip tar.
pub fn inspect_bundle(path: &Path) -> ArchiveResult<Vec<BundleEntry>> {
    let file = File::open(path).map_err(|e| ArchiveError::io_at(path, e))?;
    let invalid = |e: io::Error| ArchiveError::InvalidBundle {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut archive = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
    let mut entries = Vec::new();

    for entry in archive.entries().map_err(invalid)? {
        let mut entry = entry.map_err(invalid)?;
        let member = entry.path().map_err(invalid)?.into_owned();
        let size_bytes = entry.header().size().map_err(invalid)?;

        // Read the body so truncation inside a member is detected
        let copied = io::copy(&mut entry, &mut io::sink()).map_err(invalid)?;
        if copied != size_bytes {
            return Err(ArchiveError::InvalidBundle {
                path: path.to_path_buf(),
                message: format!("member {} is truncated", member.display()),
            });
        }

        entries.push(BundleEntry {
            path: member,
            size_bytes,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::selection::test_support::write_aged;
    use chrono::{Datelike, TimeZone, Timelike};
    use tempfile::TempDir;

    fn candidate(source: &Path, relative: &str) -> CandidateFile {
        CandidateFile {
            path: source.join(relative),
            relative_path: PathBuf::from(relative),
            modified: Utc::now(),
            size_bytes: 0,
        }
    }

    /// Accepts `budget` bytes, then fails like a full disk
    struct FullDisk {
        budget: usize,
    }

    impl Write for FullDisk {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "no space left on device"));
            }
            let n = buf.len().min(self.budget);
            self.budget -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_bundle_file_name() {
        let ts = Utc.with_ymd_and_hms(2026, 10, 14, 3, 4, 5).unwrap();
        assert_eq!(bundle_file_name(ts, 0), "logs_archive_20261014_030405.tar.gz");
        assert_eq!(bundle_file_name(ts, 2), "logs_archive_20261014_030405_2.tar.gz");
    }

    #[test]
    fn test_parse_bundle_name() {
        let ts = parse_bundle_name("logs_archive_20261014_030405.tar.gz").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2026, 10, 14));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (3, 4, 5));

        assert!(parse_bundle_name("logs_archive_20261014_030405_3.tar.gz").is_some());
        assert!(parse_bundle_name("logs_archive_20261014_030405.tar.gz.partial").is_none());
        assert!(parse_bundle_name("logs_archive_20261014_030405_.tar.gz").is_none());
        assert!(parse_bundle_name("logs_archive_2026.tar.gz").is_none());
        assert!(parse_bundle_name("archive.log").is_none());
    }

    #[test]
    fn test_next_bundle_path_avoids_collision() {
        let temp_dir = TempDir::new().unwrap();
        let ts = Utc.with_ymd_and_hms(2026, 10, 14, 3, 4, 5).unwrap();

        let first = next_bundle_path(temp_dir.path(), ts);
        assert!(first.ends_with("logs_archive_20261014_030405.tar.gz"));
        fs::write(&first, "taken").unwrap();

        let second = next_bundle_path(temp_dir.path(), ts);
        assert!(second.ends_with("logs_archive_20261014_030405_1.tar.gz"));
    }

    #[test]
    fn test_commit_and_inspect() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        write_aged(&source.path().join("app.log"), "hello", 10);
        write_aged(&source.path().join("sub").join("db.log"), "world!", 10);

        let files = vec![candidate(source.path(), "app.log"), candidate(source.path(), "sub/db.log")];
        let final_path = dest.path().join("logs_archive_20261014_030405.tar.gz");

        let committed = commit_bundle(&final_path, &files).unwrap();
        assert_eq!(committed.path, final_path);
        assert_eq!(committed.size_bytes, fs::metadata(&final_path).unwrap().len());
        assert!(!staging_path_for(&final_path).exists());

        let entries = inspect_bundle(&final_path).unwrap();
        assert_eq!(
            entries,
            vec![
                BundleEntry { path: PathBuf::from("app.log"), size_bytes: 5 },
                BundleEntry { path: PathBuf::from("sub/db.log"), size_bytes: 6 },
            ]
        );
    }

    #[test]
    fn test_failed_write_leaves_no_bundle() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        write_aged(&source.path().join("app.log"), "hello", 10);

        // Second member vanished between selection and writing
        let files = vec![candidate(source.path(), "app.log"), candidate(source.path(), "gone.log")];
        let final_path = dest.path().join("logs_archive_20261014_030405.tar.gz");

        let err = commit_bundle(&final_path, &files).unwrap_err();
        assert!(matches!(err, ArchiveError::BundleWriteFailed { .. }));
        assert!(!final_path.exists());
        assert!(!staging_path_for(&final_path).exists());
        assert_eq!(fs::read_dir(dest.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_disk_full_surfaces_error() {
        let source = TempDir::new().unwrap();
        let noise: String = (0..50_000).map(|i| char::from(b'a' + (i * 7 % 26) as u8)).collect();
        write_aged(&source.path().join("big.log"), &noise, 10);

        let files = vec![candidate(source.path(), "big.log")];
        let result = write_bundle(FullDisk { budget: 8 }, &files);
        assert!(result.is_err());
    }

    #[test]
    fn test_list_bundles_newest_first() {
        let dest = TempDir::new().unwrap();
        fs::write(dest.path().join("logs_archive_20260101_000000.tar.gz"), "a").unwrap();
        fs::write(dest.path().join("logs_archive_20260301_000000.tar.gz"), "b").unwrap();
        fs::write(dest.path().join("logs_archive_20260301_000000_1.tar.gz"), "c").unwrap();
        fs::write(dest.path().join("archive.log"), "not a bundle").unwrap();
        fs::write(dest.path().join("logs_archive_20260401_000000.tar.gz.partial"), "x").unwrap();

        let bundles = list_bundles(dest.path()).unwrap();
        let names: Vec<&str> = bundles.iter().map(|b| b.filename.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "logs_archive_20260301_000000_1.tar.gz",
                "logs_archive_20260301_000000.tar.gz",
                "logs_archive_20260101_000000.tar.gz",
            ]
        );
    }

    #[test]
    fn test_list_staging_files() {
        let dest = TempDir::new().unwrap();
        fs::write(dest.path().join("logs_archive_20260101_000000.tar.gz"), "a").unwrap();
        fs::write(dest.path().join("logs_archive_20260401_000000.tar.gz.partial"), "x").unwrap();
        fs::write(dest.path().join("logs_archive_20260401_000000_2.tar.gz.partial"), "y").unwrap();
        fs::write(dest.path().join("unrelated.partial"), "z").unwrap();

        let staged = list_staging_files(dest.path()).unwrap();
        let names: Vec<&str> = staged.iter().map(|b| b.filename.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "logs_archive_20260401_000000_2.tar.gz.partial",
                "logs_archive_20260401_000000.tar.gz.partial",
            ]
        );
        assert!(parse_staging_name("logs_archive_20260401_000000.tar.gz").is_none());
    }

    #[test]
    fn test_member_keeps_source_metadata() {
        let source = TempDir::new().unwrap();
        write_aged(&source.path().join("app.log"), "hello", 10);
        let mtime = fs::metadata(source.path().join("app.log")).unwrap().modified().unwrap();

        let bytes = write_bundle(Vec::new(), &[candidate(source.path(), "app.log")]).unwrap();
        let mut archive = tar::Archive::new(GzDecoder::new(&bytes[..]));
        let mut entries = archive.entries().unwrap();
        let mut entry = entries.next().unwrap().unwrap();

        let header_mtime = entry.header().mtime().unwrap();
        let expected = mtime.duration_since(std::time::UNIX_EPOCH).unwrap().as_secs();
        assert_eq!(header_mtime, expected);
        assert_eq!(entry.header().size().unwrap(), 5);

        let mut body = String::new();
        entry.read_to_string(&mut body).unwrap();
        assert_eq!(body, "hello");
        assert!(entries.next().is_none());
    }

    #[test]
    fn test_member_reader_stops_at_opened_length() {
        let mut out = Vec::new();
        let copied = io::copy(&mut MemberReader::new(&b"hello, growing log"[..], 5), &mut out).unwrap();
        assert_eq!(copied, 5);
        assert_eq!(out, b"hello");
    }

    #[test]
    fn test_member_reader_rejects_shrunk_source() {
        let err = io::copy(&mut MemberReader::new(&b"abc"[..], 10), &mut io::sink()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_list_bundles_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        assert!(list_bundles(&temp_dir.path().join("none")).unwrap().is_empty());
    }

    #[test]
    fn test_inspect_rejects_truncated_bundle() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let noise: String = (0..20_000).map(|i| char::from(b'a' + (i * 13 % 26) as u8)).collect();
        write_aged(&source.path().join("app.log"), &noise, 10);

        let final_path = dest.path().join("logs_archive_20261014_030405.tar.gz");
        commit_bundle(&final_path, &[candidate(source.path(), "app.log")]).unwrap();

        let bytes = fs::read(&final_path).unwrap();
        let truncated = dest.path().join("truncated.tar.gz");
        fs::write(&truncated, &bytes[..bytes.len() / 2]).unwrap();

        let err = inspect_bundle(&truncated).unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidBundle { .. }));
    }
}
