use indicatif::HumanBytes;
use std::fmt;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::Error;

/// Characters allowed in the time part that may follow a date stamp.
const TIME_CHARS: &[u8] = b"0123456789:_-";
const MIN_TIME_LEN: usize = 6;
const MAX_TIME_LEN: usize = 10;

/// A calendar date found inside a file name.
///
/// `start..end` is the byte span of the whole match within the scanned text,
/// including an embedded time part if one was consumed. `identity` is the
/// canonical `YYYY-MM-DD` form. Day-of-month is range checked (01-31) but not
/// checked against the month, so `2022-02-31` is kept as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateStamp {
    pub start: usize,
    pub end: usize,
    pub identity: String,
}

/// Find the first date stamp in `text`, scanning left to right.
///
/// Recognized layout: a year 1900-2099, an optional `-`/`_`, a month 01-12,
/// an optional `-`/`_`, a day 01-31. If 6 to 10 characters of `[0-9:_-]`
/// follow, they are taken as a time and included in the span (at most 10).
pub fn scan_date_stamp(text: &str) -> Option<DateStamp> {
    let bytes = text.as_bytes();
    (0..bytes.len()).find_map(|start| match_date_at(bytes, start))
}

fn match_date_at(bytes: &[u8], start: usize) -> Option<DateStamp> {
    let year = digits(bytes, start, 4)?;
    if !(year.starts_with("19") || year.starts_with("20")) {
        return None;
    }
    let mut pos = skip_separator(bytes, start + 4);

    let month = digits(bytes, pos, 2)?;
    if !(1..=12).contains(&month.parse::<u8>().ok()?) {
        return None;
    }
    pos = skip_separator(bytes, pos + 2);

    let day = digits(bytes, pos, 2)?;
    if !(1..=31).contains(&day.parse::<u8>().ok()?) {
        return None;
    }
    pos += 2;

    let time_len = bytes[pos..]
        .iter()
        .take(MAX_TIME_LEN)
        .take_while(|b| TIME_CHARS.contains(*b))
        .count();
    if time_len >= MIN_TIME_LEN {
        pos += time_len;
    }

    Some(DateStamp {
        start,
        end: pos,
        identity: format!("{}-{}-{}", year, month, day),
    })
}

fn digits(bytes: &[u8], at: usize, len: usize) -> Option<&str> {
    let slice = bytes.get(at..at + len)?;
    if !slice.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(slice).ok()
}

fn skip_separator(bytes: &[u8], at: usize) -> usize {
    match bytes.get(at) {
        Some(b'-') | Some(b'_') => at + 1,
        _ => at,
    }
}

/// One candidate backup file.
///
/// Two entries are equal when they were created from the same path.
#[derive(Debug, Clone)]
pub struct BackupEntry {
    original_path: PathBuf,
    base_name: String,
    stem: String,
    normalized_stem: String,
    date_stamp: Option<DateStamp>,
    size: Option<u64>,
}

impl BackupEntry {
    /// Build the entry identity from a path without touching the filesystem.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let base_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let stem = base_name.split('.').next().unwrap_or_default().to_string();
        let normalized_stem = stem.replace('_', "-");
        let date_stamp = scan_date_stamp(&base_name);

        Self {
            original_path: path.to_path_buf(),
            base_name,
            stem,
            normalized_stem,
            date_stamp,
            size: None,
        }
    }

    /// Build the entry and, when `min_size` is nonzero, read the file size and
    /// warn if the file is smaller than `min_size`. A small file usually
    /// points at a failing backup job; it is still processed normally.
    pub fn parse(path: impl AsRef<Path>, min_size: u64) -> Result<Self, Error> {
        let mut entry = Self::from_path(path);
        if min_size > 0 {
            let size = fs::metadata(&entry.original_path)?.len();
            entry.size = Some(size);
            if entry.is_undersized(min_size) {
                warn!(
                    "File {} is too small ({}), indicating a potentially failing backup!",
                    entry.original_path.display(),
                    HumanBytes(size)
                );
            }
        }
        Ok(entry)
    }

    pub fn original_path(&self) -> &Path {
        &self.original_path
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Base name with every extension removed.
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Stem with underscores rewritten to dashes.
    pub fn normalized_stem(&self) -> &str {
        &self.normalized_stem
    }

    pub fn date_stamp(&self) -> Option<&DateStamp> {
        self.date_stamp.as_ref()
    }

    pub fn date_span(&self) -> Option<(usize, usize)> {
        self.date_stamp.as_ref().map(|ds| (ds.start, ds.end))
    }

    /// Canonical `YYYY-MM-DD`, or an empty string when the name has no date.
    pub fn date_identity(&self) -> &str {
        self.date_stamp
            .as_ref()
            .map(|ds| ds.identity.as_str())
            .unwrap_or("")
    }

    /// Size in bytes, if it was read while parsing.
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn is_undersized(&self, min_size: u64) -> bool {
        matches!(self.size, Some(size) if size < min_size)
    }

    /// Whether this entry belongs to the day rendered as `day_stamp` (`YYYY-MM-DD`).
    ///
    /// Names with dashed or underscored dates match through the normalized stem.
    /// Compact stamps (`20221216...`) only match through their date identity.
    pub fn matches_day(&self, day_stamp: &str) -> bool {
        self.normalized_stem.contains(day_stamp) || self.date_identity() == day_stamp
    }
}

impl PartialEq for BackupEntry {
    fn eq(&self, other: &Self) -> bool {
        self.original_path == other.original_path
    }
}

impl Eq for BackupEntry {}

impl Hash for BackupEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.original_path.hash(state);
    }
}

impl fmt::Display for BackupEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn identity(name: &str) -> String {
        BackupEntry::from_path(name).date_identity().to_string()
    }

    #[test]
    fn test_date_with_time_suffix() {
        assert_eq!(identity("db-backup_2022-12-16-17-28-25.gz.gpg"), "2022-12-16");
        assert_eq!(identity("db-backup_2022-12-16-17:28:25.gz.gpg"), "2022-12-16");
        assert_eq!(identity("db-backup_20221216172825.gz.gpg"), "2022-12-16");
        assert_eq!(identity("db-backup_2022121617:28:25.gz.gpg"), "2022-12-16");
    }

    #[test]
    fn test_date_at_start_of_name() {
        assert_eq!(identity("2022-12-16-17-28-25_db_backup.gz.gpg"), "2022-12-16");
        assert_eq!(identity("2022-12-16-17:28:25_db_backup.gz.gpg"), "2022-12-16");
        assert_eq!(identity("20221216172825_db_backup.gz.gpg"), "2022-12-16");
        assert_eq!(identity("2022121617:28:25_db_backup.gz.gpg"), "2022-12-16");
        assert_eq!(identity("2022-12-16-17-28-25.gz.gpg"), "2022-12-16");
        assert_eq!(identity("20221216172825.gz.gpg"), "2022-12-16");
    }

    #[test]
    fn test_underscore_separators() {
        assert_eq!(identity("mail_2023_01_02_120000.gz.gpg"), "2023-01-02");
    }

    #[test]
    fn test_invalid_calendar_days_are_kept() {
        assert_eq!(identity("db-backup_2022-02-28-17-28-25.gz.gpg"), "2022-02-28");
        assert_eq!(identity("db-backup_2022-02-29-17-28-25.gz.gpg"), "2022-02-29");
        assert_eq!(identity("db-backup_2022-02-30-17-28-25.gz.gpg"), "2022-02-30");
        assert_eq!(identity("db-backup_2022-02-31-17-28-25.gz.gpg"), "2022-02-31");
        assert_eq!(identity("x-2022-02-31-000000.gz.gpg"), "2022-02-31");
    }

    #[test]
    fn test_out_of_range_fields_do_not_match() {
        assert_eq!(identity("db-backup_2022-02-32-17-28-25.gz.gpg"), "");
        assert_eq!(identity("db-backup_2022-13-01-17-28-25.gz.gpg"), "");
        assert_eq!(identity("db-backup_2022-00-10-17-28-25.gz.gpg"), "");
        assert_eq!(identity("db-backup_1899-12-16-17-28-25.gz.gpg"), "");
        assert_eq!(identity("db-backup_2122-12-16-17-28-25.gz.gpg"), "");
        assert_eq!(identity("db-backup.gz.gpg"), "");
    }

    #[test]
    fn test_time_part_is_optional() {
        let entry = BackupEntry::from_path("db-backup-2023-01-01.tgz");
        assert_eq!(entry.date_identity(), "2023-01-01");
        assert_eq!(entry.date_span(), Some((10, 20)));
    }

    #[test]
    fn test_span_includes_time_up_to_ten_chars() {
        let entry = BackupEntry::from_path("db-backup_2022-12-16-17-28-25.gz.gpg");
        assert_eq!(entry.date_span(), Some((10, 29)));

        // "-17-28-25-" is ten characters, the trailing "backup" is not consumed
        let entry = BackupEntry::from_path("2022-12-16-17-28-25-backup-db.gz.gpg");
        assert_eq!(entry.date_span(), Some((0, 20)));

        // fewer than six time characters: the span stops after the day
        let entry = BackupEntry::from_path("db-2022-12-16-1.gz.gpg");
        assert_eq!(entry.date_span(), Some((3, 13)));
    }

    #[test]
    fn test_first_match_wins() {
        let entry = BackupEntry::from_path("2023-01-05-120000-copy-of-2022-12-01-120000.gz.gpg");
        assert_eq!(entry.date_identity(), "2023-01-05");
    }

    #[test]
    fn test_name_parts() {
        let entry = BackupEntry::from_path("/var/backups/db_backup_2022-12-16-17-28-25.gz.gpg");
        assert_eq!(
            entry.original_path(),
            Path::new("/var/backups/db_backup_2022-12-16-17-28-25.gz.gpg")
        );
        assert_eq!(entry.base_name(), "db_backup_2022-12-16-17-28-25.gz.gpg");
        assert_eq!(entry.stem(), "db_backup_2022-12-16-17-28-25");
        assert_eq!(entry.normalized_stem(), "db-backup-2022-12-16-17-28-25");
        assert_eq!(entry.to_string(), "db_backup_2022-12-16-17-28-25.gz.gpg");
        assert!(entry.size().is_none());
    }

    #[test]
    fn test_non_ascii_name() {
        let entry = BackupEntry::from_path("zálohа-2023-03-04-101010.gz.gpg");
        assert_eq!(entry.date_identity(), "2023-03-04");
    }

    #[test]
    fn test_equality_by_original_path() {
        let a = BackupEntry::from_path("a/x-2023-01-01-000000.gz.gpg");
        let b = BackupEntry::from_path("b/x-2023-01-01-000000.gz.gpg");
        let c = BackupEntry::from_path("a/x-2023-01-01-000000.gz.gpg");
        assert_ne!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.base_name(), b.base_name());
    }

    #[test]
    fn test_matches_day() {
        let dashed = BackupEntry::from_path("db_2023_01_02_000000.gz.gpg");
        assert!(dashed.matches_day("2023-01-02"));
        assert!(!dashed.matches_day("2023-01-03"));

        let compact = BackupEntry::from_path("db_20230102000000.gz.gpg");
        assert!(compact.matches_day("2023-01-02"));
        assert!(!compact.matches_day("2023-01-01"));
    }

    #[test]
    fn test_parse_records_size_and_flags_small_files() {
        let dir = tempdir().unwrap();
        let small = dir.path().join("small-2023-01-01-000000.gz.gpg");
        let large = dir.path().join("large-2023-01-01-000000.gz.gpg");
        fs::write(&small, b"tiny").unwrap();
        let mut f = fs::File::create(&large).unwrap();
        f.write_all(&vec![0u8; 2048]).unwrap();

        let entry = BackupEntry::parse(&small, 1024).unwrap();
        assert_eq!(entry.size(), Some(4));
        assert!(entry.is_undersized(1024));

        let entry = BackupEntry::parse(&large, 1024).unwrap();
        assert_eq!(entry.size(), Some(2048));
        assert!(!entry.is_undersized(1024));
    }

    #[test]
    fn test_parse_without_min_size_skips_filesystem() {
        let entry = BackupEntry::parse("/does/not/exist-2023-01-01-000000.gz.gpg", 0).unwrap();
        assert!(entry.size().is_none());
        assert_eq!(entry.date_identity(), "2023-01-01");
    }

    #[test]
    fn test_parse_missing_file_with_min_size_is_io_error() {
        let result = BackupEntry::parse("/does/not/exist-2023-01-01-000000.gz.gpg", 10);
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
