//! Grouping of backup entries into series.
//!
//! A directory often holds several recurring backup jobs side by side:
//!
//! ```text
//! db-backup-2023-01-01-020000.gz.gpg
//! db-backup-2023-01-02-020000.gz.gpg
//! mail-backup-2023-01-01-030000.gz.gpg
//! 2023-01-01-040000.gz.gpg
//! ```
//!
//! Entries are grouped by the part of the name that surrounds the date stamp,
//! so the above yields the series `db-backup`, `mail-backup` and `default`.
//! The key inference is a best-effort heuristic: the longer side of the name
//! around the date is taken as the label, which can guess wrong for very
//! short names.

use std::collections::BTreeMap;

use crate::entry::BackupEntry;

/// Key used for entries whose name is nothing but a date stamp.
pub const DEFAULT_SERIES: &str = "default";

/// Series key → entries, each list in the order the entries were given.
pub type SeriesBuckets = BTreeMap<String, Vec<BackupEntry>>;

/// Derive the series key of an entry from its normalized stem.
///
/// Undated entries form their own series keyed by the whole normalized stem.
pub fn series_key(entry: &BackupEntry) -> String {
    let name = entry.normalized_stem();
    let Some((start, end)) = entry.date_span() else {
        return name.to_string();
    };

    let text_after = name.len().saturating_sub(end);
    if start > text_after {
        key_from_prefix(name, start)
    } else {
        key_from_suffix(name, end)
    }
}

/// The label precedes the date: `db-backup-2023-01-01` → `db-backup`.
fn key_from_prefix(name: &str, start: usize) -> String {
    let mut start = start.min(name.len());
    if start > 1 && name.as_bytes()[start - 1] == b'-' {
        start -= 1;
    }
    name.get(..start).unwrap_or(name).to_string()
}

/// The label follows the date: `2023-01-01-backup-db` → `backup-db`.
fn key_from_suffix(name: &str, end: usize) -> String {
    let mut end = end;
    if end < name.len() && name.as_bytes()[end] == b'-' {
        end += 1;
    }
    match name.get(end..) {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => DEFAULT_SERIES.to_string(),
    }
}

/// Split entries into series. Every entry lands in exactly one series and
/// keeps its relative order, which later decides the survivor of each slot.
pub fn split_into_series(entries: &[BackupEntry]) -> SeriesBuckets {
    let mut buckets = SeriesBuckets::new();
    for entry in entries {
        buckets
            .entry(series_key(entry))
            .or_default()
            .push(entry.clone());
    }
    buckets
}
