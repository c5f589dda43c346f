use std::fs;
use std::time::Instant;
use tracing::{debug, info};

use crate::entry::BackupEntry;
use crate::error::Error;
use crate::progress::ProgressReporter;

/// Remove the given entries from disk, in order. Returns the number removed.
///
/// Stops at the first failure: entries already removed stay removed and the
/// remaining ones are not attempted.
pub fn execute_prune(
    entries: &[BackupEntry],
    reporter: &dyn ProgressReporter,
) -> Result<usize, Error> {
    let start = Instant::now();
    reporter.on_delete_start(entries.len());

    let mut deleted = 0;
    for entry in entries {
        let path = entry.original_path();
        fs::remove_file(path).map_err(|source| Error::Delete {
            path: path.to_path_buf(),
            source,
        })?;
        deleted += 1;
        debug!("removed: {}", path.display());
        reporter.on_entry_deleted(entry, deleted);
    }

    let duration = start.elapsed();
    reporter.on_delete_complete(deleted, duration.as_secs_f64());
    info!("Deleted {} files in {:.2}s", deleted, duration.as_secs_f64());
    Ok(deleted)
}
