use crate::entry::BackupEntry;

/// Trait for reporting deletion progress.
///
/// CLI implements with indicatif. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_delete_start(&self, _total: usize) {}
    fn on_entry_deleted(&self, _entry: &BackupEntry, _deleted: usize) {}
    fn on_delete_complete(&self, _deleted: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
