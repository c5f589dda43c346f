use indicatif::{ProgressBar, ProgressStyle};
use pruner_core::{BackupEntry, ProgressReporter};
use std::sync::Mutex;

/// Progress bar shown while files are being removed.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_delete_start(&self, total: usize) {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} Deleting [{bar:30.red/dim}] {pos}/{len} {wide_msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("━╸─"),
        );
        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(pb);
        }
    }

    fn on_entry_deleted(&self, entry: &BackupEntry, deleted: usize) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.set_message(entry.base_name().to_string());
                pb.set_position(deleted as u64);
            }
        }
    }

    fn on_delete_complete(&self, deleted: usize, duration_secs: f64) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
        eprintln!(
            "  \x1b[32m✓\x1b[0m Removed {} files in {:.2}s",
            deleted, duration_secs
        );
    }
}
