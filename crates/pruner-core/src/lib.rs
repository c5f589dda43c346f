pub mod config;
pub mod deletion;
pub mod entry;
pub mod error;
pub mod progress;
pub mod prune;
pub mod retention;
pub mod scanner;
pub mod series;

pub use config::AppConfig;
pub use deletion::execute_prune;
pub use entry::BackupEntry;
pub use error::Error;
pub use progress::{ProgressReporter, SilentReporter};
pub use prune::{list_entries_to_prune, plan_prune, PrunePlan, Survivor};
pub use retention::{classify_by_retention, Classification, Generation, GenerationBuckets, RetentionPolicy};
pub use scanner::{collect_entries, ScanOptions};
pub use series::{split_into_series, SeriesBuckets};
