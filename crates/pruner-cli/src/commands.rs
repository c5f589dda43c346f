use clap::Parser;
use pruner_core::AppConfig;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pruner", version)]
#[command(
    about = "Prune backups and keep daily/weekly/monthly/yearly files",
    long_about = None
)]
pub struct Cli {
    /// Only consider the given files, or list the given directory; defaults to the current directory
    pub filenames: Vec<PathBuf>,

    /// Process only files with the given extension [default: gz.gpg]
    #[arg(short, long)]
    pub ext: Option<String>,

    /// Warn if a file is smaller than this many bytes; 0 to disable [default: 524288]
    #[arg(short, long)]
    pub size: Option<u64>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Only list the files that would be deleted
    #[arg(long)]
    pub dry_run: bool,

    /// The number of daily backups to keep [default: 7]
    #[arg(long)]
    pub daily: Option<u32>,

    /// The number of weekly backups to keep [default: 12]
    #[arg(long)]
    pub weekly: Option<u32>,

    /// The number of monthly backups to keep [default: 6]
    #[arg(long)]
    pub monthly: Option<u32>,

    /// The number of yearly backups to keep [default: 5]
    #[arg(long)]
    pub yearly: Option<u32>,
}

impl Cli {
    /// Command line flags take precedence over the configuration file and environment.
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(ext) = &self.ext {
            config.extension = ext.clone();
        }
        if let Some(size) = self.size {
            config.min_size = size;
        }
        if let Some(daily) = self.daily {
            config.retention.daily = daily;
        }
        if let Some(weekly) = self.weekly {
            config.retention.weekly = weekly;
        }
        if let Some(monthly) = self.monthly {
            config.retention.monthly = monthly;
        }
        if let Some(yearly) = self.yearly {
            config.retention.yearly = yearly;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pruner_core::RetentionPolicy;

    #[test]
    fn test_no_flags_keep_config() {
        let cli = Cli::try_parse_from(["pruner"]).unwrap();
        let mut config = AppConfig::default();
        cli.apply_to(&mut config);
        assert_eq!(config.extension, "gz.gpg");
        assert_eq!(config.retention, RetentionPolicy::default());
        assert!(cli.filenames.is_empty());
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "pruner", "-e", "tgz", "-s", "0", "--daily", "0", "--weekly", "4", "--monthly", "0",
            "--yearly", "2", "--dry-run", "-v", "/var/backups",
        ])
        .unwrap();
        let mut config = AppConfig::default();
        cli.apply_to(&mut config);

        assert_eq!(config.extension, "tgz");
        assert_eq!(config.min_size, 0);
        assert_eq!(config.retention, RetentionPolicy::new(0, 4, 0, 2));
        assert!(cli.dry_run);
        assert!(cli.verbose);
        assert_eq!(cli.filenames, vec![PathBuf::from("/var/backups")]);
    }

    #[test]
    fn test_negative_counts_are_rejected() {
        assert!(Cli::try_parse_from(["pruner", "--daily", "-1"]).is_err());
    }
}
