use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;

use crate::retention::RetentionPolicy;

pub const DEFAULT_EXTENSION: &str = "gz.gpg";
pub const DEFAULT_MIN_SIZE: u64 = 512 * 1024;
pub const DEFAULT_SAFETY_DELAY_SECS: u64 = 10;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Only file names ending with this suffix are considered.
    pub extension: String,
    /// Warn about files smaller than this many bytes; 0 disables the check.
    pub min_size: u64,
    pub safety_delay_secs: u64,
    pub ignore_patterns: Vec<String>,
    pub retention: RetentionPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            min_size: DEFAULT_MIN_SIZE,
            safety_delay_secs: DEFAULT_SAFETY_DELAY_SECS,
            ignore_patterns: Vec::new(),
            retention: RetentionPolicy::default(),
        }
    }
}

/// Load `Pruner.toml` (if present) overlaid with `PRUNER_*` environment variables.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Pruner").required(false))
        .add_source(
            Environment::with_prefix("PRUNER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
