use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::{debug, error};
use walkdir::WalkDir;

use crate::config::{AppConfig, DEFAULT_EXTENSION, DEFAULT_MIN_SIZE};
use crate::entry::BackupEntry;
use crate::error::Error;

/// Which files of a listing become backup entries.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub extension: String,
    pub min_size: u64,
    pub ignore_patterns: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            min_size: DEFAULT_MIN_SIZE,
            ignore_patterns: Vec::new(),
        }
    }
}

impl From<&AppConfig> for ScanOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            extension: config.extension.clone(),
            min_size: config.min_size,
            ignore_patterns: config.ignore_patterns.clone(),
        }
    }
}

/// Turn the paths given on the command line into backup entries.
///
/// - no paths: the current directory is listed
/// - a single directory: that directory is listed (not recursively)
/// - anything else: the paths are used as given
///
/// Candidates are sorted by path, then only names ending with the configured
/// extension and not matching an ignore pattern are kept.
pub fn collect_entries(paths: &[PathBuf], options: &ScanOptions) -> Result<Vec<BackupEntry>, Error> {
    let mut candidates: Vec<PathBuf> = match paths {
        [] => list_directory(Path::new("."))?
            .into_iter()
            .map(|path| path.strip_prefix(".").map(Path::to_path_buf).unwrap_or(path))
            .collect(),
        [dir] if dir.is_dir() => list_directory(dir)?,
        _ => paths.to_vec(),
    };
    candidates.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));

    let ignore_patterns = compile_patterns(&options.ignore_patterns);
    let total = candidates.len();

    let entries = candidates
        .into_iter()
        .filter(|path| path.to_string_lossy().ends_with(options.extension.as_str()))
        .filter(|path| !is_ignored(path, &ignore_patterns))
        .map(|path| BackupEntry::parse(path, options.min_size))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        "{} of {} candidate files match extension '{}'",
        entries.len(),
        total,
        options.extension
    );
    Ok(entries)
}

fn list_directory(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_dir() {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}

fn compile_patterns(globs: &[String]) -> Vec<Pattern> {
    globs
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect()
}

fn is_ignored(path: &Path, patterns: &[Pattern]) -> bool {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    patterns
        .iter()
        .any(|pattern| pattern.matches_path(path) || pattern.matches(&file_name))
}
