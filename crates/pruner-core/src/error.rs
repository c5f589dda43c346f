use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// An empty candidate list was handed to the prune planner. This is a
    /// caller mistake and is distinct from "nothing to prune".
    #[error("No backup entries given to plan pruning")]
    EmptyInput,

    #[error("Failed to remove '{}': {source}", .path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
