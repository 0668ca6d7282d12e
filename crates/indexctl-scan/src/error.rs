use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: globset::Error,
    },

    #[error("failed to parse {file}: {message}")]
    Parse { file: PathBuf, message: String },
}
