use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("core error: {0}")]
    Core(#[from] indexctl_core::error::CoreError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration file {path} is not a valid index configuration: {source}")]
    ConfigFormat {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("remote fetch failed: {0}")]
    Fetch(String),

    #[error("backup failed: {0}")]
    Backup(String),

    #[error("deploy failed: {0}")]
    Deploy(String),
}
