//! The declared index configuration on disk.

use crate::error::StoreError;
use indexctl_core::model::IndexSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Loads and replaces the local index configuration file.
///
/// The file is only ever replaced wholesale; partial edits are the
/// operator's job.
pub struct LocalIndexStore {
    path: PathBuf,
}

impl LocalIndexStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration. A missing file is bootstrapped with the
    /// empty set so first runs succeed; a present but malformed file is
    /// a fatal configuration error.
    pub fn load(&self) -> Result<IndexSet, StoreError> {
        if !self.path.exists() {
            let empty = IndexSet::default();
            self.save(&empty)?;
            return Ok(empty);
        }
        let data = fs::read_to_string(&self.path)?;
        serde_json::from_str(&data).map_err(|source| StoreError::ConfigFormat {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the file atomically: temp file in the same directory,
    /// then rename.
    pub fn save(&self, set: &IndexSet) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(set)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}
