//! Pre-write snapshots of index configurations.

use crate::error::StoreError;
use chrono::Utc;
use indexctl_core::model::IndexSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

pub const DEFAULT_RETENTION: usize = 5;

/// Which side of the sync a snapshot preserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupKind {
    Local,
    Remote,
}

impl BackupKind {
    fn prefix(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

/// Writes timestamped configuration snapshots and rotates old ones.
///
/// A failed snapshot is fatal to the caller: the synchronizer must not
/// touch the target until the backup exists.
pub struct BackupManager {
    dir: PathBuf,
    keep: usize,
}

impl BackupManager {
    pub fn new(dir: impl Into<PathBuf>, keep: usize) -> Self {
        Self {
            dir: dir.into(),
            keep,
        }
    }

    /// Snapshot `set` and prune older snapshots of the same kind beyond
    /// the retention count. Returns the snapshot path.
    pub fn backup(&self, kind: BackupKind, set: &IndexSet) -> Result<PathBuf, StoreError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| StoreError::Backup(format!("cannot create {}: {e}", self.dir.display())))?;

        let stamp = Utc::now().format("%Y%m%dT%H%M%S%3f").to_string();
        let mut path = self.dir.join(format!("{}-{stamp}.json", kind.prefix()));
        // Same-millisecond snapshots get a sequence suffix instead of
        // clobbering each other.
        let mut seq = 1;
        while path.exists() {
            path = self
                .dir
                .join(format!("{}-{stamp}-{seq}.json", kind.prefix()));
            seq += 1;
        }
        let json = serde_json::to_string_pretty(set)?;
        fs::write(&path, json)
            .map_err(|e| StoreError::Backup(format!("cannot write {}: {e}", path.display())))?;

        self.prune(kind)?;
        Ok(path)
    }

    /// Remove the oldest snapshots (by modification time) of `kind`
    /// beyond the retention count.
    fn prune(&self, kind: BackupKind) -> Result<(), StoreError> {
        let mut snapshots = self.snapshots(kind)?;
        if snapshots.len() <= self.keep {
            return Ok(());
        }
        snapshots.sort_by_key(|(_, mtime)| *mtime);
        let excess = snapshots.len() - self.keep;
        for (path, _) in snapshots.into_iter().take(excess) {
            debug!(path = %path.display(), "pruning old backup");
            fs::remove_file(&path)
                .map_err(|e| StoreError::Backup(format!("cannot prune {}: {e}", path.display())))?;
        }
        Ok(())
    }

    fn snapshots(&self, kind: BackupKind) -> Result<Vec<(PathBuf, SystemTime)>, StoreError> {
        let prefix = format!("{}-", kind.prefix());
        let mut out = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.starts_with(&prefix) || !name.ends_with(".json") {
                continue;
            }
            let mtime = entry
                .metadata()?
                .modified()
                .unwrap_or(SystemTime::UNIX_EPOCH);
            out.push((entry.path(), mtime));
        }
        Ok(out)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
