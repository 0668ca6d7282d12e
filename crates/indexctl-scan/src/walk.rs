//! Source-tree traversal for the validator scan.

use crate::error::ScanError;
use crate::extract::extract_file;
use crate::language::SourceLang;
use indexctl_core::model::QueryOperation;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Directories never worth scanning.
const EXCLUDE_DIRS: &[&str] = &["node_modules", ".git", "dist", "build", "coverage"];

/// One file the scan could not process. Collected and reported in
/// aggregate; a bad file never aborts the scan.
#[derive(Debug, Clone)]
pub struct ScanFailure {
    pub file: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub operations: Vec<QueryOperation>,
    pub failures: Vec<ScanFailure>,
    pub files_scanned: usize,
}

/// Scan every source file under `root` matching `pattern` and collect
/// the query operations found.
pub fn scan_tree(root: &Path, pattern: &str) -> Result<ScanOutcome, ScanError> {
    let globs = build_globs(pattern)?;
    let mut outcome = ScanOutcome::default();

    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| !should_skip_dir(entry));
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skipping unreadable entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let rel = path.strip_prefix(root).unwrap_or(path);
        if !globs.is_match(rel) {
            continue;
        }
        let Some(lang) = SourceLang::from_path(path) else {
            continue;
        };

        outcome.files_scanned += 1;
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                warn!(file = %rel.display(), "failed to read: {err}");
                outcome.failures.push(ScanFailure {
                    file: rel.to_path_buf(),
                    message: err.to_string(),
                });
                continue;
            }
        };
        match extract_file(&source, rel, lang) {
            Ok(operations) => outcome.operations.extend(operations),
            Err(err) => {
                warn!(file = %rel.display(), "{err}");
                outcome.failures.push(ScanFailure {
                    file: rel.to_path_buf(),
                    message: err.to_string(),
                });
            }
        }
    }
    Ok(outcome)
}

fn build_globs(pattern: &str) -> Result<GlobSet, ScanError> {
    let glob = Glob::new(pattern).map_err(|source| ScanError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;
    let mut builder = GlobSetBuilder::new();
    builder.add(glob);
    builder.build().map_err(|source| ScanError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn should_skip_dir(entry: &walkdir::DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    EXCLUDE_DIRS.iter().any(|&dir| name == dir)
}
