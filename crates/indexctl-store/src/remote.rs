//! The deployed-configuration side of the sync: fetch and deploy via
//! the platform's deployment CLI.

use crate::error::StoreError;
use indexctl_core::model::IndexSet;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Seam between the synchronizer and the deployment tooling. Tests
/// substitute a fake; production wires [`DeployCli`].
pub trait RemoteClient {
    /// Fetch the currently deployed index configuration for `env`.
    fn fetch(&self, env: &str) -> Result<IndexSet, StoreError>;

    /// Deploy the configuration file at `config_path` to `env`.
    fn deploy(&self, env: &str, config_path: &Path) -> Result<(), StoreError>;
}

/// Invokes the deployment CLI as a subprocess.
pub struct DeployCli {
    pub binary: String,
}

impl Default for DeployCli {
    fn default() -> Self {
        Self {
            binary: "firebase".into(),
        }
    }
}

impl DeployCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl RemoteClient for DeployCli {
    fn fetch(&self, env: &str) -> Result<IndexSet, StoreError> {
        debug!(binary = %self.binary, env, "fetching deployed index configuration");
        let output = Command::new(&self.binary)
            .args(["firestore:indexes", "--project", env])
            .output()
            .map_err(|e| StoreError::Fetch(format!("cannot run {}: {e}", self.binary)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StoreError::Fetch(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(&stdout)
            .map_err(|e| StoreError::Fetch(format!("invalid JSON from {}: {e}", self.binary)))
    }

    fn deploy(&self, env: &str, config_path: &Path) -> Result<(), StoreError> {
        debug!(binary = %self.binary, env, config = %config_path.display(), "deploying index configuration");
        // Inherited stdio so the operator sees the CLI's own progress.
        let dir = match config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let status = Command::new(&self.binary)
            .args(["deploy", "--only", "firestore:indexes", "--project", env])
            .current_dir(dir)
            .status()
            .map_err(|e| StoreError::Deploy(format!("cannot run {}: {e}", self.binary)))?;

        if !status.success() {
            return Err(StoreError::Deploy(format!(
                "{} exited with {}",
                self.binary,
                status.code().unwrap_or(-1)
            )));
        }
        Ok(())
    }
}
