//! Two-way synchronization between the declared and deployed
//! configurations.
//!
//! The run is strictly sequential: fetch, compare, guard, confirm, back
//! up, apply. Every mutation is preceded by a snapshot of whatever is
//! about to be replaced; a failed snapshot stops the run before any
//! destructive write. Nothing is retried — a failed step surfaces its
//! error and the operator re-runs.
//!
//! Concurrent runs against the same local file are unsupported: last
//! writer wins on the filesystem.

use crate::backup::{BackupKind, BackupManager};
use crate::error::StoreError;
use crate::local::LocalIndexStore;
use crate::remote::RemoteClient;
use indexctl_core::diff::{diff, DiffResult};
use indexctl_core::guard::check_removals;
use indexctl_core::model::IndexDefinition;
use indexctl_core::normalize::normalize;
use std::path::PathBuf;
use tracing::debug;

/// Answers the "apply these changes?" question. Injected so automation
/// and tests never block on a terminal.
pub trait Confirmer {
    fn confirm(&self, question: &str) -> bool;
}

/// Confirmer used for `--force` runs: always yes, never prompts.
pub struct AssumeYes;

impl Confirmer for AssumeYes {
    fn confirm(&self, _question: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDirection {
    /// Remote truth wins; the local file is overwritten.
    Pull,
    /// Local truth wins; the deployment CLI pushes the local file.
    Push,
    /// Compare and report only; never confirms, never writes.
    Diff,
}

pub struct SyncOptions {
    pub direction: SyncDirection,
    pub env: String,
    pub force: bool,
    pub critical: Vec<IndexDefinition>,
}

/// Terminal states of a sync run that is not an error.
#[derive(Debug)]
pub enum SyncOutcome {
    /// Both sides already agree.
    Identical,
    /// Diff mode: differences reported, nothing applied.
    ReportedOnly { diff: DiffResult },
    /// Critical indexes would be dropped and no force flag was given.
    Aborted {
        diff: DiffResult,
        violations: Vec<IndexDefinition>,
    },
    /// The operator declined the confirmation prompt.
    Cancelled,
    /// Changes applied; `backup` preserves what was replaced.
    Applied { diff: DiffResult, backup: PathBuf },
}

pub struct Synchronizer<'a> {
    local: &'a LocalIndexStore,
    remote: &'a dyn RemoteClient,
    backups: &'a BackupManager,
    confirmer: &'a dyn Confirmer,
}

impl<'a> Synchronizer<'a> {
    pub fn new(
        local: &'a LocalIndexStore,
        remote: &'a dyn RemoteClient,
        backups: &'a BackupManager,
        confirmer: &'a dyn Confirmer,
    ) -> Self {
        Self {
            local,
            remote,
            backups,
            confirmer,
        }
    }

    pub fn run(&self, opts: &SyncOptions) -> Result<SyncOutcome, StoreError> {
        let local_set = self.local.load()?;

        debug!(env = %opts.env, "state: fetching");
        let remote_set = self.remote.fetch(&opts.env)?;

        debug!("state: comparing");
        let result = diff(&local_set, &remote_set)?;
        if result.identical {
            return Ok(SyncOutcome::Identical);
        }

        debug!("state: guarding");
        let guard = check_removals(&result, &opts.critical);
        if !guard.is_safe() && !opts.force {
            return Ok(SyncOutcome::Aborted {
                diff: result,
                violations: guard.violations,
            });
        }

        if opts.direction == SyncDirection::Diff {
            return Ok(SyncOutcome::ReportedOnly { diff: result });
        }

        if !opts.force {
            debug!("state: confirming");
            let question = describe_apply(opts.direction, &result, &opts.env);
            if !self.confirmer.confirm(&question) {
                return Ok(SyncOutcome::Cancelled);
            }
        }

        let backup = match opts.direction {
            SyncDirection::Pull => {
                debug!("state: backing up local configuration");
                let backup = self.backups.backup(BackupKind::Local, &local_set)?;
                debug!("state: applying (pull)");
                self.local.save(&normalize(&remote_set))?;
                backup
            }
            SyncDirection::Push => {
                debug!("state: backing up remote configuration");
                let backup = self.backups.backup(BackupKind::Remote, &remote_set)?;
                debug!("state: applying (push)");
                self.remote.deploy(&opts.env, self.local.path())?;
                backup
            }
            SyncDirection::Diff => unreachable!("diff mode returned above"),
        };

        Ok(SyncOutcome::Applied {
            diff: result,
            backup,
        })
    }
}

fn describe_apply(direction: SyncDirection, diff: &DiffResult, env: &str) -> String {
    let mut lines = Vec::new();
    for index in &diff.added.indexes {
        lines.push(format!("  only local:  {}", index.describe()));
    }
    for ov in &diff.added.field_overrides {
        lines.push(format!("  only local:  override {}.{}", ov.collection_group, ov.field_path));
    }
    for index in &diff.removed.indexes {
        lines.push(format!("  only remote: {}", index.describe()));
    }
    for ov in &diff.removed.field_overrides {
        lines.push(format!("  only remote: override {}.{}", ov.collection_group, ov.field_path));
    }
    let action = match direction {
        SyncDirection::Pull => "overwrite the local configuration with the remote one".to_string(),
        SyncDirection::Push => format!("deploy the local configuration to '{env}'"),
        SyncDirection::Diff => unreachable!("diff mode never confirms"),
    };
    format!("{}\nApply and {}?", lines.join("\n"), action)
}
