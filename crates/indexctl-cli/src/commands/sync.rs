use crate::confirm::StdinConfirmer;
use anyhow::{bail, Context, Result};
use indexctl_core::model::IndexDefinition;
use indexctl_store::backup::BackupManager;
use indexctl_store::local::LocalIndexStore;
use indexctl_store::remote::DeployCli;
use indexctl_store::sync::{
    AssumeYes, Confirmer, SyncDirection, SyncOptions, SyncOutcome, Synchronizer,
};
use std::fs;

pub struct Args {
    pub direction: SyncDirection,
    pub env: String,
    pub config_path: String,
    pub force: bool,
    pub critical_path: Option<String>,
    pub deploy_bin: String,
    pub backup_dir: String,
    pub keep_backups: usize,
    pub json: bool,
}

pub fn run(args: Args) -> Result<()> {
    let critical = load_critical(args.critical_path.as_deref())?;

    let local = LocalIndexStore::new(&args.config_path);
    let remote = DeployCli::new(&args.deploy_bin);
    let backups = BackupManager::new(&args.backup_dir, args.keep_backups);
    let confirmer: Box<dyn Confirmer> = if args.force {
        Box::new(AssumeYes)
    } else {
        Box::new(StdinConfirmer)
    };

    let sync = Synchronizer::new(&local, &remote, &backups, confirmer.as_ref());
    let outcome = sync.run(&SyncOptions {
        direction: args.direction,
        env: args.env.clone(),
        force: args.force,
        critical,
    })?;

    match outcome {
        SyncOutcome::Identical => {
            if args.json {
                println!("{}", serde_json::json!({ "identical": true }));
            } else {
                println!("No differences between {} and '{}'.", args.config_path, args.env);
            }
        }
        SyncOutcome::ReportedOnly { diff } => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&diff)?);
            } else {
                if let Some(rendered) = &diff.rendered {
                    print!("{}", rendered);
                }
                println!();
                summarize(&diff);
            }
        }
        SyncOutcome::Aborted { violations, .. } => {
            println!("Refusing to continue: critical index(es) would be dropped:");
            for index in &violations {
                println!("  CRITICAL  {}", index.describe());
            }
            bail!(
                "{} critical index violation(s); re-run with --force to override",
                violations.len()
            );
        }
        SyncOutcome::Cancelled => {
            println!("Cancelled; nothing applied.");
        }
        SyncOutcome::Applied { diff, backup } => {
            if args.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "applied": true,
                        "backup": backup.display().to_string(),
                        "diff": diff,
                    })
                );
            } else {
                summarize(&diff);
                match args.direction {
                    SyncDirection::Pull => println!(
                        "Pulled remote configuration into {} (backup at {}).",
                        args.config_path,
                        backup.display()
                    ),
                    SyncDirection::Push => println!(
                        "Deployed {} to '{}' (backup of previous remote at {}).",
                        args.config_path,
                        args.env,
                        backup.display()
                    ),
                    SyncDirection::Diff => unreachable!("diff mode never applies"),
                }
            }
        }
    }
    Ok(())
}

fn summarize(diff: &indexctl_core::diff::DiffResult) {
    println!(
        "{} index(es) only local, {} index(es) only remote, {} override(s) only local, {} override(s) only remote.",
        diff.added.indexes.len(),
        diff.removed.indexes.len(),
        diff.added.field_overrides.len(),
        diff.removed.field_overrides.len()
    );
}

fn load_critical(path: Option<&str>) -> Result<Vec<IndexDefinition>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let data =
        fs::read_to_string(path).with_context(|| format!("cannot read critical list {path}"))?;
    serde_json::from_str(&data).with_context(|| format!("critical list {path} is not a JSON array of index definitions"))
}
