use anyhow::{Context, Result};
use indexctl_core::analyze::analyze;
use indexctl_core::chain::{build_chains, DEFAULT_PROXIMITY};
use indexctl_core::model::{CandidateIndex, IndexSet, ValidationReport};
use indexctl_scan::scan_tree;
use indexctl_store::local::LocalIndexStore;
use std::fs;
use std::path::Path;

pub fn run(
    src: String,
    pattern: String,
    index_path: String,
    output_path: String,
    json: bool,
) -> Result<()> {
    let outcome = scan_tree(Path::new(&src), &pattern)
        .with_context(|| format!("cannot scan {}", src))?;

    let chains = build_chains(outcome.operations, DEFAULT_PROXIMITY);
    let analysis = analyze(&chains);

    let declared = LocalIndexStore::new(&index_path)
        .load()
        .context("cannot load declared index configuration")?;
    let missing: Vec<CandidateIndex> = analysis
        .candidates
        .into_iter()
        .filter(|candidate| !covered(candidate, &declared))
        .collect();

    // Per-file problems were collected during the scan; report them in
    // aggregate here, after the useful results.
    for failure in &outcome.failures {
        eprintln!("warning: {}: {}", failure.file.display(), failure.message);
    }
    for chain in &analysis.unattributed {
        eprintln!(
            "warning: composite-index query shape at {} has no resolvable collection",
            chain.source()
        );
    }

    let report = ValidationReport::new(missing);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if report.indexes.is_empty() {
        if !json {
            println!(
                "Scanned {} file(s): every detected query shape is covered by {}.",
                outcome.files_scanned, index_path
            );
        }
        return Ok(());
    }

    fs::write(&output_path, serde_json::to_string_pretty(&report)?)
        .with_context(|| format!("cannot write report to {}", output_path))?;

    if !json {
        println!(
            "Scanned {} file(s): {} composite index(es) missing from {}.",
            outcome.files_scanned,
            report.indexes.len(),
            index_path
        );
        for candidate in &report.indexes {
            let fields: Vec<String> = candidate
                .fields
                .iter()
                .map(|f| f.field_path.clone())
                .collect();
            println!(
                "  {} [{}]  ({})",
                candidate.collection_group,
                fields.join(", "),
                candidate.source
            );
        }
        println!("Report written to {}.", output_path);
    }
    Ok(())
}

/// A candidate is covered when a declared index has the same collection
/// group and an element-wise equal field list.
fn covered(candidate: &CandidateIndex, declared: &IndexSet) -> bool {
    declared.indexes.iter().any(|index| {
        index.collection_group == candidate.collection_group && index.fields == candidate.fields
    })
}
