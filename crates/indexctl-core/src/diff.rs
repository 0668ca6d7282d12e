//! Structural comparison of two index configurations.

use crate::error::CoreError;
use crate::model::{FieldOverride, IndexDefinition, IndexSet};
use crate::normalize::canonical_json;
use serde::Serialize;
use similar::TextDiff;

/// Indexes and overrides present on one side only.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiffSide {
    pub indexes: Vec<IndexDefinition>,
    pub field_overrides: Vec<FieldOverride>,
}

impl DiffSide {
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty() && self.field_overrides.is_empty()
    }
}

/// Outcome of comparing the local configuration against the remote one.
///
/// `added` is what local declares and remote lacks; `removed` is what
/// remote holds and local lacks. Membership follows the structural
/// identity rule, never list position. `rendered` is a unified text
/// diff of the two canonical serializations, for display only.
#[derive(Debug, Clone, Serialize)]
pub struct DiffResult {
    pub identical: bool,
    pub added: DiffSide,
    pub removed: DiffSide,
    #[serde(skip)]
    pub rendered: Option<String>,
}

impl DiffResult {
    fn identical() -> Self {
        Self {
            identical: true,
            added: DiffSide::default(),
            removed: DiffSide::default(),
            rendered: None,
        }
    }
}

/// Compare `local` against `remote` after normalizing both.
pub fn diff(local: &IndexSet, remote: &IndexSet) -> Result<DiffResult, CoreError> {
    let local_json = canonical_json(local)?;
    let remote_json = canonical_json(remote)?;
    if local_json == remote_json {
        return Ok(DiffResult::identical());
    }

    let added = DiffSide {
        indexes: missing_indexes(&local.indexes, &remote.indexes),
        field_overrides: missing_overrides(&local.field_overrides, &remote.field_overrides),
    };
    let removed = DiffSide {
        indexes: missing_indexes(&remote.indexes, &local.indexes),
        field_overrides: missing_overrides(&remote.field_overrides, &local.field_overrides),
    };

    let rendered = TextDiff::from_lines(&remote_json, &local_json)
        .unified_diff()
        .context_radius(3)
        .header("remote", "local")
        .to_string();

    Ok(DiffResult {
        identical: false,
        added,
        removed,
        rendered: Some(rendered),
    })
}

fn missing_indexes(from: &[IndexDefinition], against: &[IndexDefinition]) -> Vec<IndexDefinition> {
    from.iter()
        .filter(|candidate| !against.iter().any(|other| candidate.matches(other)))
        .cloned()
        .collect()
}

fn missing_overrides(from: &[FieldOverride], against: &[FieldOverride]) -> Vec<FieldOverride> {
    from.iter()
        .filter(|candidate| !against.contains(candidate))
        .cloned()
        .collect()
}
