//! Deterministic ordering of index configurations.
//!
//! Declaration order in the local file or in the remote listing must
//! never cause a false diff, so both sides are normalized before any
//! comparison: indexes sort by collection group then field signature,
//! overrides by collection group then field path.

use crate::error::CoreError;
use crate::model::{IndexDefinition, IndexSet};

/// Return a copy of `set` with both lists in canonical order.
pub fn normalize(set: &IndexSet) -> IndexSet {
    let mut out = set.clone();
    out.indexes.sort_by_cached_key(index_sort_key);
    out.field_overrides
        .sort_by(|a, b| (&a.collection_group, &a.field_path).cmp(&(&b.collection_group, &b.field_path)));
    out
}

/// Pretty-printed serialization of the normalized set. Textual equality
/// of two canonical forms short-circuits the structural diff.
pub fn canonical_json(set: &IndexSet) -> Result<String, CoreError> {
    let normalized = normalize(set);
    Ok(serde_json::to_string_pretty(&normalized)?)
}

fn index_sort_key(index: &IndexDefinition) -> (String, Vec<String>) {
    (
        index.collection_group.clone(),
        index.fields.iter().map(|f| f.signature()).collect(),
    )
}
