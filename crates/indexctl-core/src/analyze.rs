//! Flagging of chains whose shape needs a composite index.

use crate::model::{
    CandidateIndex, FieldOrder, IndexField, OperationKind, QueryChain, QueryOperation,
};

/// Analyzer output: one candidate per flagged chain, plus the flagged
/// chains whose collection could not be attributed (no collection-scoped
/// index can be emitted for those; the caller reports them).
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub candidates: Vec<CandidateIndex>,
    pub unattributed: Vec<QueryChain>,
}

/// Inspect every chain and emit candidates for the ones that require a
/// composite index: at least one filter combined with a sort, or two or
/// more sorts. Chains of pure equality filters are deliberately not
/// flagged.
pub fn analyze(chains: &[QueryChain]) -> Analysis {
    let mut analysis = Analysis::default();
    for chain in chains {
        if !requires_composite(chain) {
            continue;
        }
        match &chain.collection {
            Some(collection) => analysis.candidates.push(candidate(collection, chain)),
            None => analysis.unattributed.push(chain.clone()),
        }
    }
    analysis
}

fn requires_composite(chain: &QueryChain) -> bool {
    let filters = chain.filter_count();
    let sorts = chain.sort_count();
    (filters >= 1 && sorts >= 1) || sorts >= 2
}

/// Candidate field order is filter fields first (source order), then
/// sort fields (source order). This does not model inequality-operator
/// placement rules; it is a deliberate simplification.
fn candidate(collection: &str, chain: &QueryChain) -> CandidateIndex {
    let mut fields: Vec<IndexField> = chain
        .operations
        .iter()
        .filter(|op| op.is_filter())
        .map(filter_field)
        .collect();
    fields.extend(
        chain
            .operations
            .iter()
            .filter_map(|op| match &op.kind {
                OperationKind::Sort { direction } => Some(IndexField {
                    field_path: op.field_path.clone(),
                    order: Some(*direction),
                    array_config: None,
                }),
                OperationKind::Filter { .. } => None,
            }),
    );
    CandidateIndex {
        collection_group: collection.to_string(),
        fields,
        source: chain.source(),
    }
}

fn filter_field(op: &QueryOperation) -> IndexField {
    IndexField {
        field_path: op.field_path.clone(),
        order: Some(FieldOrder::Ascending),
        array_config: None,
    }
}
