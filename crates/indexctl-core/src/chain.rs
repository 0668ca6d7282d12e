//! Grouping of detected operations into logical query chains.
//!
//! Grouping is by source proximity: same file, same collection
//! attribution, and line gap within a threshold. This is a pattern
//! matcher, not a control-flow analysis; unusual layouts can under- or
//! over-merge, which is a documented limitation of the approach.

use crate::model::{QueryChain, QueryOperation};

/// Maximum line gap between operations of one chain.
pub const DEFAULT_PROXIMITY: usize = 5;

/// Group operations into chains. Input order does not matter; the
/// operations are sorted by file and line first.
pub fn build_chains(mut operations: Vec<QueryOperation>, proximity: usize) -> Vec<QueryChain> {
    operations.sort_by(|a, b| a.file.cmp(&b.file).then(a.line.cmp(&b.line)));

    let mut chains: Vec<QueryChain> = Vec::new();
    for op in operations {
        if let Some(chain) = chains.last_mut() {
            let close_enough = chain
                .operations
                .last()
                .is_some_and(|last| op.line.saturating_sub(last.line) <= proximity);
            if chain.file == op.file && chain.collection == op.collection && close_enough {
                chain.operations.push(op);
                continue;
            }
        }
        chains.push(QueryChain {
            file: op.file.clone(),
            collection: op.collection.clone(),
            operations: vec![op],
        });
    }
    chains
}
