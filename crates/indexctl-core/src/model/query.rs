use crate::model::index::{FieldOrder, IndexField};
use serde::Serialize;
use std::path::PathBuf;

/// What a single detected call does to the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationKind {
    /// A field filter; `operator` is the comparison the call used.
    Filter { operator: String },
    /// A sort on a field in the given direction.
    Sort { direction: FieldOrder },
}

/// One detected filter or sort call, pinned to its source location.
///
/// `collection` stays `None` when the enclosing collection reference
/// could not be traced; the analyzer surfaces those chains instead of
/// guessing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOperation {
    pub file: PathBuf,
    pub line: usize,
    pub kind: OperationKind,
    pub field_path: String,
    pub collection: Option<String>,
}

impl QueryOperation {
    pub fn is_filter(&self) -> bool {
        matches!(self.kind, OperationKind::Filter { .. })
    }

    pub fn is_sort(&self) -> bool {
        matches!(self.kind, OperationKind::Sort { .. })
    }
}

/// Operations believed to form one logical query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryChain {
    pub file: PathBuf,
    pub collection: Option<String>,
    pub operations: Vec<QueryOperation>,
}

impl QueryChain {
    pub fn filter_count(&self) -> usize {
        self.operations.iter().filter(|op| op.is_filter()).count()
    }

    pub fn sort_count(&self) -> usize {
        self.operations.iter().filter(|op| op.is_sort()).count()
    }

    /// `file:line` of the first operation, for reporting.
    pub fn source(&self) -> String {
        match self.operations.first() {
            Some(op) => format!("{}:{}", op.file.display(), op.line),
            None => self.file.display().to_string(),
        }
    }
}

/// A composite index a flagged chain would need.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateIndex {
    pub collection_group: String,
    pub fields: Vec<IndexField>,
    pub source: String,
}
