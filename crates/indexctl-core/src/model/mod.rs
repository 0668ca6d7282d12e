pub mod index;
pub mod query;
pub mod report;

pub use index::{
    ArrayConfig, FieldOrder, FieldOverride, IndexDefinition, IndexField, IndexSet, OverrideIndex,
    QueryScope,
};
pub use query::{CandidateIndex, OperationKind, QueryChain, QueryOperation};
pub use report::ValidationReport;
