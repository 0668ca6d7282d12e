//! Protection against dropping operator-designated critical indexes.

use crate::diff::DiffResult;
use crate::model::IndexDefinition;

/// Result of checking a diff's removals against the critical list.
///
/// A violation is data for the caller to act on, not an error: the
/// synchronizer refuses to proceed without an explicit force flag and
/// prints every violating index.
#[derive(Debug, Clone, Default)]
pub struct GuardReport {
    pub violations: Vec<IndexDefinition>,
}

impl GuardReport {
    pub fn is_safe(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Collect every removed index that matches an entry in the critical
/// list (collection group + position-sensitive field list).
pub fn check_removals(diff: &DiffResult, critical: &[IndexDefinition]) -> GuardReport {
    let violations = diff
        .removed
        .indexes
        .iter()
        .filter(|removed| critical.iter().any(|entry| removed.matches(entry)))
        .cloned()
        .collect();
    GuardReport { violations }
}
