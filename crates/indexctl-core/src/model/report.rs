use crate::model::query::CandidateIndex;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Validator output written when candidate indexes are not covered by
/// the declared configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub indexes: Vec<CandidateIndex>,
    pub generated_at: DateTime<Utc>,
}

impl ValidationReport {
    pub fn new(indexes: Vec<CandidateIndex>) -> Self {
        Self {
            indexes,
            generated_at: Utc::now(),
        }
    }
}
