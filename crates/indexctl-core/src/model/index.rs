use serde::{Deserialize, Serialize};

/// Sort order of a single indexed field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldOrder {
    Ascending,
    Descending,
}

/// Array membership indexing mode for a field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArrayConfig {
    Contains,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryScope {
    #[default]
    Collection,
    CollectionGroup,
}

/// One field of a composite index: a path plus either a sort order or an
/// array config, never both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IndexField {
    pub field_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<FieldOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_config: Option<ArrayConfig>,
}

impl IndexField {
    pub fn ascending(field_path: impl Into<String>) -> Self {
        Self {
            field_path: field_path.into(),
            order: Some(FieldOrder::Ascending),
            array_config: None,
        }
    }

    pub fn descending(field_path: impl Into<String>) -> Self {
        Self {
            field_path: field_path.into(),
            order: Some(FieldOrder::Descending),
            array_config: None,
        }
    }

    /// Stable signature used as a normalization sort key.
    pub(crate) fn signature(&self) -> String {
        let mode = match (&self.order, &self.array_config) {
            (Some(FieldOrder::Ascending), _) => "ASCENDING",
            (Some(FieldOrder::Descending), _) => "DESCENDING",
            (None, Some(ArrayConfig::Contains)) => "CONTAINS",
            (None, None) => "NONE",
        };
        format!("{}:{}", self.field_path, mode)
    }
}

/// A declared or deployed composite index.
///
/// Identity for diff and guard purposes is `collection_group` plus the
/// element-wise field list; `query_scope` is carried but not compared.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IndexDefinition {
    pub collection_group: String,
    #[serde(default)]
    pub query_scope: QueryScope,
    pub fields: Vec<IndexField>,
}

impl IndexDefinition {
    /// Structural identity: same collection group and field lists equal
    /// element-wise (position-sensitive).
    pub fn matches(&self, other: &IndexDefinition) -> bool {
        self.collection_group == other.collection_group && self.fields == other.fields
    }

    /// Compact one-line rendering for guard and diff output.
    pub fn describe(&self) -> String {
        let fields: Vec<String> = self.fields.iter().map(IndexField::signature).collect();
        format!("{} [{}]", self.collection_group, fields.join(", "))
    }
}

/// A per-field index entry inside a field override.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OverrideIndex {
    #[serde(default)]
    pub query_scope: QueryScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<FieldOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_config: Option<ArrayConfig>,
}

/// Per-field exemption from default single-field indexing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FieldOverride {
    pub collection_group: String,
    pub field_path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<OverrideIndex>,
}

/// The full index configuration: what the local file declares or what the
/// remote database reports.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IndexSet {
    pub indexes: Vec<IndexDefinition>,
    #[serde(default)]
    pub field_overrides: Vec<FieldOverride>,
}

impl IndexSet {
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty() && self.field_overrides.is_empty()
    }
}
