use crate::core::handle::{ID_FIELD, KEY_FIELD, REV_FIELD, collection_of};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Options for `save`/`update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOptions {
    /// Return the full stored document in [`WriteResult::new`].
    pub return_new: bool,
    /// Return no metadata at all.
    pub silent: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            return_new: true,
            silent: false,
        }
    }
}

impl WriteOptions {
    pub fn return_new(mut self, return_new: bool) -> Self {
        self.return_new = return_new;
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }
}

/// Metadata returned by a write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteResult {
    pub key: Option<String>,
    pub id: Option<String>,
    pub rev: Option<String>,
    pub old_rev: Option<String>,
    pub new: Option<Value>,
}

impl WriteResult {
    /// Identity fields in wire shape, ready for a document handle.
    pub fn identity(&self) -> Map<String, Value> {
        let mut map = Map::new();
        let fields = [(KEY_FIELD, &self.key), (ID_FIELD, &self.id), (REV_FIELD, &self.rev)];
        for (name, value) in fields {
            if let Some(value) = value {
                map.insert(name.to_string(), Value::String(value.clone()));
            }
        }
        map
    }
}

/// Identifies one document for update/remove.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSelector {
    pub key: String,
    /// When set, the write only applies to this revision.
    pub rev: Option<String>,
}

impl DocumentSelector {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            rev: None,
        }
    }

    pub fn with_rev(mut self, rev: Option<String>) -> Self {
        self.rev = rev;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleOptions {
    pub skip: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionType {
    Document,
    Edge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub collection_type: CollectionType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Outbound,
    Inbound,
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Include,
    /// Leave the vertex out of the result; traversal continues through it.
    Exclude,
}

/// Which visited vertices a traversal reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VertexFilter {
    All,
    /// Only vertices whose `_id` lives in the named collection.
    SameCollection(String),
}

impl VertexFilter {
    pub fn decide(&self, vertex: &Value) -> FilterDecision {
        match self {
            VertexFilter::All => FilterDecision::Include,
            VertexFilter::SameCollection(collection) => {
                let same = vertex
                    .get(ID_FIELD)
                    .and_then(Value::as_str)
                    .and_then(collection_of)
                    .is_some_and(|prefix| prefix == collection);
                if same {
                    FilterDecision::Include
                } else {
                    FilterDecision::Exclude
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalOptions {
    pub direction: Direction,
    pub start_vertex: String,
    pub filter: VertexFilter,
    pub edge_collection: String,
    pub max_depth: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Visited {
    pub vertices: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraversalResult {
    pub visited: Visited,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn same_collection_filter_checks_id_prefix() {
        let filter = VertexFilter::SameCollection("users".to_string());

        assert_eq!(filter.decide(&json!({"_id": "users/1"})), FilterDecision::Include);
        assert_eq!(filter.decide(&json!({"_id": "groups/1"})), FilterDecision::Exclude);
        assert_eq!(filter.decide(&json!({"_id": "usersx/1"})), FilterDecision::Exclude);
        assert_eq!(filter.decide(&json!({"name": "no id"})), FilterDecision::Exclude);
    }

    #[test]
    fn identity_skips_missing_fields() {
        let result = WriteResult {
            key: Some("7".into()),
            rev: Some("r".into()),
            ..Default::default()
        };

        assert_eq!(Value::Object(result.identity()), json!({"_key": "7", "_rev": "r"}));
    }
}
