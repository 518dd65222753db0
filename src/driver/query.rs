use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Aggregate counting every document of the collection bound to `@@collection`.
pub const COUNT_DOCUMENTS: &str = "RETURN LENGTH(FOR d IN @@collection RETURN 1)";

/// A query text plus its bind parameters, handed to the driver untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    pub bind_vars: Map<String, Value>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bind_vars: Map::new(),
        }
    }

    pub fn bind(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bind_vars.insert(name.into(), value.into());
        self
    }

    pub fn count_documents(collection: &str) -> Self {
        Self::new(COUNT_DOCUMENTS).bind("@collection", collection)
    }

    /// Name bound to a collection parameter (`@@name` in the text).
    pub fn collection_param(&self, name: &str) -> Option<&str> {
        self.bind_vars
            .get(&format!("@{}", name))
            .and_then(Value::as_str)
    }
}

/// Materialized query results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryCursor {
    rows: Vec<Value>,
}

impl QueryCursor {
    pub fn new(rows: Vec<Value>) -> Self {
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn first(&self) -> Option<&Value> {
        self.rows.first()
    }

    pub fn all(self) -> Vec<Value> {
        self.rows
    }
}
