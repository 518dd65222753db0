//! Document handle: the identity/revision record kept apart from user data.

use serde_json::{Map, Value};

pub const KEY_FIELD: &str = "_key";
pub const ID_FIELD: &str = "_id";
pub const REV_FIELD: &str = "_rev";
pub const FROM_FIELD: &str = "_from";
pub const TO_FIELD: &str = "_to";

/// Keys owned by the document handle. They never enter the user-data record.
pub const IDENTITY_FIELDS: [&str; 5] = [KEY_FIELD, ID_FIELD, REV_FIELD, FROM_FIELD, TO_FIELD];

pub fn is_identity_field(name: &str) -> bool {
    IDENTITY_FIELDS.contains(&name)
}

/// Identity and revision of a stored document.
///
/// `from`/`to` are only populated for edges, once the store has echoed the
/// resolved endpoint ids back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentHandle {
    pub key: Option<String>,
    pub id: Option<String>,
    pub rev: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl DocumentHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shallow-overwrites every handle field present in `partial`.
    ///
    /// Strings are taken as-is, numbers are stringified, `null` clears the
    /// field. Any other shape is ignored and non-identity keys are skipped.
    pub fn add(&mut self, partial: &Map<String, Value>) {
        for (name, value) in partial {
            let slot = match name.as_str() {
                KEY_FIELD => &mut self.key,
                ID_FIELD => &mut self.id,
                REV_FIELD => &mut self.rev,
                FROM_FIELD => &mut self.from,
                TO_FIELD => &mut self.to,
                _ => continue,
            };
            match value {
                Value::String(s) => *slot = Some(s.clone()),
                Value::Number(n) => *slot = Some(n.to_string()),
                Value::Null => *slot = None,
                _ => {}
            }
        }
    }

    /// Renders the handle back into its wire shape, omitting unset fields.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        let fields = [
            (KEY_FIELD, &self.key),
            (ID_FIELD, &self.id),
            (REV_FIELD, &self.rev),
            (FROM_FIELD, &self.from),
            (TO_FIELD, &self.to),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                map.insert(name.to_string(), Value::String(value.clone()));
            }
        }
        map
    }
}

/// Builds `"<collection>/<key>"`.
pub fn document_id(collection: &str, key: &str) -> String {
    format!("{}/{}", collection, key)
}

/// Returns the collection part of a document id, if the id has one.
pub fn collection_of(id: &str) -> Option<&str> {
    id.split_once('/').map(|(collection, _)| collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn add_picks_only_identity_fields() {
        let mut handle = DocumentHandle::new();
        handle.add(&object(json!({"_key": "1", "_rev": "abc", "name": "Alice"})));

        assert_eq!(handle.key.as_deref(), Some("1"));
        assert_eq!(handle.rev.as_deref(), Some("abc"));
        assert_eq!(handle.to_map().len(), 2);
    }

    #[test]
    fn add_overwrites_and_clears() {
        let mut handle = DocumentHandle::new();
        handle.add(&object(json!({"_key": 12, "_rev": "r1"})));
        assert_eq!(handle.key.as_deref(), Some("12"));

        handle.add(&object(json!({"_rev": null, "_from": "users/1"})));
        assert_eq!(handle.key.as_deref(), Some("12"));
        assert_eq!(handle.rev, None);
        assert_eq!(handle.from.as_deref(), Some("users/1"));
    }

    #[test]
    fn collection_of_splits_on_first_slash() {
        assert_eq!(collection_of("users/42"), Some("users"));
        assert_eq!(collection_of("no-slash"), None);
        assert_eq!(document_id("users", "42"), "users/42");
    }
}
