use reltab_types::ContentHash;
use serde_json::{Map, Value};

/// A stored row: its content hash plus its fields.
///
/// `fields` never contains the hash field; [`Row::to_json`] re-attaches it.
/// Rows are shared between database snapshots behind `Arc` and are never
/// mutated once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    hash: ContentHash,
    fields: Map<String, Value>,
}

impl Row {
    /// Build a row from a stamped JSON object, removing `hash_field` from it.
    ///
    /// The caller supplies the parsed hash; this never recomputes it.
    pub fn new(hash: ContentHash, mut fields: Map<String, Value>, hash_field: &str) -> Self {
        fields.remove(hash_field);
        Self { hash, fields }
    }

    /// The row's content hash.
    pub fn hash(&self) -> ContentHash {
        self.hash
    }

    /// All fields except the hash field.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Look up a single field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// The row as a JSON object with its hash under `hash_field`.
    pub fn to_json(&self, hash_field: &str) -> Value {
        let mut object = self.fields.clone();
        object.insert(hash_field.to_string(), Value::String(self.hash.to_hex()));
        Value::Object(object)
    }
}
