use std::collections::HashMap;
use std::sync::Arc;

use reltab_types::ContentHash;
use serde_json::{Map, Value};

use crate::config::StoreConfig;
use crate::row::Row;

/// A named table: an ordered arena of rows plus a hash index into it.
///
/// The arena (`rows`) is authoritative for order and index-based access;
/// `index` maps each row hash to its arena position and is authoritative for
/// existence checks. The two are only ever changed together by
/// [`Table::insert`], so every indexed position is valid and no hash
/// appears twice.
#[derive(Clone, Debug)]
pub struct Table {
    name: String,
    rows: Vec<Arc<Row>>,
    index: HashMap<ContentHash, usize>,
    /// Cached content hash; `None` until computed or after a change.
    hash: Option<ContentHash>,
}

impl Table {
    /// Create an empty table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
            index: HashMap::new(),
            hash: None,
        }
    }

    /// The table's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in insertion order.
    pub fn rows(&self) -> &[Arc<Row>] {
        &self.rows
    }

    /// Iterate rows in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Row>> {
        self.rows.iter()
    }

    /// Look up a row by hash.
    pub fn get(&self, hash: &ContentHash) -> Option<&Arc<Row>> {
        self.index.get(hash).map(|&pos| &self.rows[pos])
    }

    /// Returns `true` if a row with this hash exists.
    pub fn contains(&self, hash: &ContentHash) -> bool {
        self.index.contains_key(hash)
    }

    /// The row at `position` in insertion order.
    pub fn row_at(&self, position: usize) -> Option<&Arc<Row>> {
        self.rows.get(position)
    }

    /// Insertion-order position of the row with this hash.
    pub fn position(&self, hash: &ContentHash) -> Option<usize> {
        self.index.get(hash).copied()
    }

    /// The table's content hash, if it has been computed since the last
    /// change.
    pub fn hash(&self) -> Option<ContentHash> {
        self.hash
    }

    /// Append a row unless one with the same hash exists.
    ///
    /// Returns `true` if the row was appended. A duplicate is dropped
    /// untouched: first occurrence wins.
    pub(crate) fn insert(&mut self, row: Arc<Row>) -> bool {
        let hash = row.hash();
        if self.index.contains_key(&hash) {
            return false;
        }
        self.index.insert(hash, self.rows.len());
        self.rows.push(row);
        self.hash = None;
        true
    }

    pub(crate) fn set_hash(&mut self, hash: ContentHash) {
        self.hash = Some(hash);
    }

    /// The table as `{rows: [...], hash?: ...}` in the ingestion shape.
    pub fn to_json(&self, config: &StoreConfig) -> Value {
        let rows = self
            .rows
            .iter()
            .map(|row| row.to_json(&config.hash_field))
            .collect();
        let mut object = Map::new();
        object.insert(config.rows_field.clone(), Value::Array(rows));
        if let Some(hash) = self.hash {
            object.insert(config.hash_field.clone(), Value::String(hash.to_hex()));
        }
        Value::Object(object)
    }
}
