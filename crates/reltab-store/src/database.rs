//! The database snapshot and its direct accessors.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use reltab_crypto::{ApplyOptions, Blake3HashProvider, HashError, HashProvider};
use reltab_types::{names, ContentHash};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::merge::MergeOptions;
use crate::row::Row;
use crate::table::Table;

/// An immutable snapshot of named tables.
///
/// Tables enumerate in name order and are shared between snapshots behind
/// `Arc`; a merge copies only the tables it touches. Cloning a `Database`
/// is cheap.
#[derive(Clone)]
pub struct Database {
    pub(crate) tables: BTreeMap<String, Arc<Table>>,
    pub(crate) hash: Option<ContentHash>,
    pub(crate) config: StoreConfig,
    pub(crate) provider: Arc<dyn HashProvider>,
}

impl Database {
    /// An empty database with the default conventions and BLAKE3 hashing.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// An empty database reading JSON with `config`.
    pub fn with_config(config: StoreConfig) -> Self {
        let provider = Arc::new(Blake3HashProvider::new(config.hash_field.clone()));
        Self::with_provider(config, provider)
    }

    /// An empty database hashing through `provider`.
    ///
    /// The provider's hash field overrides `config.hash_field` so that the
    /// store always reads hashes from where the provider writes them.
    pub fn with_provider(mut config: StoreConfig, provider: Arc<dyn HashProvider>) -> Self {
        config.hash_field = provider.hash_field().to_string();
        Self {
            tables: BTreeMap::new(),
            hash: None,
            config,
            provider,
        }
    }

    /// Build a database from a single bulk ingestion.
    pub fn from_data(batch: Value, options: MergeOptions) -> StoreResult<Self> {
        Self::new().add_data(batch, options)
    }

    /// Rebuild a database from [`Database::to_json`] output.
    ///
    /// Every embedded hash is validated, so tampered exports are rejected.
    pub fn from_json(value: Value) -> StoreResult<Self> {
        Self::from_data(
            value,
            MergeOptions {
                validate_hashes: true,
                update_hashes: false,
            },
        )
    }

    /// The database in the ingestion shape, with every hash embedded.
    pub fn to_json(&self) -> Value {
        let mut object: Map<String, Value> = self
            .tables
            .iter()
            .map(|(name, table)| (name.clone(), table.to_json(&self.config)))
            .collect();
        if let Some(hash) = self.hash {
            object.insert(self.config.hash_field.clone(), Value::String(hash.to_hex()));
        }
        Value::Object(object)
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    /// The conventions this database reads JSON with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The injected hashing capability.
    pub fn provider(&self) -> &Arc<dyn HashProvider> {
        &self.provider
    }

    /// Aggregate content hash over every table. `None` until the first
    /// ingestion.
    pub fn content_hash(&self) -> Option<ContentHash> {
        self.hash
    }

    /// Number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns `true` if there are no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Total number of rows across all tables.
    pub fn row_count(&self) -> usize {
        self.tables.values().map(|t| t.len()).sum()
    }

    /// Table names in enumeration order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// All tables in enumeration order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values().map(|t| t.as_ref())
    }

    /// Look up a table by name.
    pub fn table(&self, name: &str) -> StoreResult<&Table> {
        self.tables
            .get(name)
            .map(|t| t.as_ref())
            .ok_or_else(|| StoreError::TableNotFound {
                table: name.to_string(),
            })
    }

    /// Look up a row by its hex hash.
    pub fn row(&self, table: &str, hash: &str) -> StoreResult<&Arc<Row>> {
        let rows = self.table(table)?;
        ContentHash::from_hex(hash)
            .ok()
            .and_then(|h| rows.get(&h))
            .ok_or_else(|| StoreError::RowNotFound {
                table: table.to_string(),
                hash: hash.to_string(),
            })
    }

    /// Hash of the row at `index` in the table's insertion order.
    pub fn row_hash(&self, table: &str, index: usize) -> StoreResult<ContentHash> {
        let rows = self.table(table)?;
        rows.row_at(index)
            .map(|row| row.hash())
            .ok_or_else(|| StoreError::IndexOutOfRange {
                table: table.to_string(),
                index,
                len: rows.len(),
            })
    }

    /// Every concrete field as `table/hash/field`.
    ///
    /// The hash field and reference fields are left out. Tables come in
    /// sorted name order, rows in insertion order, and each row's fields in
    /// sorted key order, so the listing is stable for a given snapshot.
    pub fn ls(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for (name, table) in &self.tables {
            for row in table.iter() {
                let hash = row.hash().to_hex();
                for field in row.fields().keys() {
                    if !self.config.is_link(field) {
                        paths.push(format!("{name}/{hash}/{field}"));
                    }
                }
            }
        }
        paths
    }

    // ---------------------------------------------------------------
    // Naming rules
    // ---------------------------------------------------------------

    /// Check one table name against the naming rules.
    pub fn check_table_name(&self, name: &str) -> StoreResult<()> {
        Ok(names::validate_table_name(name, &self.config.link_suffix)?)
    }

    /// Check table names in order, failing on the first invalid one.
    pub fn check_table_names<I, S>(&self, names: I) -> StoreResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(names::validate_table_names(names, &self.config.link_suffix)?)
    }

    // ---------------------------------------------------------------
    // Aggregate hash
    // ---------------------------------------------------------------

    /// Recompute hashes of changed tables and the aggregate hash.
    ///
    /// Row hashes and cached table hashes are reused as they are.
    pub(crate) fn refresh_content_hash(&mut self) -> StoreResult<()> {
        let mut tree = Value::Object(
            self.tables
                .iter()
                .map(|(name, table)| (name.clone(), table.to_json(&self.config)))
                .collect(),
        );
        self.provider.apply(&mut tree, ApplyOptions::default())?;

        let hash_field = self.config.hash_field.as_str();
        for (name, table) in self.tables.iter_mut() {
            if table.hash().is_none() {
                let hash = stamped_hash(&tree[name.as_str()], hash_field, &format!("/{name}"))?;
                Arc::make_mut(table).set_hash(hash);
            }
        }
        let hash = stamped_hash(&tree, hash_field, "")?;
        debug!(hash = %hash.short_hex(), tables = self.tables.len(), "recomputed content hash");
        self.hash = Some(hash);
        Ok(())
    }
}

fn stamped_hash(node: &Value, hash_field: &str, path: &str) -> StoreResult<ContentHash> {
    let value = node.get(hash_field).unwrap_or(&Value::Null);
    value
        .as_str()
        .and_then(|s| ContentHash::from_hex(s).ok())
        .ok_or_else(|| {
            StoreError::Hash(HashError::InvalidHash {
                path: path.to_string(),
                value: value.to_string(),
            })
        })
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("tables", &self.tables.len())
            .field("rows", &self.row_count())
            .field("hash", &self.hash)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Database {
        Database::from_data(
            json!({
                "tableA": {"rows": [{"k": "a0"}, {"k": "a1"}]},
                "tableB": {"rows": [{"k": "b0", "tableAHash": null}]},
            }),
            MergeOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn empty_database() {
        let db = Database::new();
        assert!(db.is_empty());
        assert_eq!(db.row_count(), 0);
        assert!(db.content_hash().is_none());
        assert!(db.ls().is_empty());
        assert_eq!(db.to_json(), json!({}));
    }

    #[test]
    fn table_and_row_accessors() {
        let db = sample();
        assert_eq!(db.len(), 2);
        assert_eq!(db.row_count(), 3);
        assert_eq!(db.table_names().collect::<Vec<_>>(), ["tableA", "tableB"]);

        let h0 = db.row_hash("tableA", 0).unwrap();
        let row = db.row("tableA", &h0.to_hex()).unwrap();
        assert_eq!(row.get("k"), Some(&json!("a0")));
        assert_eq!(db.table("tableA").unwrap().position(&h0), Some(0));
    }

    #[test]
    fn missing_table_and_row() {
        let db = sample();
        assert_eq!(
            db.table("nope").unwrap_err(),
            StoreError::TableNotFound {
                table: "nope".into()
            }
        );
        let missing = ContentHash::from_bytes(b"missing").to_hex();
        let err = db.row("tableA", &missing).unwrap_err();
        assert!(err.to_string().contains(&missing));
        assert!(err.to_string().contains("tableA"));
        assert!(matches!(
            db.row("tableA", "zz"),
            Err(StoreError::RowNotFound { .. })
        ));
    }

    #[test]
    fn row_hash_out_of_range() {
        let db = sample();
        assert_eq!(
            db.row_hash("tableB", 1).unwrap_err(),
            StoreError::IndexOutOfRange {
                table: "tableB".into(),
                index: 1,
                len: 1
            }
        );
        assert!(matches!(
            db.row_hash("nope", 0),
            Err(StoreError::TableNotFound { .. })
        ));
    }

    #[test]
    fn ls_skips_links_and_hash() {
        let db = sample();
        let paths = db.ls();
        assert_eq!(paths.len(), 3);
        assert!(paths.iter().all(|p| !p.ends_with("/hash")));
        assert!(paths.iter().all(|p| !p.ends_with("/tableAHash")));
        let b = db.row_hash("tableB", 0).unwrap();
        assert_eq!(paths[2], format!("tableB/{b}/k"));
    }

    #[test]
    fn ls_sorts_tables_and_fields() {
        let db = Database::from_data(
            json!({
                "zeta": {"rows": [{"b": 1, "a": 2}]},
                "alpha": {"rows": [{"y": 3, "x": 4}]},
            }),
            MergeOptions::default(),
        )
        .unwrap();
        let alpha = db.row_hash("alpha", 0).unwrap();
        let zeta = db.row_hash("zeta", 0).unwrap();
        assert_eq!(
            db.ls(),
            vec![
                format!("alpha/{alpha}/x"),
                format!("alpha/{alpha}/y"),
                format!("zeta/{zeta}/a"),
                format!("zeta/{zeta}/b"),
            ]
        );
    }

    #[test]
    fn json_export_round_trips() {
        let db = sample();
        let exported = db.to_json();
        assert!(exported["hash"].is_string());
        assert!(exported["tableA"]["hash"].is_string());

        let rebuilt = Database::from_json(exported.clone()).unwrap();
        assert_eq!(rebuilt.content_hash(), db.content_hash());
        assert_eq!(rebuilt.to_json(), exported);
    }

    #[test]
    fn tampered_export_is_rejected() {
        let mut exported = sample().to_json();
        exported["tableA"]["rows"][0]["k"] = json!("forged");
        let err = Database::from_json(exported).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Integrity);
    }

    #[test]
    fn custom_provider_sets_hash_field() {
        let provider = Arc::new(Blake3HashProvider::new("_id"));
        let db = Database::with_provider(StoreConfig::default(), provider);
        assert_eq!(db.config().hash_field, "_id");
        let db = db
            .add_data(json!({"t": {"rows": [{"k": 1}]}}), MergeOptions::default())
            .unwrap();
        assert!(db.to_json()["t"]["rows"][0]["_id"].is_string());
    }

    #[test]
    fn debug_format() {
        let debug = format!("{:?}", sample());
        assert!(debug.contains("Database"));
        assert!(debug.contains("rows: 3"));
    }
}
