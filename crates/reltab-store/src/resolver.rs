//! Link resolution: single values and multi-column projections.
//!
//! A link path is a list of field names. Every reference field on the path
//! moves resolution to the row it points at; the last segment names the
//! value returned. Each hop consumes one segment, so resolution always
//! terminates even when links form a cycle across tables.

use serde_json::Value;

use crate::database::Database;
use crate::error::{StoreError, StoreResult};
use crate::row::Row;

impl Database {
    /// Resolve `path` starting at row `row_hash` of `table`.
    ///
    /// An empty path yields the whole row, hash field included. A reference
    /// field on the path is followed to the row it names; any other field must
    /// be the last segment.
    pub fn value<S: AsRef<str>>(&self, table: &str, row_hash: &str, path: &[S]) -> StoreResult<Value> {
        if row_hash.is_empty() {
            return Err(StoreError::EmptyRowHash);
        }
        let row = self.row(table, row_hash)?;
        self.follow(table, row, path)
    }

    /// Project `paths` over every row of `table`.
    ///
    /// The result has one row per source row, in insertion order, and one
    /// column per path, in the order given.
    pub fn select<P, S>(&self, table: &str, paths: &[P]) -> StoreResult<Vec<Vec<Value>>>
    where
        P: AsRef<[S]>,
        S: AsRef<str>,
    {
        let source = self.table(table)?;
        source
            .iter()
            .map(|row| {
                paths
                    .iter()
                    .map(|path| self.follow(table, row, path.as_ref()))
                    .collect::<StoreResult<Vec<_>>>()
            })
            .collect()
    }

    /// Resolve a slash-separated path `table/hash/field/...`.
    ///
    /// Every entry of [`Database::ls`] resolves to its concrete value.
    pub fn resolve_path(&self, path: &str) -> StoreResult<Value> {
        let mut segments = path.split('/');
        let table = segments.next().unwrap_or_default();
        let hash = segments.next().unwrap_or_default();
        let rest: Vec<&str> = segments.collect();
        self.value(table, hash, &rest[..])
    }

    fn follow<S: AsRef<str>>(&self, table: &str, row: &Row, path: &[S]) -> StoreResult<Value> {
        let hash_field = self.config.hash_field.as_str();
        let mut table = table;
        let mut row = row;
        let mut path = path;

        loop {
            let Some((key, rest)) = path.split_first() else {
                return Ok(row.to_json(hash_field));
            };
            let key = key.as_ref();

            let extra = |field: &str| match rest.first() {
                Some(extra) => Err(StoreError::ExtraPathSegment {
                    table: table.to_string(),
                    hash: row.hash().to_hex(),
                    field: field.to_string(),
                    extra: extra.as_ref().to_string(),
                }),
                None => Ok(()),
            };

            if key == hash_field {
                extra(key)?;
                return Ok(Value::String(row.hash().to_hex()));
            }

            let value = row.get(key).ok_or_else(|| StoreError::FieldNotFound {
                table: table.to_string(),
                hash: row.hash().to_hex(),
                field: key.to_string(),
            })?;

            let Some(target) = self.config.link_target(key) else {
                extra(key)?;
                return Ok(value.clone());
            };

            let target_hash = value.as_str().ok_or_else(|| StoreError::LinkNotHash {
                table: table.to_string(),
                hash: row.hash().to_hex(),
                field: key.to_string(),
            })?;
            if target_hash.is_empty() {
                return Err(StoreError::EmptyRowHash);
            }

            row = self.row(target, target_hash)?.as_ref();
            table = target;
            path = rest;
        }
    }
}
