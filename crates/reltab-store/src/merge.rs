//! Ingestion and dedup-aware merging of row batches.

use std::sync::Arc;

use reltab_crypto::ApplyOptions;
use reltab_types::{names, ContentHash};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::database::Database;
use crate::error::{StoreError, StoreResult};
use crate::row::Row;
use crate::table::Table;

/// Flags for [`Database::add_data`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// Check every hash already present in the batch before merging.
    pub validate_hashes: bool,
    /// Recompute hashes already present in the batch instead of trusting them.
    pub update_hashes: bool,
}

impl Database {
    /// Merge a batch of tables and return the resulting snapshot.
    ///
    /// `batch` maps table names to objects carrying a rows array. All
    /// structural checks run before anything is merged, and `self` is never
    /// modified: on error nothing changes, on success the new snapshot shares
    /// every untouched table and every pre-existing row with `self`.
    ///
    /// Within each table, rows whose hash is already present are dropped
    /// (first occurrence wins, no field-level overwrite); novel rows are
    /// appended in the order given.
    pub fn add_data(&self, mut batch: Value, options: MergeOptions) -> StoreResult<Database> {
        self.check_batch(&batch)?;

        if options.validate_hashes {
            self.provider.validate(&batch)?;
        }
        self.provider.apply(
            &mut batch,
            ApplyOptions {
                update_existing: options.update_hashes,
                verify_existing: false,
            },
        )?;

        let Value::Object(entries) = batch else {
            return Err(StoreError::BatchNotObject);
        };

        let mut next = self.clone();
        let mut changed = false;
        for (name, entry) in entries {
            if name == self.config.hash_field {
                continue;
            }
            let rows = self.parse_rows(&name, entry)?;
            let table = next
                .tables
                .entry(name.clone())
                .or_insert_with(|| {
                    changed = true;
                    Arc::new(Table::new(name.as_str()))
                });

            if rows.iter().all(|row| table.contains(&row.hash())) {
                debug!(table = %name, dropped = rows.len(), "batch holds no new rows");
                continue;
            }

            let table = Arc::make_mut(table);
            let (mut appended, mut dropped) = (0usize, 0usize);
            for row in rows {
                if table.insert(row) {
                    appended += 1;
                } else {
                    dropped += 1;
                }
            }
            changed = true;
            debug!(table = %name, appended, dropped, total = table.len(), "merged table");
        }

        if changed || next.hash.is_none() {
            next.refresh_content_hash()?;
        }
        Ok(next)
    }

    /// Structural checks, in order: shape, rows presence, rows type, names,
    /// row objects.
    fn check_batch(&self, batch: &Value) -> StoreResult<()> {
        let Some(entries) = batch.as_object() else {
            return Err(StoreError::BatchNotObject);
        };
        let config = &self.config;
        let tables = move || entries.iter().filter(move |(name, _)| **name != config.hash_field);

        let mut missing = Vec::new();
        let mut not_array = Vec::new();
        for (name, entry) in tables() {
            match entry.get(&config.rows_field) {
                None => missing.push(name.clone()),
                Some(Value::Array(_)) => {}
                Some(_) => not_array.push(name.clone()),
            }
        }
        if !missing.is_empty() {
            return Err(StoreError::MissingRows {
                field: config.rows_field.clone(),
                tables: missing,
            });
        }
        if !not_array.is_empty() {
            return Err(StoreError::RowsNotArray {
                field: config.rows_field.clone(),
                tables: not_array,
            });
        }

        names::validate_table_names(tables().map(|(name, _)| name), &config.link_suffix)?;

        for (name, entry) in tables() {
            let rows = entry[config.rows_field.as_str()].as_array();
            for (index, row) in rows.into_iter().flatten().enumerate() {
                if !row.is_object() {
                    return Err(StoreError::RowNotObject {
                        table: name.clone(),
                        index,
                    });
                }
            }
        }
        Ok(())
    }

    /// Turn a stamped table entry into rows, keeping batch order.
    fn parse_rows(&self, table: &str, entry: Value) -> StoreResult<Vec<Arc<Row>>> {
        let hash_field = self.config.hash_field.as_str();
        let rows = match entry {
            Value::Object(mut object) => object.remove(&self.config.rows_field),
            _ => None,
        };
        let Some(Value::Array(rows)) = rows else {
            return Err(StoreError::MissingRows {
                field: self.config.rows_field.clone(),
                tables: vec![table.to_string()],
            });
        };

        rows.into_iter()
            .enumerate()
            .map(|(index, row)| {
                let Value::Object(fields) = row else {
                    return Err(StoreError::RowNotObject {
                        table: table.to_string(),
                        index,
                    });
                };
                let hash = row_hash(&fields, hash_field).ok_or_else(|| {
                    StoreError::InvalidRowHash {
                        table: table.to_string(),
                        index,
                        value: fields.get(hash_field).unwrap_or(&Value::Null).to_string(),
                    }
                })?;
                Ok(Arc::new(Row::new(hash, fields, hash_field)))
            })
            .collect()
    }
}

fn row_hash(fields: &Map<String, Value>, hash_field: &str) -> Option<ContentHash> {
    fields
        .get(hash_field)
        .and_then(Value::as_str)
        .and_then(|s| ContentHash::from_hex(s).ok())
}
