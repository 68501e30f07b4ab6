//! Point-in-time consistency checks.
//!
//! References are not enforced at insertion: a snapshot may hold dangling
//! links until [`Database::check_links`] is asked to assert otherwise.

use crate::database::Database;
use crate::error::{StoreError, StoreResult};

/// Result of a full reference scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntegrityReport {
    pub tables_checked: usize,
    pub rows_checked: usize,
    pub links_checked: usize,
    /// Every violation, in scan order.
    pub violations: Vec<StoreError>,
}

impl IntegrityReport {
    /// Returns `true` if every reference resolved.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

impl Database {
    /// Fail on the first reference that does not resolve.
    ///
    /// Scans tables in name order, rows in insertion order and fields in key
    /// order. The error names the source table, the source row's hash, the
    /// reference field, the target table and, for a missing row, the target
    /// hash.
    pub fn check_links(&self) -> StoreResult<()> {
        match self.scan_links(true).violations.into_iter().next() {
            Some(violation) => Err(violation),
            None => Ok(()),
        }
    }

    /// Scan every reference and collect all violations.
    pub fn integrity_report(&self) -> IntegrityReport {
        self.scan_links(false)
    }

    /// Recompute every stored row, table and aggregate hash and compare.
    pub fn verify_hashes(&self) -> StoreResult<()> {
        Ok(self.provider.validate(&self.to_json())?)
    }

    fn scan_links(&self, stop_at_first: bool) -> IntegrityReport {
        let mut report = IntegrityReport {
            tables_checked: 0,
            rows_checked: 0,
            links_checked: 0,
            violations: Vec::new(),
        };

        for (name, table) in &self.tables {
            report.tables_checked += 1;
            for row in table.iter() {
                report.rows_checked += 1;
                for (field, value) in row.fields() {
                    let Some(target) = self.config.link_target(field) else {
                        continue;
                    };
                    report.links_checked += 1;

                    let violation = match value.as_str() {
                        None => Some(StoreError::LinkNotHash {
                            table: name.clone(),
                            hash: row.hash().to_hex(),
                            field: field.clone(),
                        }),
                        Some(target_hash) => match self.table(target) {
                            Err(_) => Some(StoreError::DanglingTable {
                                table: name.clone(),
                                hash: row.hash().to_hex(),
                                field: field.clone(),
                                target: target.to_string(),
                            }),
                            Ok(_) if self.row(target, target_hash).is_err() => {
                                Some(StoreError::DanglingRow {
                                    table: name.clone(),
                                    hash: row.hash().to_hex(),
                                    field: field.clone(),
                                    target: target.to_string(),
                                    target_hash: target_hash.to_string(),
                                })
                            }
                            Ok(_) => None,
                        },
                    };

                    if let Some(violation) = violation {
                        report.violations.push(violation);
                        if stop_at_first {
                            return report;
                        }
                    }
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::merge::MergeOptions;
    use reltab_types::ContentHash;
    use serde_json::json;

    fn connected() -> Database {
        let db = Database::from_data(
            json!({"b": {"rows": [{"v": 1}]}}),
            MergeOptions::default(),
        )
        .unwrap();
        let b = db.row_hash("b", 0).unwrap().to_hex();
        db.add_data(json!({"a": {"rows": [{"bHash": b}]}}), MergeOptions::default())
            .unwrap()
    }

    #[test]
    fn connected_graph_passes() {
        let db = connected();
        db.check_links().unwrap();
        let report = db.integrity_report();
        assert!(report.is_valid());
        assert_eq!(report.tables_checked, 2);
        assert_eq!(report.rows_checked, 2);
        assert_eq!(report.links_checked, 1);
    }

    #[test]
    fn dangling_row_detected() {
        let missing = ContentHash::from_bytes(b"missing").to_hex();
        let db = connected()
            .add_data(json!({"a": {"rows": [{"bHash": missing}]}}), MergeOptions::default())
            .unwrap();
        let source = db.row_hash("a", 1).unwrap().to_hex();

        let err = db.check_links().unwrap_err();
        assert_eq!(
            err,
            StoreError::DanglingRow {
                table: "a".into(),
                hash: source,
                field: "bHash".into(),
                target: "b".into(),
                target_hash: missing,
            }
        );
        assert_eq!(err.kind(), ErrorKind::Integrity);
    }

    #[test]
    fn dangling_table_detected() {
        let db = Database::from_data(
            json!({"a": {"rows": [{"ghostHash": ContentHash::from_bytes(b"x").to_hex()}]}}),
            MergeOptions::default(),
        )
        .unwrap();
        assert!(matches!(
            db.check_links(),
            Err(StoreError::DanglingTable { ref target, .. }) if target == "ghost"
        ));
    }

    #[test]
    fn report_collects_every_violation() {
        let db = Database::from_data(
            json!({"a": {"rows": [
                {"bHash": "nothex"},
                {"cHash": 5},
                {"bHash": ContentHash::from_bytes(b"y").to_hex()},
            ]}, "b": {"rows": []}}),
            MergeOptions::default(),
        )
        .unwrap();
        let report = db.integrity_report();
        assert_eq!(report.violations.len(), 3);
        assert!(!report.is_valid());
        assert!(matches!(report.violations[0], StoreError::DanglingRow { .. }));
        assert!(matches!(report.violations[1], StoreError::LinkNotHash { .. }));
    }

    #[test]
    fn verify_hashes_passes_on_ingested_data() {
        connected().verify_hashes().unwrap();
    }

    #[test]
    fn verify_hashes_catches_trusted_bogus_hash() {
        let bogus = ContentHash::from_bytes(b"bogus").to_hex();
        let db = Database::from_data(
            json!({"t": {"rows": [{"k": 1, "hash": bogus}]}}),
            MergeOptions::default(),
        )
        .unwrap();
        assert_eq!(db.verify_hashes().unwrap_err().kind(), ErrorKind::Integrity);
    }
}
