//! Canonical JSON encoding of object nodes.
//!
//! Top-level keys are emitted in byte order regardless of how the map stores
//! them, so the digest never depends on key order.

use serde::Serializer;
use serde_json::{Map, Value};

use crate::error::{HashError, HashResult};

/// Encode an object through serde_json, leaving out `skip` at the top level.
///
/// Used to hash a node without its own hash field. Nested objects keep
/// their hash fields, which is what makes parent hashes depend on
/// children's hashes.
pub fn encode_object_without(object: &Map<String, Value>, skip: &str) -> HashResult<Vec<u8>> {
    let mut entries: Vec<(&String, &Value)> =
        object.iter().filter(|(key, _)| key.as_str() != skip).collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = Vec::new();
    serde_json::Serializer::new(&mut out)
        .collect_map(entries)
        .map_err(|e| HashError::Serialization(e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn skip_only_applies_at_top_level() {
        let map = object(json!({"hash": "top", "k": 1, "nested": {"hash": "inner"}}));
        let bytes = encode_object_without(&map, "hash").unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"k":1,"nested":{"hash":"inner"}}"#
        );
    }

    #[test]
    fn equals_serde_json_without_skipped_key() {
        let map = object(json!({
            "f": 1.5,
            "big": u64::MAX,
            "text": "é \u{7f} \u{1f} \u{2028} 🦀",
            "m": {"hash": "x", "z": [null, true]},
        }));
        let mut expected = map.clone();
        expected.remove("m");
        assert_eq!(
            encode_object_without(&map, "m").unwrap(),
            serde_json::to_vec(&expected).unwrap()
        );
    }
}
