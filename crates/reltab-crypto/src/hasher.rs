use reltab_types::ContentHash;
use serde_json::{Map, Value};

use crate::canonical;
use crate::error::HashResult;

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g., `"reltab-object-v1"`) that is
/// prepended to every hash computation, so digests from different domains
/// never collide even over identical bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for JSON object nodes (rows, tables, databases).
    pub const OBJECT: Self = Self {
        domain: "reltab-object-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> ContentHash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        ContentHash::from_digest(*hasher.finalize().as_bytes())
    }

    /// Hash a JSON object excluding its own hash field.
    pub fn hash_object(
        &self,
        object: &Map<String, Value>,
        hash_field: &str,
    ) -> HashResult<ContentHash> {
        Ok(self.hash(&canonical::encode_object_without(object, hash_field)?))
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hash_is_deterministic() {
        let id1 = ContentHasher::OBJECT.hash(b"hello world");
        let id2 = ContentHasher::OBJECT.hash(b"hello world");
        assert_eq!(id1, id2);
    }

    #[test]
    fn different_domains_produce_different_hashes() {
        let custom = ContentHasher::new("my-custom-domain-v1");
        assert_ne!(custom.hash(b"data"), ContentHasher::OBJECT.hash(b"data"));
        assert_ne!(
            ContentHasher::OBJECT.hash(b"data"),
            ContentHash::from_bytes(b"data")
        );
    }

    #[test]
    fn object_hash_ignores_key_order() {
        let Value::Object(a) = json!({"x": 1, "y": 2}) else {
            unreachable!()
        };
        let mut b = Map::new();
        b.insert("y".into(), json!(2));
        b.insert("x".into(), json!(1));
        assert_eq!(
            ContentHasher::OBJECT.hash_object(&a, "hash").unwrap(),
            ContentHasher::OBJECT.hash_object(&b, "hash").unwrap()
        );
    }

    #[test]
    fn object_hash_excludes_hash_field() {
        let Value::Object(bare) = json!({"k": "v"}) else {
            unreachable!()
        };
        let Value::Object(stamped) = json!({"k": "v", "hash": "whatever"}) else {
            unreachable!()
        };
        assert_eq!(
            ContentHasher::OBJECT.hash_object(&bare, "hash").unwrap(),
            ContentHasher::OBJECT.hash_object(&stamped, "hash").unwrap()
        );
    }
}
