//! The hashing capability consumed by the store.
//!
//! The store never hashes anything itself: it hands JSON trees to a
//! [`HashProvider`] and reads the stamped hash fields back. Any
//! deterministic, fixed-length, structure-sensitive digest satisfies the
//! contract; [`Blake3HashProvider`] is the stock implementation.

use reltab_types::ContentHash;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{HashError, HashResult};
use crate::hasher::ContentHasher;

/// Flags for [`HashProvider::apply`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Recompute and overwrite hashes that are already present.
    pub update_existing: bool,
    /// Fail if a hash that is kept disagrees with a fresh computation.
    pub verify_existing: bool,
}

/// Computes and validates content hashes over JSON trees.
///
/// Implementations must satisfy these invariants:
/// - Every object node is hashed over its canonical content excluding its
///   own hash field.
/// - Nested objects are hashed first, so a parent's hash depends on its
///   children's hashes.
/// - The same content always produces the same hash.
pub trait HashProvider: Send + Sync {
    /// Assign or refresh a hash at every object node of `tree`.
    fn apply(&self, tree: &mut Value, options: ApplyOptions) -> HashResult<()>;

    /// Fail if any embedded hash disagrees with a fresh computation.
    fn validate(&self, tree: &Value) -> HashResult<()>;

    /// Name of the field the hash is stored under.
    fn hash_field(&self) -> &str;
}

/// [`HashProvider`] backed by domain-separated BLAKE3.
#[derive(Clone, Debug)]
pub struct Blake3HashProvider {
    hasher: ContentHasher,
    hash_field: String,
}

impl Blake3HashProvider {
    /// Create a provider that stores hashes under `hash_field`.
    pub fn new(hash_field: impl Into<String>) -> Self {
        Self {
            hasher: ContentHasher::OBJECT,
            hash_field: hash_field.into(),
        }
    }

    fn stamp(
        &self,
        node: &mut Value,
        path: &mut String,
        options: ApplyOptions,
        stamped: &mut usize,
    ) -> HashResult<()> {
        match node {
            Value::Array(items) => {
                for (i, item) in items.iter_mut().enumerate() {
                    let len = path.len();
                    push_index(path, i);
                    self.stamp(item, path, options, stamped)?;
                    path.truncate(len);
                }
            }
            Value::Object(object) => {
                for (key, child) in object.iter_mut() {
                    if *key == self.hash_field {
                        continue;
                    }
                    let len = path.len();
                    push_key(path, key);
                    self.stamp(child, path, options, stamped)?;
                    path.truncate(len);
                }

                match object.get(&self.hash_field) {
                    Some(existing) if !options.update_existing => {
                        let stored = parse_hash(existing, path)?;
                        if options.verify_existing {
                            self.check(object, stored, path)?;
                        }
                    }
                    _ => {
                        let computed = self.hasher.hash_object(object, &self.hash_field)?;
                        object.insert(self.hash_field.clone(), Value::String(computed.to_hex()));
                        *stamped += 1;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn verify(&self, node: &Value, path: &mut String) -> HashResult<()> {
        match node {
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    let len = path.len();
                    push_index(path, i);
                    self.verify(item, path)?;
                    path.truncate(len);
                }
            }
            Value::Object(object) => {
                for (key, child) in object {
                    if *key == self.hash_field {
                        continue;
                    }
                    let len = path.len();
                    push_key(path, key);
                    self.verify(child, path)?;
                    path.truncate(len);
                }
                if let Some(existing) = object.get(&self.hash_field) {
                    let stored = parse_hash(existing, path)?;
                    self.check(object, stored, path)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn check(&self, object: &Map<String, Value>, stored: ContentHash, path: &str) -> HashResult<()> {
        let computed = self.hasher.hash_object(object, &self.hash_field)?;
        if computed != stored {
            return Err(HashError::Mismatch {
                path: path.to_string(),
                stored,
                computed,
            });
        }
        Ok(())
    }
}

impl Default for Blake3HashProvider {
    fn default() -> Self {
        Self::new("hash")
    }
}

impl HashProvider for Blake3HashProvider {
    fn apply(&self, tree: &mut Value, options: ApplyOptions) -> HashResult<()> {
        let mut path = String::new();
        let mut stamped = 0usize;
        self.stamp(tree, &mut path, options, &mut stamped)?;
        debug!(stamped, update = options.update_existing, "applied content hashes");
        Ok(())
    }

    fn validate(&self, tree: &Value) -> HashResult<()> {
        self.verify(tree, &mut String::new())
    }

    fn hash_field(&self) -> &str {
        &self.hash_field
    }
}

fn parse_hash(value: &Value, path: &str) -> HashResult<ContentHash> {
    value
        .as_str()
        .and_then(|s| ContentHash::from_hex(s).ok())
        .ok_or_else(|| HashError::InvalidHash {
            path: path.to_string(),
            value: value.to_string(),
        })
}

fn push_index(path: &mut String, index: usize) {
    path.push('/');
    path.push_str(&index.to_string());
}

// JSON pointer escaping: `~` becomes `~0`, `/` becomes `~1`.
fn push_key(path: &mut String, key: &str) {
    path.push('/');
    path.push_str(&key.replace('~', "~0").replace('/', "~1"));
}
