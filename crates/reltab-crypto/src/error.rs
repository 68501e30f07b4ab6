//! Error types for hashing operations.

use reltab_types::ContentHash;

/// Errors from hashing JSON trees.
///
/// `path` is the JSON pointer of the offending object node (`""` for the
/// root).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HashError {
    /// An embedded hash disagrees with a fresh computation.
    #[error("hash mismatch at {path:?}: stored {stored}, computed {computed}")]
    Mismatch {
        path: String,
        stored: ContentHash,
        computed: ContentHash,
    },

    /// A hash field holds something other than a 64-char hex string.
    #[error("invalid hash at {path:?}: {value}")]
    InvalidHash { path: String, value: String },

    /// A node could not be encoded for hashing.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for hashing operations.
pub type HashResult<T> = Result<T, HashError>;
