use thiserror::Error;

use crate::names::NameRule;

/// Errors produced by type operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid table name {name:?}: {rule}")]
    InvalidTableName { name: String, rule: NameRule },
}
