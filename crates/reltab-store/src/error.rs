use reltab_crypto::HashError;
use reltab_types::TypeError;

/// Coarse classification of a [`StoreError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unknown table, row hash or field key.
    NotFound,
    /// Missing or wrongly-typed rows container, invalid table name, bad hash.
    Malformed,
    /// Dangling reference or hash/content mismatch.
    Integrity,
    /// Empty row hash, extra path segment, index out of range.
    InvalidArgument,
}

/// Errors from store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("table not found: {table}")]
    TableNotFound { table: String },

    #[error("row {hash} not found in table {table}")]
    RowNotFound { table: String, hash: String },

    #[error("key {field:?} not found in row {hash} of table {table}")]
    FieldNotFound {
        table: String,
        hash: String,
        field: String,
    },

    /// The ingestion batch is not a JSON object.
    #[error("batch must be a JSON object mapping table names to tables")]
    BatchNotObject,

    #[error("tables missing a {field:?} array: {}", .tables.join(", "))]
    MissingRows { field: String, tables: Vec<String> },

    #[error("tables whose {field:?} is not an array: {}", .tables.join(", "))]
    RowsNotArray { field: String, tables: Vec<String> },

    #[error("row {index} of table {table} is not a JSON object")]
    RowNotObject { table: String, index: usize },

    #[error("row {index} of table {table} carries an invalid hash: {value}")]
    InvalidRowHash {
        table: String,
        index: usize,
        value: String,
    },

    #[error(transparent)]
    InvalidName(#[from] TypeError),

    #[error(transparent)]
    Hash(#[from] HashError),

    /// A reference field holds something other than a hash string.
    #[error("link {field:?} in row {hash} of table {table} is not a hash string")]
    LinkNotHash {
        table: String,
        hash: String,
        field: String,
    },

    #[error("row {hash} of table {table} links via {field:?} to missing table {target}")]
    DanglingTable {
        table: String,
        hash: String,
        field: String,
        target: String,
    },

    #[error(
        "row {hash} of table {table} links via {field:?} to missing row {target_hash} in table {target}"
    )]
    DanglingRow {
        table: String,
        hash: String,
        field: String,
        target: String,
        target_hash: String,
    },

    #[error("empty row hash")]
    EmptyRowHash,

    #[error(
        "extra key {extra:?} after non-link value {field:?} in row {hash} of table {table}"
    )]
    ExtraPathSegment {
        table: String,
        hash: String,
        field: String,
        extra: String,
    },

    #[error("index {index} out of range for table {table} with {len} rows")]
    IndexOutOfRange {
        table: String,
        index: usize,
        len: usize,
    },
}

impl StoreError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TableNotFound { .. } | Self::RowNotFound { .. } | Self::FieldNotFound { .. } => {
                ErrorKind::NotFound
            }
            Self::BatchNotObject
            | Self::MissingRows { .. }
            | Self::RowsNotArray { .. }
            | Self::RowNotObject { .. }
            | Self::InvalidRowHash { .. }
            | Self::InvalidName(_)
            | Self::Hash(HashError::InvalidHash { .. })
            | Self::Hash(HashError::Serialization(_)) => ErrorKind::Malformed,
            Self::Hash(HashError::Mismatch { .. })
            | Self::LinkNotHash { .. }
            | Self::DanglingTable { .. }
            | Self::DanglingRow { .. } => ErrorKind::Integrity,
            Self::EmptyRowHash | Self::ExtraPathSegment { .. } | Self::IndexOutOfRange { .. } => {
                ErrorKind::InvalidArgument
            }
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
