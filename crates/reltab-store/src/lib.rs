//! In-memory, content-addressed relational tables over plain JSON.
//!
//! A [`Database`] holds named [`Table`]s of [`Row`]s. Every row carries a
//! deterministic content hash, so merging the same row twice is a no-op.
//! Rows refer to each other through reference fields (`authorHash` holds the
//! hash of a row in table `author`), and paths of such fields can be
//! followed across tables.
//!
//! # Operations
//!
//! - [`Database::add_data`] -- validate and merge a batch of tables
//! - [`Database::table`], [`Database::row`], [`Database::row_hash`],
//!   [`Database::ls`] -- direct access
//! - [`Database::value`], [`Database::select`] -- link resolution
//! - [`Database::check_links`], [`Database::check_table_names`] -- validation
//!
//! # Design Rules
//!
//! 1. Snapshots are immutable: a merge returns a new [`Database`] and leaves
//!    the receiver as it was.
//! 2. Rows are never rewritten once stored. A later merge can only append.
//! 3. Each table's ordered arena and hash index change together.
//! 4. Referential integrity is checked on request, never at insertion.
//! 5. Hashing is delegated to an injected [`reltab_crypto::HashProvider`].

pub mod config;
pub mod database;
pub mod error;
pub mod integrity;
pub mod merge;
pub mod resolver;
pub mod row;
pub mod table;

// Re-export primary types at crate root for ergonomic imports.
pub use config::StoreConfig;
pub use database::Database;
pub use error::{ErrorKind, StoreError, StoreResult};
pub use integrity::IntegrityReport;
pub use merge::MergeOptions;
pub use row::Row;
pub use table::Table;

pub use reltab_crypto::{ApplyOptions, Blake3HashProvider, HashProvider};
pub use reltab_types::{ContentHash, NameRule};
