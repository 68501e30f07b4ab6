//! Foundation types for reltab.
//!
//! Every other reltab crate depends on `reltab-types`.
//!
//! # Key Types
//!
//! - [`ContentHash`] -- Content-addressed identifier (BLAKE3 digest) of a row,
//!   a table or a whole database
//! - [`NameRule`] -- The table-naming rule a name violated
//! - [`TypeError`] -- Errors from parsing hashes and validating names

pub mod error;
pub mod hash;
pub mod names;

pub use error::TypeError;
pub use hash::ContentHash;
pub use names::{validate_table_name, validate_table_names, NameRule};
