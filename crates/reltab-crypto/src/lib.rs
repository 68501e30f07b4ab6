//! Content hashing for reltab.
//!
//! Provides domain-separated BLAKE3 hashing over a canonical JSON encoding,
//! and the [`HashProvider`] capability the store uses to stamp and validate
//! hashes on JSON trees.
//!
//! All crypto operations wrap established libraries -- no custom cryptography.

pub mod canonical;
pub mod error;
pub mod hasher;
pub mod provider;

pub use error::{HashError, HashResult};
pub use hasher::ContentHasher;
pub use provider::{ApplyOptions, Blake3HashProvider, HashProvider};
