//! Sift Core — shared types, traits, and errors.
//!
//! This crate provides the foundational types used across all Sift crates.
//! It has no internal Sift dependencies (dependency level 0) and knows
//! nothing about the search engine.
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`record`]: Record types, attribute values, changes, commit listeners
//! - [`relational`]: The relational query seam used by the query proxy
//! - [`util`]: Storage name helpers

pub mod error;
pub mod record;
pub mod relational;
pub mod util;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use record::{
    Change, Column, ColumnType, CommitListener, FieldValue, IndexChange, Operation, Record,
    RecordType, RecordTypeBuilder,
};
pub use relational::RelationalQuery;

// Convenience re-exports from util
pub use util::ids::storage_name;
