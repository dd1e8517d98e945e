//! Sift — relevance-ranked full-text search kept in sync with a relational
//! store.
//!
//! This crate re-exports the Sift layers for convenience:
//!
//! - [`core`]: record types, changes, the relational query seam, errors
//! - [`fts`]: per-type Tantivy indexes, the batch writer and the searcher
//! - [`sync`] (feature `sync`, on by default): the commit listener, the
//!   relevance-ordering query proxy and the in-memory store

pub use sift_core as core;
pub use sift_fts as fts;

#[cfg(feature = "sync")]
pub use sift_sync as sync;

pub use sift_core::{Error, Result};

/// The types most applications need.
pub mod prelude {
    pub use sift_core::{
        Change, ColumnType, CommitListener, FieldValue, Operation, Record, RecordType,
        RelationalQuery,
    };
    pub use sift_fts::{IndexRegistry, QueryMode, SearchHit, SearchParams, SyncConfig};

    #[cfg(feature = "sync")]
    pub use sift_sync::{QueryProxy, SearchSync};
}
