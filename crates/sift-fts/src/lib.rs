//! Full-text indexing and search for Sift record types.
//!
//! This crate owns everything that touches the Tantivy engine: deriving an
//! index schema from a record type, opening one index per type, applying
//! committed change batches, and running text queries.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       sift-fts                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  IndexRegistry (record type name → IndexHandle)             │
//! │  ├── IndexSchema (identifier + analyzed-text fields)        │
//! │  ├── IndexMetadata (sift-index.json, checked on open)       │
//! │  └── sift_stem analyzer (stopwords + English stemming)      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Indexer (all-or-nothing write batches)                     │
//! │  Searcher (score-ordered primary keys)                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Index Schema
//!
//! | Field | Type | Purpose |
//! |-------|------|---------|
//! | primary key | STRING, STORED | Identifier; exact-match deletes |
//! | each searchable textual column | TEXT (`sift_stem`) | Analyzed text, not stored |
//!
//! # Example
//!
//! ```rust,ignore
//! use sift_fts::{IndexRegistry, SearchParams, SyncConfig};
//!
//! let registry = IndexRegistry::on_disk(SyncConfig::default());
//! let searcher = registry.searcher(&article_type)?;
//!
//! for hit in searcher.search(&SearchParams::new("red fox").with_limit(10))? {
//!     println!("{} ({:.2})", hit.primary_key, hit.score);
//! }
//! ```

pub mod analyzer;
pub mod handle;
pub mod indexer;
pub mod metadata;
pub mod registry;
pub mod schema;
pub mod searcher;
pub mod types;

// Re-exports
pub use analyzer::{ANALYZER_NAME, Stopwords, build_analyzer, register_analyzer};
pub use handle::IndexHandle;
pub use indexer::{Indexer, WriteStats, build_document};
pub use metadata::{IndexMetadata, METADATA_FILE};
pub use registry::IndexRegistry;
pub use schema::{IndexSchema, SCHEMA_VERSION, TextField};
pub use searcher::Searcher;
pub use types::{
    NonTextualPolicy, QueryMode, SearchHit, SearchParams, StopwordList, SyncConfig,
};
