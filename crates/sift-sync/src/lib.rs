//! Commit-time index synchronisation and relevance-ordered queries.
//!
//! This crate connects a relational store to the per-type indexes in
//! `sift-fts`:
//!
//! - [`SearchSync`] listens for committed transactions, groups the changes
//!   by record type ([`collector`]) and writes each group as one index batch
//! - [`QueryProxy`] wraps a relational query, narrows it to a search's hits
//!   and returns rows in relevance order ([`rank`])
//! - [`memory`] is a small in-memory store implementing the relational seams,
//!   used for tests and examples
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sift_fts::{IndexRegistry, SearchParams, SyncConfig};
//! use sift_sync::{MemoryDatabase, SearchSync};
//!
//! let registry = Arc::new(IndexRegistry::on_disk(SyncConfig::default()));
//! let sync = SearchSync::new(registry);
//!
//! let db = MemoryDatabase::new();
//! db.subscribe(Arc::new(sync.clone()))?;
//!
//! let articles = db.table::<Article>();
//! articles.insert(Article::new(1, "red fox", "jumps"))?;
//! db.commit()?;
//!
//! let hits = sync
//!     .query(&ARTICLE, articles.query())?
//!     .search(&SearchParams::new("fox"))?
//!     .fetch()?;
//! ```

pub mod collector;
pub mod memory;
pub mod proxy;
pub mod rank;
pub mod sync;

pub use collector::{TypeBatch, collect};
pub use memory::{MemoryDatabase, MemoryQuery, MemoryTable};
pub use proxy::QueryProxy;
pub use rank::{RankMap, reorder};
pub use sync::{BatchReport, SearchSync};
