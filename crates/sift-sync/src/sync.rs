//! The commit listener that keeps indexes in step with the store.
//!
//! `SearchSync` owns a shared [`IndexRegistry`]. Register it as a
//! [`CommitListener`] on the relational store and every committed
//! transaction is grouped by record type and written to the matching
//! indexes, one all-or-nothing batch per type. The same value hands out
//! searchers and query proxies for reading.

use std::sync::Arc;

use sift_core::{Change, CommitListener, Record, RecordType, RelationalQuery, Result};
use sift_fts::{IndexRegistry, SearchHit, SearchParams, Searcher, WriteStats};

use crate::collector::collect;
use crate::proxy::QueryProxy;

/// Outcome of writing one record type's batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Record type name.
    pub record_type: String,
    /// What was written.
    pub stats: WriteStats,
}

/// Synchronises committed changes into per-type indexes.
#[derive(Debug, Clone)]
pub struct SearchSync {
    registry: Arc<IndexRegistry>,
}

impl SearchSync {
    /// Create a sync engine over `registry`.
    pub fn new(registry: Arc<IndexRegistry>) -> Self {
        Self { registry }
    }

    /// Get the shared registry.
    pub fn registry(&self) -> &Arc<IndexRegistry> {
        &self.registry
    }

    /// Write one commit's changes to the indexes.
    ///
    /// Each record type's batch commits on its own. If a batch fails, later
    /// types are not written and the error is returned; batches already
    /// committed stay committed.
    pub fn apply(&self, changes: &[Change]) -> Result<Vec<BatchReport>> {
        let mut reports = Vec::new();
        for batch in collect(changes) {
            let indexer = self.registry.indexer(&batch.record_type)?;
            let stats = indexer.apply(&batch.changes)?;
            reports.push(BatchReport {
                record_type: batch.record_type.name().to_string(),
                stats,
            });
        }
        Ok(reports)
    }

    /// Replace `record_type`'s index contents with `records`, atomically.
    pub fn reindex<'a, I>(&self, record_type: &RecordType, records: I) -> Result<WriteStats>
    where
        I: IntoIterator<Item = &'a dyn Record>,
    {
        let stats = self.registry.indexer(record_type)?.rebuild(records)?;
        log::info!("Reindexed {} documents for {}", stats.upserted, record_type.name());
        Ok(stats)
    }

    /// Searcher over `record_type`'s index.
    pub fn searcher(&self, record_type: &RecordType) -> Result<Searcher> {
        self.registry.searcher(record_type)
    }

    /// Search `record_type` directly, without touching the relational store.
    pub fn pure_search(
        &self,
        record_type: &RecordType,
        params: &SearchParams,
    ) -> Result<Vec<SearchHit>> {
        self.searcher(record_type)?.search(params)
    }

    /// Wrap a relational query over `record_type` in a [`QueryProxy`].
    pub fn query<Q: RelationalQuery>(
        &self,
        record_type: &RecordType,
        query: Q,
    ) -> Result<QueryProxy<Q>> {
        Ok(QueryProxy::new(query, self.searcher(record_type)?))
    }
}

impl CommitListener for SearchSync {
    fn on_commit(&self, changes: &[Change]) -> Result<()> {
        let reports = self.apply(changes)?;
        for report in &reports {
            log::debug!(
                "Indexed commit for {}: {} upserted, {} deleted",
                report.record_type,
                report.stats.upserted,
                report.stats.deleted
            );
        }
        Ok(())
    }
}
