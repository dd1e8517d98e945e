//! Batched index writes.
//!
//! This module provides `Indexer`, which applies one type's batch of
//! committed changes to that type's index inside a single write
//! transaction:
//!
//! - upserts rebuild the whole document from the live record and replace any
//!   document with the same primary key
//! - deletes remove every document whose identifier equals the record's
//!   primary key
//! - the batch is committed once at the end; any failure rolls the writer
//!   back so nothing from the batch becomes visible
//!
//! # Usage
//!
//! ```rust,ignore
//! use sift_fts::Indexer;
//!
//! let indexer = Indexer::new(registry.get_or_create(&article_type)?);
//! let stats = indexer.apply(&changes)?;
//! println!("{} upserted, {} deleted", stats.upserted, stats.deleted);
//! ```

use std::sync::Arc;

use sift_core::{Error, IndexChange, Record, Result};
use tantivy::{IndexWriter, TantivyDocument, Term};

use crate::handle::IndexHandle;
use crate::schema::IndexSchema;

/// Statistics about one committed write batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    /// Documents added or replaced.
    pub upserted: usize,
    /// Delete operations applied.
    pub deleted: usize,
}

/// Applies change batches to one record type's index.
#[derive(Debug, Clone)]
pub struct Indexer {
    handle: Arc<IndexHandle>,
}

impl Indexer {
    /// Create an indexer writing through `handle`.
    pub fn new(handle: Arc<IndexHandle>) -> Self {
        Self { handle }
    }

    /// Get the handle this indexer writes to.
    pub fn handle(&self) -> &Arc<IndexHandle> {
        &self.handle
    }

    /// Apply a batch of changes in order and commit it atomically.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSearchableField`] if an upserted record lacks
    /// a searchable attribute or its primary key, or [`Error::Index`] if the
    /// engine fails. In both cases nothing from the batch is committed.
    pub fn apply(&self, changes: &[IndexChange]) -> Result<WriteStats> {
        self.transaction(|writer, schema| {
            let mut stats = WriteStats::default();
            for change in changes {
                if change.is_upsert {
                    upsert(writer, schema, change.record.as_ref())?;
                    stats.upserted += 1;
                } else {
                    delete(writer, schema, change.record.as_ref())?;
                    stats.deleted += 1;
                }
            }
            Ok(stats)
        })
    }

    /// Drop every document and index `records` from scratch, atomically.
    pub fn rebuild<'a, I>(&self, records: I) -> Result<WriteStats>
    where
        I: IntoIterator<Item = &'a dyn Record>,
    {
        self.transaction(|writer, schema| {
            writer
                .delete_all_documents()
                .map_err(|e| Error::index(format!("Failed to clear index: {e}")))?;

            let mut stats = WriteStats::default();
            for record in records {
                let document = build_document(schema, record)?;
                writer
                    .add_document(document)
                    .map_err(|e| Error::index(format!("Failed to add document: {e}")))?;
                stats.upserted += 1;
            }
            Ok(stats)
        })
    }

    /// Run `stage` inside the exclusive write transaction, then commit or
    /// roll back.
    fn transaction<F>(&self, stage: F) -> Result<WriteStats>
    where
        F: FnOnce(&IndexWriter, &IndexSchema) -> Result<WriteStats>,
    {
        let schema = self.handle.schema();

        let stats = self.handle.with_writer(|writer| {
            let staged = stage(&*writer, schema).and_then(|stats| {
                writer
                    .commit()
                    .map_err(|e| Error::index(format!("Failed to commit index: {e}")))?;
                Ok(stats)
            });

            staged.inspect_err(|e| {
                log::warn!("Rolling back index batch for {}: {e}", schema.record_type());
                if let Err(rollback) = writer.rollback() {
                    log::error!(
                        "Rollback failed for {}: {rollback}",
                        schema.record_type()
                    );
                }
            })
        })?;

        self.handle.reload()?;
        log::debug!(
            "Committed {} upserts and {} deletes to {}",
            stats.upserted,
            stats.deleted,
            schema.record_type()
        );
        Ok(stats)
    }
}

fn upsert(writer: &IndexWriter, schema: &IndexSchema, record: &dyn Record) -> Result<()> {
    // Build first so a missing attribute fails before anything is staged for
    // this record.
    let document = build_document(schema, record)?;
    writer.delete_term(primary_key_term(schema, record)?);
    writer
        .add_document(document)
        .map_err(|e| Error::index(format!("Failed to add document: {e}")))?;
    Ok(())
}

fn delete(writer: &IndexWriter, schema: &IndexSchema, record: &dyn Record) -> Result<()> {
    writer.delete_term(primary_key_term(schema, record)?);
    Ok(())
}

fn primary_key_term(schema: &IndexSchema, record: &dyn Record) -> Result<Term> {
    let key = record
        .attribute(schema.primary_key())
        .ok_or_else(|| Error::missing_field(schema.record_type(), schema.primary_key()))?;
    Ok(Term::from_field_text(schema.id_field(), &key.to_string()))
}

/// Project a record onto the index schema.
///
/// Every declared searchable attribute must be present on the record, even
/// one left out of the index for being non-textual. Analyzed-text values are
/// stringified; `NULL` values leave the field empty.
pub fn build_document(schema: &IndexSchema, record: &dyn Record) -> Result<TantivyDocument> {
    let key = record
        .attribute(schema.primary_key())
        .ok_or_else(|| Error::missing_field(schema.record_type(), schema.primary_key()))?;

    let mut document = TantivyDocument::new();
    document.add_text(schema.id_field(), key.to_string());

    for name in schema.searchable() {
        let value = record
            .attribute(name)
            .ok_or_else(|| Error::missing_field(schema.record_type(), name))?;
        if let Some(field) = schema.text_field(name)
            && !value.is_null()
        {
            document.add_text(field, value.to_string());
        }
    }

    Ok(document)
}

// ============================================================================
// Tests
// ============================================================================
