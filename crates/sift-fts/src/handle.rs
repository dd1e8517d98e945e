//! Opened index for one record type.
//!
//! An `IndexHandle` bundles the Tantivy index with its single writer and a
//! manually reloaded reader. The writer sits behind a mutex so at most one
//! write transaction per record type is open at a time; the reader is only
//! reloaded after a successful commit, so searches observe either the state
//! before a batch or the state after it.
//!
//! The writer is created on the first write. Until then the handle holds no
//! directory lock, so a read-only process can search an index that another
//! process is writing to.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use sift_core::{Error, Result};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy};

use crate::analyzer::register_analyzer;
use crate::metadata::IndexMetadata;
use crate::schema::IndexSchema;
use crate::types::SyncConfig;

/// Opened index for one record type.
pub struct IndexHandle {
    index: Index,
    reader: IndexReader,
    writer: Mutex<Option<IndexWriter>>,
    writer_memory: usize,
    schema: IndexSchema,
    path: Option<PathBuf>,
}

impl IndexHandle {
    /// Open the index in `index_path`, creating it if it does not exist.
    ///
    /// An existing index must carry metadata matching `schema`.
    pub fn open_or_create(index_path: &Path, schema: IndexSchema, config: &SyncConfig) -> Result<Self> {
        // Ensure directory exists
        if !index_path.exists() {
            std::fs::create_dir_all(index_path).map_err(|e| Error::io_with_path(e, index_path))?;
        }

        // Create or open index
        let index = if index_path.join("meta.json").exists() {
            let metadata = IndexMetadata::load(index_path)?.ok_or_else(|| {
                Error::schema_mismatch(
                    schema.record_type(),
                    format!("{} holds an index without Sift metadata", index_path.display()),
                )
            })?;
            metadata.validate(&schema)?;

            log::info!(
                "Opening index for {} at {}",
                schema.record_type(),
                index_path.display()
            );
            Index::open_in_dir(index_path)
                .map_err(|e| Error::index(format!("Failed to open index: {e}")))?
        } else {
            log::info!(
                "Creating index for {} at {}",
                schema.record_type(),
                index_path.display()
            );
            let index = Index::create_in_dir(index_path, schema.schema().clone())
                .map_err(|e| Error::index(format!("Failed to create index: {e}")))?;
            IndexMetadata::from_schema(&schema).save(index_path)?;
            index
        };

        Self::from_index(index, schema, config, Some(index_path.to_path_buf()))
    }

    /// Create an in-memory index (for testing and ephemeral use).
    pub fn in_memory(schema: IndexSchema, config: &SyncConfig) -> Result<Self> {
        let index = Index::create_in_ram(schema.schema().clone());
        Self::from_index(index, schema, config, None)
    }

    fn from_index(
        index: Index,
        schema: IndexSchema,
        config: &SyncConfig,
        path: Option<PathBuf>,
    ) -> Result<Self> {
        register_analyzer(&index, config);

        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| Error::index(format!("Failed to create index reader: {e}")))?;

        Ok(Self {
            index,
            reader,
            writer: Mutex::new(None),
            writer_memory: config.writer_memory_bytes,
            schema,
            path,
        })
    }

    /// Get reference to the underlying Tantivy index.
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// The index reader; reloaded after each commit.
    pub fn reader(&self) -> &IndexReader {
        &self.reader
    }

    /// Get the schema.
    pub fn schema(&self) -> &IndexSchema {
        &self.schema
    }

    /// Record type name.
    pub fn record_type(&self) -> &str {
        self.schema.record_type()
    }

    /// Index directory, `None` for in-memory indexes.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of live documents visible to searches.
    pub fn document_count(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Whether the writer (and with it the directory lock) has been taken.
    pub fn has_writer(&self) -> bool {
        self.writer.lock().map(|w| w.is_some()).unwrap_or(false)
    }

    /// Run `f` inside the exclusive write transaction for this index,
    /// creating the writer on first use.
    pub(crate) fn with_writer<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut IndexWriter) -> Result<T>,
    {
        let mut slot = self
            .writer
            .lock()
            .map_err(|_| Error::index(format!("Index writer for {} is poisoned", self.record_type())))?;

        let writer = match slot.take() {
            Some(writer) => writer,
            None => {
                log::debug!("Creating index writer for {}", self.record_type());
                self.index
                    .writer_with_num_threads(1, self.writer_memory)
                    .map_err(|e| Error::index(format!("Failed to create index writer: {e}")))?
            }
        };
        f(slot.insert(writer))
    }

    /// Make the last commit visible to new searchers.
    pub(crate) fn reload(&self) -> Result<()> {
        self.reader
            .reload()
            .map_err(|e| Error::index(format!("Failed to reload index reader: {e}")))
    }
}

impl std::fmt::Debug for IndexHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexHandle")
            .field("record_type", &self.schema.record_type())
            .field("path", &self.path)
            .field("index", &"<tantivy::Index>")
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
