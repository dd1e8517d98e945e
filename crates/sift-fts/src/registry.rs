//! Registry of opened indexes, one per record type.
//!
//! The registry is an explicit value owned by the application and shared
//! (behind an `Arc`) with whatever writes or searches. The first request for
//! a record type derives its schema and opens or creates the index; later
//! requests return the same handle. The check-then-create path runs under a
//! mutex so concurrent first uses never open a type's index twice.
//!
//! On-disk indexes live in one directory per record type under
//! [`SyncConfig::base_path`].

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use sift_core::{Error, RecordType, Result, storage_name};

use crate::handle::IndexHandle;
use crate::indexer::Indexer;
use crate::metadata::IndexMetadata;
use crate::schema::IndexSchema;
use crate::searcher::Searcher;
use crate::types::SyncConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Storage {
    Disk,
    Memory,
}

/// Lazily opened indexes keyed by record type name.
#[derive(Debug)]
pub struct IndexRegistry {
    config: SyncConfig,
    storage: Storage,
    handles: Mutex<HashMap<String, Arc<IndexHandle>>>,
}

impl IndexRegistry {
    /// Registry storing each index under `config.base_path`.
    pub fn on_disk(config: SyncConfig) -> Self {
        Self::with_storage(config, Storage::Disk)
    }

    /// Registry keeping every index in RAM.
    pub fn in_memory(config: SyncConfig) -> Self {
        Self::with_storage(config, Storage::Memory)
    }

    fn with_storage(config: SyncConfig, storage: Storage) -> Self {
        Self {
            config,
            storage,
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Get the configuration indexes are opened with.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Directory holding the index for `record_type`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for in-memory registries or for type names
    /// with no usable characters.
    pub fn index_dir(&self, record_type: &str) -> Result<PathBuf> {
        if self.storage == Storage::Memory {
            return Err(Error::config("in-memory registry has no index directories"));
        }
        let name = storage_name(record_type).ok_or_else(|| {
            Error::config(format!("record type name '{record_type}' has no usable characters"))
        })?;
        Ok(self.config.base_path.join(name))
    }

    /// Get the handle for `record_type`, opening or creating its index on
    /// first use.
    pub fn get_or_create(&self, record_type: &RecordType) -> Result<Arc<IndexHandle>> {
        let mut handles = self.lock()?;
        if let Some(handle) = handles.get(record_type.name()) {
            return Ok(Arc::clone(handle));
        }

        let schema = IndexSchema::derive(record_type, self.config.non_textual_policy)?;
        let handle = match self.storage {
            Storage::Disk => {
                let dir = self.index_dir(record_type.name())?;
                IndexHandle::open_or_create(&dir, schema, &self.config)?
            }
            Storage::Memory => IndexHandle::in_memory(schema, &self.config)?,
        };

        let handle = Arc::new(handle);
        handles.insert(record_type.name().to_string(), Arc::clone(&handle));
        Ok(handle)
    }

    /// Get an already opened handle.
    pub fn get(&self, record_type: &str) -> Option<Arc<IndexHandle>> {
        self.lock().ok()?.get(record_type).cloned()
    }

    /// Searcher over `record_type`'s index.
    pub fn searcher(&self, record_type: &RecordType) -> Result<Searcher> {
        Ok(Searcher::new(
            self.get_or_create(record_type)?,
            self.config.default_mode,
        ))
    }

    /// Indexer writing to `record_type`'s index.
    pub fn indexer(&self, record_type: &RecordType) -> Result<Indexer> {
        Ok(Indexer::new(self.get_or_create(record_type)?))
    }

    /// All opened handles, sorted by record type name.
    pub fn handles(&self) -> Vec<Arc<IndexHandle>> {
        let mut handles: Vec<_> = match self.lock() {
            Ok(map) => map.values().cloned().collect(),
            Err(_) => Vec::new(),
        };
        handles.sort_by(|a, b| a.record_type().cmp(b.record_type()));
        handles
    }

    /// Live document count for an opened type.
    pub fn document_count(&self, record_type: &str) -> Option<u64> {
        self.get(record_type).map(|h| h.document_count())
    }

    /// Metadata of every index found under the base path.
    ///
    /// Directories without index metadata are ignored.
    pub fn discover(&self) -> Result<Vec<IndexMetadata>> {
        if self.storage == Storage::Memory {
            return Ok(Vec::new());
        }
        let base = &self.config.base_path;
        if !base.exists() {
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        let entries = std::fs::read_dir(base).map_err(|e| Error::io_with_path(e, base))?;
        for entry in entries {
            let path = entry.map_err(|e| Error::io_with_path(e, base))?.path();
            if !path.is_dir() {
                continue;
            }
            if let Some(metadata) = IndexMetadata::load(&path)? {
                found.push(metadata);
            }
        }
        found.sort_by(|a, b| a.record_type.cmp(&b.record_type));
        Ok(found)
    }

    /// Open an existing on-disk index using only its stored metadata.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no index exists for `record_type`.
    pub fn open_existing(&self, record_type: &str) -> Result<Arc<IndexHandle>> {
        if let Some(handle) = self.get(record_type) {
            return Ok(handle);
        }
        let dir = self.index_dir(record_type)?;
        let metadata = IndexMetadata::load(&dir)?.ok_or_else(|| {
            Error::config(format!("no index for '{record_type}' under {}", dir.display()))
        })?;
        self.get_or_create(&metadata.record_type_definition())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Arc<IndexHandle>>>> {
        self.handles
            .lock()
            .map_err(|_| Error::index("index registry lock is poisoned"))
    }
}

// ============================================================================
// Tests
// ============================================================================
