//! Common fixtures for sift-sync integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::sync::{Arc, LazyLock};

use sift_core::{ColumnType, FieldValue, Record, RecordType};
use sift_fts::{IndexRegistry, SearchParams, SyncConfig};
use sift_fts::types::MIN_WRITER_MEMORY;
use sift_sync::{MemoryDatabase, MemoryTable, SearchSync};
use tempfile::TempDir;

/// `Article { id, title, body, views }`, searchable on title and body.
pub static ARTICLE: LazyLock<RecordType> = LazyLock::new(|| {
    RecordType::builder("Article")
        .primary_key("id", ColumnType::Integer)
        .column("title", ColumnType::String)
        .column("body", ColumnType::Text)
        .column("views", ColumnType::Integer)
        .searchable(["title", "body"])
        .build()
});

/// An article row. A `None` body models a row loaded without that column.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub body: Option<String>,
    pub views: i64,
}

impl Article {
    pub fn new(id: i64, title: &str, body: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            body: Some(body.to_string()),
            views: 0,
        }
    }

    /// A row missing its body attribute.
    pub fn partial(id: i64, title: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            body: None,
            views: 0,
        }
    }
}

impl Record for Article {
    fn record_type(&self) -> &RecordType {
        &ARTICLE
    }

    fn attribute(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.into()),
            "title" => Some(self.title.as_str().into()),
            "body" => self.body.as_deref().map(Into::into),
            "views" => Some(self.views.into()),
            _ => None,
        }
    }
}

/// Test configuration with the smallest writer budget.
pub fn test_config(base: &std::path::Path) -> SyncConfig {
    SyncConfig {
        writer_memory_bytes: MIN_WRITER_MEMORY,
        ..SyncConfig::with_base_path(base)
    }
}

/// A store with an `Article` table whose commits feed a `SearchSync`.
pub struct TestHarness {
    pub dir: TempDir,
    pub db: Arc<MemoryDatabase>,
    pub articles: MemoryTable<Article>,
    pub sync: SearchSync,
}

impl TestHarness {
    /// Harness with indexes on disk under a temporary directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(IndexRegistry::on_disk(test_config(dir.path())));
        Self::with_registry(dir, registry)
    }

    /// Harness with in-memory indexes.
    pub fn in_memory() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(IndexRegistry::in_memory(test_config(dir.path())));
        Self::with_registry(dir, registry)
    }

    fn with_registry(dir: TempDir, registry: Arc<IndexRegistry>) -> Self {
        let sync = SearchSync::new(registry);
        let db = MemoryDatabase::new();
        db.subscribe(Arc::new(sync.clone())).unwrap();
        let articles = db.table::<Article>();
        Self {
            dir,
            db,
            articles,
            sync,
        }
    }

    /// Insert and commit rows.
    pub fn seed(&self, rows: &[(i64, &str, &str)]) {
        for &(id, title, body) in rows {
            self.articles.insert(Article::new(id, title, body)).unwrap();
        }
        self.db.commit().unwrap();
    }

    /// Primary keys of a direct search, in hit order.
    pub fn hit_keys(&self, params: &SearchParams) -> Vec<String> {
        self.sync
            .pure_search(&ARTICLE, params)
            .unwrap()
            .into_iter()
            .map(|h| h.primary_key)
            .collect()
    }

    /// Primary keys of a direct search, sorted.
    pub fn hit_set(&self, params: &SearchParams) -> Vec<String> {
        let mut keys = self.hit_keys(params);
        keys.sort();
        keys
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// The two-article fixture: a red fox that jumps and a fox that runs.
pub fn fox_rows() -> Vec<(i64, &'static str, &'static str)> {
    vec![(1, "red fox", "jumps"), (2, "blue sky", "fox runs")]
}
