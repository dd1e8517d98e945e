//! Configuration and request/response types shared by the index components.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sift_core::{Error, Result};

/// Smallest writer memory budget Tantivy accepts for one indexing thread.
pub const MIN_WRITER_MEMORY: usize = 15_000_000;

/// Environment variable overriding [`SyncConfig::base_path`].
pub const ENV_BASE_PATH: &str = "SIFT_BASE_PATH";

/// Environment variable overriding [`SyncConfig::writer_memory_bytes`].
pub const ENV_WRITER_MEMORY: &str = "SIFT_WRITER_MEMORY";

/// How query terms are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// All terms must match (AND).
    #[default]
    And,
    /// Any term can match (OR).
    Or,
}

/// What to do with searchable columns whose type is not textual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonTextualPolicy {
    /// Leave the column out of the index schema and log a warning.
    #[default]
    Skip,
    /// Fail schema derivation.
    Reject,
}

/// Base stopword list used by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopwordList {
    /// A short list of English function words ("the", "and", "of", ...).
    #[default]
    Standard,
    /// The `stop-words` crate's English list. Much larger; it also drops
    /// common content words such as "new", "value" and "information".
    Extended,
}

/// Index synchronization configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Directory holding one index directory per record type.
    #[serde(default = "default_base_path")]
    pub base_path: PathBuf,

    /// Memory budget for each index writer, in bytes.
    #[serde(default = "default_writer_memory")]
    pub writer_memory_bytes: usize,

    /// Handling of non-textual searchable columns.
    #[serde(default)]
    pub non_textual_policy: NonTextualPolicy,

    /// Term grouping used when a search does not specify one.
    #[serde(default)]
    pub default_mode: QueryMode,

    /// Enable stopword removal in the analyzer.
    #[serde(default = "default_true")]
    pub stopwords_enabled: bool,

    /// Base stopword list.
    #[serde(default)]
    pub stopword_list: StopwordList,

    /// Additional stopwords.
    #[serde(default)]
    pub custom_stopwords: Vec<String>,

    /// Words never treated as stopwords.
    #[serde(default)]
    pub allowlist: Vec<String>,
}

fn default_base_path() -> PathBuf {
    PathBuf::from("search_index")
}

fn default_writer_memory() -> usize {
    50_000_000
}

fn default_true() -> bool {
    true
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            writer_memory_bytes: default_writer_memory(),
            non_textual_policy: NonTextualPolicy::default(),
            default_mode: QueryMode::default(),
            stopwords_enabled: default_true(),
            stopword_list: StopwordList::default(),
            custom_stopwords: Vec::new(),
            allowlist: Vec::new(),
        }
    }
}

impl SyncConfig {
    /// Configuration rooted at `base_path`, everything else default.
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            ..Default::default()
        }
    }

    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::config(format!("Invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Serialize to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Apply `SIFT_BASE_PATH` and `SIFT_WRITER_MEMORY` from the environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_BASE_PATH) {
            self.base_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup(ENV_WRITER_MEMORY) {
            self.writer_memory_bytes = raw.trim().parse().map_err(|e| {
                Error::config(format!("{ENV_WRITER_MEMORY} must be a byte count: {e}"))
            })?;
        }
        self.validate()
    }

    /// Check invariants the index engine relies on.
    pub fn validate(&self) -> Result<()> {
        if self.writer_memory_bytes < MIN_WRITER_MEMORY {
            return Err(Error::config(format!(
                "writer_memory_bytes must be at least {MIN_WRITER_MEMORY}, got {}",
                self.writer_memory_bytes
            )));
        }
        if self.base_path.as_os_str().is_empty() {
            return Err(Error::config("base_path must not be empty"));
        }
        Ok(())
    }
}

/// Parameters for a text search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Search query string.
    pub query: String,

    /// Maximum hits to return; `None` returns every match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,

    /// Restrict matching to these fields; `None` means all text fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,

    /// Term grouping; `None` uses the configured default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<QueryMode>,
}

impl SearchParams {
    /// Search for `query` with default options.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Cap the number of hits.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Only match against the named fields.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Set the term grouping.
    pub fn with_mode(mut self, mode: QueryMode) -> Self {
        self.mode = Some(mode);
        self
    }
}

/// One ranked search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Stringified primary key of the matching record.
    pub primary_key: String,

    /// Relevance score, higher is better.
    pub score: f32,
}

// ============================================================================
// Tests
// ============================================================================
