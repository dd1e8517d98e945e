//! Stemming analyzer for analyzed-text fields.
//!
//! Every analyzed-text field in a Sift index uses the `sift_stem` analyzer:
//!
//! - SimpleTokenizer → LowerCaser → StopWordFilter → Stemmer(English)
//!
//! The base stopword list is a short set of English function words, or the
//! `stop-words` crate's much larger English list when
//! [`StopwordList::Extended`] is configured. Custom stopwords are added and
//! allowlisted words removed on top of either list. The same
//! analyzer runs at index time and at query time, so "runs" matches "run"
//! and a query consisting only of stopwords matches nothing.
//!
//! The analyzer must be registered on every index after create/open; the
//! index only stores the analyzer's name.

use std::collections::HashSet;

use tantivy::Index;
use tantivy::tokenizer::{Language, LowerCaser, SimpleTokenizer, Stemmer, StopWordFilter, TextAnalyzer};

use crate::types::{StopwordList, SyncConfig};

/// Name under which the analyzer is registered with each index.
pub const ANALYZER_NAME: &str = "sift_stem";

/// English function words filtered under [`StopwordList::Standard`].
pub const STANDARD_STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "can", "for", "from", "have", "if", "in",
    "is", "it", "may", "not", "of", "on", "or", "tbd", "that", "the", "this", "to", "us", "we",
    "when", "will", "with", "yet", "you", "your",
];

/// The stopword set used by the analyzer.
pub struct Stopwords {
    words: HashSet<String>,
    enabled: bool,
}

impl Stopwords {
    /// Build the stopword set from configuration.
    pub fn new(config: &SyncConfig) -> Self {
        let base: &[&str] = match config.stopword_list {
            StopwordList::Standard => STANDARD_STOPWORDS,
            StopwordList::Extended => stop_words::get(stop_words::Language::English),
        };
        let mut words: HashSet<String> = base.iter().map(|s| s.to_lowercase()).collect();

        for word in &config.custom_stopwords {
            words.insert(word.to_lowercase());
        }

        // Tokens are lowercased before the stop filter, so the allowlist is too.
        for word in &config.allowlist {
            words.remove(&word.to_lowercase());
        }

        Self {
            words,
            enabled: config.stopwords_enabled,
        }
    }

    /// A set that filters nothing.
    pub fn disabled() -> Self {
        Self {
            words: HashSet::new(),
            enabled: false,
        }
    }

    /// Check if a word is filtered.
    pub fn is_stopword(&self, word: &str) -> bool {
        self.enabled && self.words.contains(&word.to_lowercase())
    }

    /// Number of words filtered when enabled.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the set holds no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Check if filtering is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn into_filter(self) -> StopWordFilter {
        if self.enabled {
            StopWordFilter::remove(self.words)
        } else {
            StopWordFilter::remove(Vec::<String>::new())
        }
    }
}

impl std::fmt::Debug for Stopwords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stopwords")
            .field("enabled", &self.enabled)
            .field("stopword_count", &self.words.len())
            .finish()
    }
}

/// Build the stemming analyzer for the given configuration.
pub fn build_analyzer(config: &SyncConfig) -> TextAnalyzer {
    TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(LowerCaser)
        .filter(Stopwords::new(config).into_filter())
        .filter(Stemmer::new(Language::English))
        .build()
}

/// Register the analyzer with an index.
///
/// Must be called after creating/opening an index, before writing or
/// parsing queries.
pub fn register_analyzer(index: &Index, config: &SyncConfig) {
    index
        .tokenizers()
        .register(ANALYZER_NAME, build_analyzer(config));
}

// ============================================================================
// Tests
// ============================================================================
