//! Direct searches against one record type's index.
//!
//! `Searcher` parses query text over the type's analyzed-text fields and
//! returns the identifiers of matching documents in descending score order.
//! It never touches the relational store; the query proxy in `sift-sync`
//! builds on it to re-order relational rows.

use std::sync::Arc;

use sift_core::{Error, Result};
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::{Field, Value};
use tantivy::TantivyDocument;

use crate::handle::IndexHandle;
use crate::types::{QueryMode, SearchHit, SearchParams};

/// Executes text queries against one index.
#[derive(Debug, Clone)]
pub struct Searcher {
    handle: Arc<IndexHandle>,
    default_mode: QueryMode,
}

impl Searcher {
    /// Create a searcher over `handle`.
    pub fn new(handle: Arc<IndexHandle>, default_mode: QueryMode) -> Self {
        Self {
            handle,
            default_mode,
        }
    }

    /// Record type name.
    pub fn record_type(&self) -> &str {
        self.handle.record_type()
    }

    /// Primary-key attribute name; hits carry its stringified value.
    pub fn primary_key(&self) -> &str {
        self.handle.schema().primary_key()
    }

    /// Run a query and return hits ordered by descending score.
    ///
    /// Empty query text, unparseable query text, a zero limit and an empty
    /// index all produce an empty result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSearchField`] if `params.fields` names
    /// something other than an analyzed-text field, or [`Error::Index`] if
    /// the engine fails while searching.
    pub fn search(&self, params: &SearchParams) -> Result<Vec<SearchHit>> {
        let fields = self.resolve_fields(params.fields.as_deref())?;

        let text = params.query.trim();
        if text.is_empty() || fields.is_empty() {
            return Ok(Vec::new());
        }

        let searcher = self.handle.reader().searcher();
        let limit = match params.limit {
            Some(limit) => limit,
            None => usize::try_from(searcher.num_docs()).unwrap_or(usize::MAX),
        };
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut parser = QueryParser::for_index(self.handle.index(), fields);
        if params.mode.unwrap_or(self.default_mode) == QueryMode::And {
            parser.set_conjunction_by_default();
        }

        let query = match parser.parse_query(text) {
            Ok(query) => query,
            Err(e) => {
                log::debug!("Unparseable query {text:?} for {}: {e}", self.record_type());
                return Ok(Vec::new());
            }
        };

        let top_docs = searcher
            .search(query.as_ref(), &TopDocs::with_limit(limit).order_by_score())
            .map_err(|e| Error::index(format!("Search failed: {e}")))?;

        let id_field = self.handle.schema().id_field();
        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher
                .doc(address)
                .map_err(|e| Error::index(format!("Failed to load document: {e}")))?;
            if let Some(key) = doc.get_first(id_field).and_then(|v| v.as_str()) {
                hits.push(SearchHit {
                    primary_key: key.to_string(),
                    score,
                });
            }
        }

        log::debug!(
            "Query {text:?} on {} returned {} hits",
            self.record_type(),
            hits.len()
        );
        Ok(hits)
    }

    /// Map requested field names to analyzed-text fields; `None` selects
    /// all of them.
    fn resolve_fields(&self, requested: Option<&[String]>) -> Result<Vec<Field>> {
        let schema = self.handle.schema();
        match requested {
            None => Ok(schema.text_fields().iter().map(|f| f.field).collect()),
            Some(names) => names
                .iter()
                .map(|name| {
                    schema.text_field(name).ok_or_else(|| Error::UnknownSearchField {
                        record_type: schema.record_type().to_string(),
                        field: name.clone(),
                    })
                })
                .collect(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
