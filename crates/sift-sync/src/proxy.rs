//! Relational queries re-ordered by text relevance.
//!
//! A `QueryProxy` wraps any [`RelationalQuery`] for one record type. Without
//! a search it behaves exactly like the wrapped query. After
//! [`QueryProxy::search`], the wrapped query is narrowed to the matching
//! primary keys and results come back in descending relevance instead of the
//! store's native order:
//!
//! ```rust,ignore
//! let proxy = sync.query(&ARTICLE, articles.query())?
//!     .search(&SearchParams::new("red fox"))?
//!     .refine(|q| q.filter(|a| a.published));
//!
//! for article in proxy.fetch()? {
//!     println!("{}", article.title);
//! }
//! ```

use sift_core::{Record, RelationalQuery, Result};
use sift_fts::{SearchParams, Searcher};

use crate::rank::{RankMap, reorder};

/// A relational query that may carry relevance ranks.
#[derive(Debug, Clone)]
pub struct QueryProxy<Q> {
    query: Q,
    searcher: Searcher,
    ranks: Option<RankMap>,
}

impl<Q: RelationalQuery> QueryProxy<Q> {
    /// Wrap `query`, keeping every predicate it already has.
    pub fn new(query: Q, searcher: Searcher) -> Self {
        Self {
            query,
            searcher,
            ranks: None,
        }
    }

    /// Restrict to rows matching `params` and order them by relevance.
    ///
    /// With no hits the wrapped query is narrowed to nothing and carries no
    /// ranks.
    pub fn search(&self, params: &SearchParams) -> Result<Self> {
        let hits = self.searcher.search(params)?;

        if hits.is_empty() {
            return Ok(Self {
                query: self.query.clone().filter_none(),
                searcher: self.searcher.clone(),
                ranks: None,
            });
        }

        let ranks = RankMap::from_hits(&hits);
        Ok(Self {
            query: self.query.clone().filter_primary_keys(&ranks.keys()),
            searcher: self.searcher.clone(),
            ranks: Some(ranks),
        })
    }

    /// Narrow the wrapped query further; ranks are kept.
    pub fn refine<F>(self, f: F) -> Self
    where
        F: FnOnce(Q) -> Q,
    {
        Self {
            query: f(self.query),
            ..self
        }
    }

    /// Ranks from the last search, if any matched.
    pub fn rank_map(&self) -> Option<&RankMap> {
        self.ranks.as_ref()
    }

    /// The wrapped query.
    pub fn query(&self) -> &Q {
        &self.query
    }

    /// Unwrap the relational query, dropping ranks.
    pub fn into_inner(self) -> Q {
        self.query
    }

    /// Execute the query.
    ///
    /// Without ranks rows come back in native order; with ranks, in ascending
    /// rank with ties in fetch order.
    ///
    /// # Errors
    ///
    /// Returns [`sift_core::Error::RankingConsistency`] if the store returns a
    /// row the search did not rank.
    pub fn fetch(&self) -> Result<Vec<Q::Row>> {
        let rows = self.query.fetch()?;
        match &self.ranks {
            None => Ok(rows),
            Some(ranks) => reorder(rows, ranks, self.searcher.record_type(), |row| {
                row.primary_key_string()
            }),
        }
    }

    /// Iterate over [`fetch`](Self::fetch)'s rows.
    pub fn iter(&self) -> Result<std::vec::IntoIter<Q::Row>> {
        Ok(self.fetch()?.into_iter())
    }
}
