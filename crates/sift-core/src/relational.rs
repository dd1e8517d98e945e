//! The seam between the search layer and a relational store's queries.
//!
//! Sift never talks SQL. It only needs a composable query value that can be
//! narrowed to a set of primary keys (or to nothing at all) and then
//! executed. Any store that can express those two predicates can back a
//! `QueryProxy`.

use std::collections::HashSet;

use crate::error::Result;
use crate::record::Record;

/// A composable relational query over one record type.
///
/// Filter methods consume the query and return a narrowed copy, so prior
/// predicates are always kept.
pub trait RelationalQuery: Clone + Send + Sync {
    /// Row type produced when the query is executed.
    type Row: Record;

    /// Restrict the query to rows whose stringified primary key is in `keys`.
    ///
    /// The store makes no ordering promise for this predicate.
    fn filter_primary_keys(self, keys: &HashSet<String>) -> Self;

    /// Restrict the query with an always-false predicate.
    fn filter_none(self) -> Self;

    /// Execute the query, returning rows in the store's native order.
    fn fetch(&self) -> Result<Vec<Self::Row>>;
}
