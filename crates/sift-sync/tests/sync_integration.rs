//! End-to-end tests: store commits flow into the index, and relational
//! queries come back in relevance order.

#![allow(clippy::unwrap_used)]

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::{ARTICLE, Article, TestHarness, fox_rows, test_config};
use proptest::prelude::*;
use sift_core::{Error, Record, RelationalQuery, Result};
use sift_fts::{IndexRegistry, QueryMode, SearchParams};
use sift_sync::{MemoryQuery, SearchSync};

fn keys(rows: &[Article]) -> Vec<String> {
    rows.iter().map(|a| a.id.to_string()).collect()
}

// ============================================================================
// Synchronisation
// ============================================================================

#[test]
fn test_fox_scenario() {
    let h = TestHarness::new();
    h.seed(&fox_rows());

    assert_eq!(h.hit_set(&SearchParams::new("fox")), ["1", "2"]);
    assert_eq!(
        h.hit_set(&SearchParams::new("fox").with_mode(QueryMode::Or)),
        ["1", "2"]
    );
    assert_eq!(h.hit_set(&SearchParams::new("red fox")), ["1"]);

    h.articles.update(Article::new(1, "green fox", "jumps")).unwrap();
    h.db.commit().unwrap();
    assert!(h.hit_set(&SearchParams::new("red")).is_empty());
    assert_eq!(h.hit_set(&SearchParams::new("green")), ["1"]);

    h.articles.delete("2").unwrap();
    h.db.commit().unwrap();
    assert_eq!(h.hit_set(&SearchParams::new("fox")), ["1"]);
}

#[test]
fn test_updates_replace_documents() {
    let h = TestHarness::in_memory();
    h.seed(&[(1, "red fox", "jumps")]);

    for title in ["green fox", "grey fox", "brown fox"] {
        h.articles.update(Article::new(1, title, "jumps")).unwrap();
        h.db.commit().unwrap();
    }

    assert_eq!(h.sync.registry().document_count("Article"), Some(1));
    assert_eq!(h.hit_set(&SearchParams::new("brown")), ["1"]);
    assert!(h.hit_set(&SearchParams::new("grey")).is_empty());
}

#[test]
fn test_uncommitted_changes_not_indexed() {
    let h = TestHarness::in_memory();
    h.seed(&fox_rows());

    h.articles.delete("1").unwrap();
    assert_eq!(h.hit_set(&SearchParams::new("fox")), ["1", "2"]);

    h.db.rollback().unwrap();
    h.db.commit().unwrap();
    assert_eq!(h.hit_set(&SearchParams::new("fox")), ["1", "2"]);
}

#[test]
fn test_missing_attribute_fails_commit() {
    let h = TestHarness::in_memory();
    h.seed(&[(1, "red fox", "jumps")]);

    h.articles.insert(Article::new(2, "blue fox", "runs")).unwrap();
    h.articles.insert(Article::partial(3, "half fox")).unwrap();
    let err = h.db.commit().unwrap_err();

    assert!(matches!(
        err,
        Error::MissingSearchableField { ref field, .. } if field == "body"
    ));
    // The whole batch was rolled back, including the valid insert.
    assert_eq!(h.hit_set(&SearchParams::new("fox")), ["1"]);
}

#[test]
fn test_reindex_from_store() {
    let h = TestHarness::in_memory();
    h.seed(&fox_rows());

    // Rows written behind the listener's back are picked up by a rebuild.
    let fresh = SearchSync::new(Arc::new(IndexRegistry::in_memory(test_config(h.dir.path()))));
    assert!(fresh.pure_search(&ARTICLE, &SearchParams::new("fox")).unwrap().is_empty());

    let rows = h.articles.all().unwrap();
    let stats = fresh
        .reindex(&ARTICLE, rows.iter().map(|a| a as &dyn Record))
        .unwrap();
    assert_eq!(stats.upserted, 2);
    assert_eq!(
        fresh.pure_search(&ARTICLE, &SearchParams::new("fox")).unwrap().len(),
        2
    );
}

#[test]
fn test_index_survives_reopen() {
    let h = TestHarness::new();
    h.seed(&fox_rows());
    let base = h.dir.path().to_path_buf();
    // Release every handle so the index writer lock is freed.
    drop(h.sync);
    drop(h.articles);
    drop(h.db);

    let registry = IndexRegistry::on_disk(test_config(&base));
    let names: Vec<_> = registry
        .discover()
        .unwrap()
        .into_iter()
        .map(|m| m.record_type)
        .collect();
    assert_eq!(names, ["Article"]);

    let searcher = registry.searcher(&ARTICLE).unwrap();
    assert_eq!(searcher.search(&SearchParams::new("fox")).unwrap().len(), 2);
}

#[test]
fn test_second_registry_reads_while_writer_open() {
    let h = TestHarness::new();
    h.seed(&fox_rows());

    let reader = IndexRegistry::on_disk(test_config(h.dir.path()));
    let handle = reader.open_existing("Article").unwrap();
    assert!(!handle.has_writer());

    let searcher = sift_fts::Searcher::new(handle, QueryMode::And);
    assert_eq!(searcher.search(&SearchParams::new("fox")).unwrap().len(), 2);

    // The application keeps writing through its own registry.
    h.articles.insert(Article::new(3, "grey fox", "hunts")).unwrap();
    h.db.commit().unwrap();
    assert_eq!(h.hit_set(&SearchParams::new("fox")), ["1", "2", "3"]);
}

// ============================================================================
// Query proxy
// ============================================================================

#[test]
fn test_proxy_without_search_keeps_native_order() {
    let h = TestHarness::in_memory();
    h.seed(&[(3, "c fox", "x"), (1, "a fox", "x"), (2, "b fox", "x")]);

    let proxy = h.sync.query(&ARTICLE, h.articles.query()).unwrap();
    assert!(proxy.rank_map().is_none());
    assert_eq!(keys(&proxy.fetch().unwrap()), ["3", "1", "2"]);
}

#[test]
fn test_proxy_orders_by_relevance() {
    let h = TestHarness::in_memory();
    h.seed(&[
        (1, "fox", "a quiet evening"),
        (2, "fox fox fox", "fox in the field"),
        (3, "sky", "no animals here"),
        (4, "fox hunt", "fox"),
    ]);

    let params = SearchParams::new("fox");
    let expected = h.hit_keys(&params);

    // Native order is reversed by id so relevance has something to override.
    let query = h.articles.query().order_by(|a, b| b.id.cmp(&a.id));
    let proxy = h.sync.query(&ARTICLE, query).unwrap().search(&params).unwrap();

    let rows = proxy.fetch().unwrap();
    assert_eq!(keys(&rows), expected);
    assert!(!keys(&rows).contains(&"3".to_string()));

    let ranks = proxy.rank_map().unwrap();
    let order: Vec<usize> = rows
        .iter()
        .map(|a| ranks.rank(&a.id.to_string()).unwrap())
        .collect();
    assert!(order.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_proxy_refine_keeps_ranks() {
    let h = TestHarness::in_memory();
    h.seed(&[
        (1, "fox", "one"),
        (2, "fox fox", "two"),
        (3, "fox fox fox", "three"),
    ]);

    let params = SearchParams::new("fox");
    let expected: Vec<String> = h
        .hit_keys(&params)
        .into_iter()
        .filter(|k| k != "2")
        .collect();

    let proxy = h
        .sync
        .query(&ARTICLE, h.articles.query())
        .unwrap()
        .search(&params)
        .unwrap()
        .refine(|q| q.filter(|a| a.id != 2));

    assert!(proxy.rank_map().is_some());
    assert_eq!(keys(&proxy.fetch().unwrap()), expected);
}

#[test]
fn test_proxy_keeps_existing_predicates() {
    let h = TestHarness::in_memory();
    h.seed(&fox_rows());

    let query = h.articles.query().filter(|a| a.title.starts_with("blue"));
    let proxy = h
        .sync
        .query(&ARTICLE, query)
        .unwrap()
        .search(&SearchParams::new("fox"))
        .unwrap();

    assert_eq!(keys(&proxy.fetch().unwrap()), ["2"]);
}

#[test]
fn test_proxy_no_hits() {
    let h = TestHarness::in_memory();
    h.seed(&fox_rows());

    let proxy = h
        .sync
        .query(&ARTICLE, h.articles.query())
        .unwrap()
        .search(&SearchParams::new("zebra"))
        .unwrap();

    assert!(proxy.rank_map().is_none());
    assert!(proxy.fetch().unwrap().is_empty());
    assert_eq!(proxy.iter().unwrap().count(), 0);
}

#[test]
fn test_proxy_limit_narrows_rows() {
    let h = TestHarness::in_memory();
    h.seed(&fox_rows());

    let proxy = h
        .sync
        .query(&ARTICLE, h.articles.query())
        .unwrap()
        .search(&SearchParams::new("fox").with_limit(1))
        .unwrap();

    assert_eq!(proxy.fetch().unwrap().len(), 1);
}

/// A query whose store ignores the primary-key restriction.
#[derive(Clone)]
struct LeakyQuery(MemoryQuery<Article>);

impl RelationalQuery for LeakyQuery {
    type Row = Article;

    fn filter_primary_keys(self, _keys: &HashSet<String>) -> Self {
        self
    }

    fn filter_none(self) -> Self {
        Self(self.0.filter_none())
    }

    fn fetch(&self) -> Result<Vec<Article>> {
        self.0.fetch()
    }
}

#[test]
fn test_unranked_row_is_consistency_fault() {
    let h = TestHarness::in_memory();
    h.seed(&fox_rows());

    let proxy = h
        .sync
        .query(&ARTICLE, LeakyQuery(h.articles.query()))
        .unwrap()
        .search(&SearchParams::new("red"))
        .unwrap();

    let err = proxy.fetch().unwrap_err();
    assert!(matches!(
        err,
        Error::RankingConsistency { ref primary_key, .. } if primary_key == "2"
    ));
}

#[test]
fn test_unknown_field_surfaces() {
    let h = TestHarness::in_memory();
    h.seed(&fox_rows());

    let result = h
        .sync
        .query(&ARTICLE, h.articles.query())
        .unwrap()
        .search(&SearchParams::new("fox").with_fields(["views"]));
    assert!(matches!(result, Err(Error::UnknownSearchField { .. })));
}

// ============================================================================
// Properties
// ============================================================================

const WORDS: [&str; 6] = ["fox", "red", "blue", "sky", "green", "hound"];

fn title_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(proptest::sample::select(WORDS.to_vec()), 1..4)
        .prop_map(|words| words.join(" "))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_and_results_subset_of_or(
        titles in proptest::collection::vec(title_strategy(), 1..6),
        query in proptest::collection::vec(proptest::sample::select(WORDS.to_vec()), 1..3),
    ) {
        let h = TestHarness::in_memory();
        for (i, title) in titles.iter().enumerate() {
            h.articles.insert(Article::new(i as i64, title, "text")).unwrap();
        }
        h.db.commit().unwrap();

        let text = query.join(" ");
        let and: HashSet<String> = h.hit_keys(&SearchParams::new(&text)).into_iter().collect();
        let or: HashSet<String> = h
            .hit_keys(&SearchParams::new(&text).with_mode(QueryMode::Or))
            .into_iter()
            .collect();

        prop_assert!(and.is_subset(&or));
    }
}
