//! Relevance ranks and the ranking merge.
//!
//! A [`RankMap`] remembers where each primary key appeared in a search
//! result. [`reorder`] applies it to rows fetched from the relational store
//! in whatever order the store chose, producing rows in ascending rank. Rows
//! with equal rank keep their fetch order.

use std::collections::{HashMap, HashSet};

use sift_core::{Error, Result};
use sift_fts::SearchHit;

/// Primary key → position in a score-ordered hit list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankMap {
    ranks: HashMap<String, usize>,
}

impl RankMap {
    /// Build ranks from hits in descending score order; rank 0 is the best.
    ///
    /// A key seen twice keeps its first (better) rank.
    pub fn from_hits(hits: &[SearchHit]) -> Self {
        let mut ranks = HashMap::with_capacity(hits.len());
        for (rank, hit) in hits.iter().enumerate() {
            ranks.entry(hit.primary_key.clone()).or_insert(rank);
        }
        Self { ranks }
    }

    /// Rank of `primary_key`, if it was a hit.
    pub fn rank(&self, primary_key: &str) -> Option<usize> {
        self.ranks.get(primary_key).copied()
    }

    /// Every ranked primary key.
    pub fn keys(&self) -> HashSet<String> {
        self.ranks.keys().cloned().collect()
    }

    /// Number of ranked keys.
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Whether nothing is ranked.
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

/// Sort `rows` by rank, keeping fetch order among equal ranks.
///
/// # Errors
///
/// Returns [`Error::RankingConsistency`] for the first row whose key is
/// missing or unranked; the index and the store disagree about that row.
pub fn reorder<R, F>(rows: Vec<R>, ranks: &RankMap, record_type: &str, key_of: F) -> Result<Vec<R>>
where
    F: Fn(&R) -> Option<String>,
{
    let mut ranked = Vec::with_capacity(rows.len());
    for row in rows {
        let key = key_of(&row).unwrap_or_default();
        let rank = ranks
            .rank(&key)
            .ok_or_else(|| Error::ranking(record_type, &key))?;
        ranked.push((rank, row));
    }

    // `sort_by_key` is stable, so ties stay in fetch order.
    ranked.sort_by_key(|(rank, _)| *rank);
    Ok(ranked.into_iter().map(|(_, row)| row).collect())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hit(key: &str, score: f32) -> SearchHit {
        SearchHit {
            primary_key: key.to_string(),
            score,
        }
    }

    fn identity(row: &&str) -> Option<String> {
        Some((*row).to_string())
    }

    #[test]
    fn test_ranks_follow_hit_order() {
        let ranks = RankMap::from_hits(&[hit("3", 2.0), hit("1", 1.5), hit("2", 0.1)]);
        assert_eq!(ranks.rank("3"), Some(0));
        assert_eq!(ranks.rank("1"), Some(1));
        assert_eq!(ranks.rank("2"), Some(2));
        assert_eq!(ranks.rank("9"), None);
        assert_eq!(ranks.len(), 3);
    }

    #[test]
    fn test_duplicate_key_keeps_first_rank() {
        let ranks = RankMap::from_hits(&[hit("1", 2.0), hit("1", 1.0), hit("2", 0.5)]);
        assert_eq!(ranks.rank("1"), Some(0));
        assert_eq!(ranks.keys(), HashSet::from(["1".to_string(), "2".to_string()]));
    }

    #[test]
    fn test_reorder_overrides_fetch_order() {
        let ranks = RankMap::from_hits(&[hit("c", 3.0), hit("a", 2.0), hit("b", 1.0)]);
        let rows = reorder(vec!["a", "b", "c"], &ranks, "Doc", identity).unwrap();
        assert_eq!(rows, ["c", "a", "b"]);
    }

    #[test]
    fn test_reorder_unranked_row_fails() {
        let ranks = RankMap::from_hits(&[hit("a", 1.0)]);
        let err = reorder(vec!["a", "z"], &ranks, "Doc", identity).unwrap_err();
        assert!(matches!(
            err,
            Error::RankingConsistency { ref primary_key, .. } if primary_key == "z"
        ));
    }

    #[test]
    fn test_reorder_missing_key_fails() {
        let ranks = RankMap::from_hits(&[hit("a", 1.0)]);
        let err = reorder(vec!["a"], &ranks, "Doc", |_| None).unwrap_err();
        assert!(err.is_consistency_fault());
    }

    #[test]
    fn test_reorder_empty() {
        let rows: Vec<&str> = reorder(Vec::new(), &RankMap::default(), "Doc", identity).unwrap();
        assert!(rows.is_empty());
    }

    proptest! {
        #[test]
        fn prop_reorder_is_rank_sorted_and_stable(
            rows in proptest::collection::vec((0usize..8, any::<u16>()), 0..40)
        ) {
            // Each row is (key, payload); several rows may share a key.
            let mut keys: Vec<usize> = rows.iter().map(|(k, _)| *k).collect();
            keys.sort_unstable();
            keys.dedup();
            let hits: Vec<SearchHit> = keys
                .iter()
                .rev()
                .map(|k| hit(&k.to_string(), 1.0))
                .collect();
            let ranks = RankMap::from_hits(&hits);

            let indexed: Vec<(usize, (usize, u16))> = rows.iter().copied().enumerate().collect();
            let out = reorder(indexed.clone(), &ranks, "Doc", |(_, (k, _))| Some(k.to_string()))
                .unwrap();

            prop_assert_eq!(out.len(), indexed.len());
            for pair in out.windows(2) {
                let (pos_a, (key_a, _)) = pair[0];
                let (pos_b, (key_b, _)) = pair[1];
                let rank_a = ranks.rank(&key_a.to_string()).unwrap();
                let rank_b = ranks.rank(&key_b.to_string()).unwrap();
                prop_assert!(rank_a <= rank_b);
                if rank_a == rank_b {
                    prop_assert!(pos_a < pos_b);
                }
            }
        }
    }
}
