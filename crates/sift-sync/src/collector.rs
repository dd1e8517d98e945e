//! Grouping of committed changes by record type.

use std::collections::HashMap;

use sift_core::{Change, IndexChange, RecordType};

/// The index changes for one record type, in commit order.
#[derive(Debug, Clone)]
pub struct TypeBatch {
    /// The record type every change belongs to.
    pub record_type: RecordType,
    /// Upserts and deletes in the order they were committed.
    pub changes: Vec<IndexChange>,
}

/// Group one commit's changes by record type.
///
/// Types without searchable attributes are dropped. Changes keep their
/// commit order within a type, and types appear in the order they were
/// first seen.
pub fn collect(changes: &[Change]) -> Vec<TypeBatch> {
    let mut batches: Vec<TypeBatch> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for change in changes {
        let record_type = change.record.record_type();
        if !record_type.is_searchable() {
            continue;
        }

        let position = *positions
            .entry(record_type.name().to_string())
            .or_insert_with(|| {
                batches.push(TypeBatch {
                    record_type: record_type.clone(),
                    changes: Vec::new(),
                });
                batches.len() - 1
            });
        batches[position].changes.push(IndexChange::from(change));
    }

    batches
}

// ============================================================================
// Tests
// ============================================================================
