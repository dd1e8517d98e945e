//! Handlers for the `search` and `stats` commands.
//!
//! Both work from the on-disk indexes alone: the record type of each index
//! is rebuilt from its stored metadata, so no application code is needed.

use std::io::Write;

use serde::Serialize;
use sift_core::Result;
use sift_fts::{IndexRegistry, QueryMode, SearchParams, Searcher, SyncConfig};

use crate::cli::SearchArgs;

/// Run a direct search and print the hits.
pub fn cmd_search(config: &SyncConfig, args: &SearchArgs, out: &mut impl Write) -> Result<()> {
    let registry = IndexRegistry::on_disk(config.clone());
    let handle = registry.open_existing(&args.record_type)?;
    let searcher = Searcher::new(handle, config.default_mode);

    let mut params = SearchParams::new(&args.query);
    params.limit = args.limit;
    if !args.fields.is_empty() {
        params = params.with_fields(args.fields.iter().cloned());
    }
    if args.or {
        params = params.with_mode(QueryMode::Or);
    }

    let hits = searcher.search(&params)?;

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &hits)?;
        writeln!(out)?;
        return Ok(());
    }

    if hits.is_empty() {
        writeln!(out, "No matches for {:?} in {}", args.query, args.record_type)?;
        return Ok(());
    }
    for (rank, hit) in hits.iter().enumerate() {
        writeln!(
            out,
            "{:>3}. {}={}  ({:.4})",
            rank + 1,
            searcher.primary_key(),
            hit.primary_key,
            hit.score
        )?;
    }
    Ok(())
}

/// One line of `sift stats` output.
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub record_type: String,
    pub documents: u64,
    pub primary_key: String,
    pub text_fields: Vec<String>,
    pub created_at: String,
}

/// Collect statistics for every index under the base path.
pub fn collect_stats(config: &SyncConfig) -> Result<Vec<IndexStats>> {
    let registry = IndexRegistry::on_disk(config.clone());
    let mut stats = Vec::new();
    for metadata in registry.discover()? {
        let handle = registry.open_existing(&metadata.record_type)?;
        stats.push(IndexStats {
            documents: handle.document_count(),
            record_type: metadata.record_type,
            primary_key: metadata.primary_key,
            text_fields: metadata.text_fields,
            created_at: metadata.created_at,
        });
    }
    Ok(stats)
}

/// Print statistics for every index.
pub fn cmd_stats(config: &SyncConfig, json: bool, out: &mut impl Write) -> Result<()> {
    let stats = collect_stats(config)?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &stats)?;
        writeln!(out)?;
        return Ok(());
    }

    if stats.is_empty() {
        writeln!(out, "No indexes under {}", config.base_path.display())?;
        return Ok(());
    }
    for entry in &stats {
        writeln!(
            out,
            "{:<24} {:>8} docs  key={}  fields=[{}]  created {}",
            entry.record_type,
            entry.documents,
            entry.primary_key,
            entry.text_fields.join(", "),
            entry.created_at
        )?;
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
