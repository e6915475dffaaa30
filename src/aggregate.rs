//! Runs every configured root and merges the results into one set.
//!
//! This is the only place duplicates are removed. Identity is the display
//! string, so the same directory reached through two different templates
//! shows up once per template.

use crate::config::RootSpec;
use crate::search::{ResultPath, RootSearcher};
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use tracing::debug;

/// Search each root in order and collect the distinct display paths.
pub fn aggregate(specs: &[RootSpec], searcher: &RootSearcher<'_>) -> Result<BTreeSet<ResultPath>> {
    let mut found = BTreeSet::new();

    for spec in specs {
        let before = found.len();
        let hits = searcher
            .search(spec)
            .with_context(|| format!("Failed to search project root: {}", spec.path_template))?;
        found.extend(hits);
        debug!(
            root = %spec.path_template,
            added = found.len() - before,
            "Searched project root"
        );
    }

    Ok(found)
}
