//! # Frecency Ranking
//!
//! Orders the aggregated paths for display:
//!
//! 1. Paths with recorded usage, highest rank first.
//! 2. Everything else, alphabetically.
//!
//! Ties at equal rank are broken on the display string. An unvisited path
//! scores exactly zero, so a history entry whose rank is zero sorts among the
//! unvisited paths.

use crate::search::ResultPath;
use crate::template::TemplateResolver;
use crate::usage::UsageIndex;
use std::cmp::Ordering;

/// Sort paths by frecency, falling back to lexical order.
pub fn rank<I>(paths: I, usage: &UsageIndex, resolver: &TemplateResolver) -> Vec<ResultPath>
where
    I: IntoIterator<Item = ResultPath>,
{
    let mut scored: Vec<(f64, ResultPath)> = paths
        .into_iter()
        .map(|path| {
            let resolved = resolver.resolve_str(path.as_str());
            let score = usage.get(&resolved).map_or(0.0, |record| record.rank);
            (score, path)
        })
        .collect();

    scored.sort_by(|(a_score, a_path), (b_score, b_path)| {
        compare(*a_score, a_path.as_str(), *b_score, b_path.as_str())
    });

    scored.into_iter().map(|(_, path)| path).collect()
}

/// Rank descending, then display string ascending.
fn compare(a_score: f64, a_path: &str, b_score: f64, b_path: &str) -> Ordering {
    // Scores are finite and non-negative; partial_cmp also equates -0.0 and 0.0
    b_score
        .partial_cmp(&a_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a_path.cmp(b_path))
}
