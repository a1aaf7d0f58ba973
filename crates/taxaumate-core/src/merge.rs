//! Multi-source candidate merge.
//!
//! Each vector index returns its own ranked list. The lists are concatenated,
//! re-sorted by score, and deduplicated by id, keeping the first (highest
//! scored) occurrence, until `k` unique candidates are collected.
//!
//! Scores are compared as-is. Independent indexes do not guarantee a common
//! scale, so the cross-source ordering is a heuristic rather than a ranking
//! guarantee; no normalisation is applied here.

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::debug;

use crate::types::MatchCandidate;

/// Candidates kept per turn across all sources.
pub const DEFAULT_TOP_K: usize = 8;

/// Merge ranked candidate lists into at most `k` unique candidates ordered by
/// descending score.
///
/// Ties keep concatenation order (the sort is stable). NaN scores sort last.
/// Source tags are carried through untouched for hydration routing.
pub fn merge_candidates<I>(lists: I, k: usize) -> Vec<MatchCandidate>
where
    I: IntoIterator<Item = Vec<MatchCandidate>>,
{
    let mut all: Vec<MatchCandidate> = lists.into_iter().flatten().collect();
    let total = all.len();
    all.sort_by(by_score_desc);

    let mut seen: HashSet<String> = HashSet::with_capacity(k.min(total));
    let mut merged = Vec::with_capacity(k.min(total));
    for candidate in all {
        if merged.len() >= k {
            break;
        }
        if seen.insert(candidate.id.clone()) {
            merged.push(candidate);
        }
    }

    debug!(total, kept = merged.len(), k, "merged candidate lists");
    merged
}

fn by_score_desc(a: &MatchCandidate, b: &MatchCandidate) -> Ordering {
    match (a.score.is_nan(), b.score.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal),
    }
}
