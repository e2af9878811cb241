//! The stored pairing inside each catalog entry: its A-side listing matched
//! against its B-side listing.

use catmatch_core::{CatalogEntry, FusionWeights, MatchCandidate, Vendor};
use rayon::prelude::*;

use crate::rank::{score_pair, Scoring};

/// The entry's own pairing, with the A side as source.
///
/// Cached similarities are used when all three are stored; otherwise the pair
/// is scored from its raw fields. `None` when either side is missing.
#[must_use]
pub fn entry_match(entry: &CatalogEntry, weights: FusionWeights) -> Option<MatchCandidate> {
    let source = entry.record(Vendor::Tunisianet)?;
    let candidate = entry.record(Vendor::Mytek)?;

    match entry.cached_scores() {
        Some((reference_similarity, name_similarity, average_similarity)) => Some(MatchCandidate {
            source,
            candidate,
            reference_similarity,
            name_similarity,
            average_similarity,
        }),
        None => Some(score_pair(&source, &candidate, weights)),
    }
}

/// [`entry_match`] over a whole entry list, in entry order.
pub(crate) fn entry_matches<'a>(
    entries: &'a [CatalogEntry],
    scoring: &Scoring,
) -> Vec<(&'a CatalogEntry, MatchCandidate)> {
    let pair = |entry: &'a CatalogEntry| entry_match(entry, scoring.weights).map(|m| (entry, m));
    if entries.len() >= scoring.parallel_threshold {
        entries.par_iter().filter_map(pair).collect()
    } else {
        entries.iter().filter_map(pair).collect()
    }
}

/// Highest-scoring stored pairs, best first, at most `top_n`.
#[must_use]
pub fn top_pairs(entries: &[CatalogEntry], top_n: usize, scoring: &Scoring) -> Vec<MatchCandidate> {
    let mut pairs: Vec<MatchCandidate> = entry_matches(entries, scoring)
        .into_iter()
        .map(|(_, m)| m)
        .collect();
    pairs.sort_by(|a, b| b.average_similarity.total_cmp(&a.average_similarity));
    pairs.truncate(top_n);
    pairs
}
