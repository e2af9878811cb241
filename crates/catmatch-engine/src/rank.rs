//! Candidate scoring and best-match ranking.

use std::collections::HashSet;

use catmatch_core::{FusionWeights, MatchCandidate, MatchPolicy, ProductRecord};
use rayon::prelude::*;

use crate::error::{check_fraction, EngineError};
use crate::fuse::fuse;
use crate::normalize::normalize_opt;
use crate::similarity::normalized_similarity;

/// How candidate sets are scored: fusion weights and the size from which
/// scoring fans out across the rayon pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scoring {
    pub weights: FusionWeights,
    pub parallel_threshold: usize,
}

impl Default for Scoring {
    fn default() -> Self {
        Self::from(&MatchPolicy::default())
    }
}

impl From<&MatchPolicy> for Scoring {
    fn from(policy: &MatchPolicy) -> Self {
        Self {
            weights: policy.weights,
            parallel_threshold: policy.parallel_threshold,
        }
    }
}

/// Source-side fields, normalized once per scan.
struct SourceKey<'a> {
    record: &'a ProductRecord,
    reference: String,
    name: String,
}

impl<'a> SourceKey<'a> {
    fn new(record: &'a ProductRecord) -> Self {
        Self {
            record,
            reference: normalize_opt(record.reference.as_deref()),
            name: normalize_opt(record.name.as_deref()),
        }
    }

    fn is_blank(&self) -> bool {
        self.reference.is_empty() && self.name.is_empty()
    }

    fn score(&self, candidate: &ProductRecord, weights: FusionWeights) -> MatchCandidate {
        // A score is present when the source carries the field; a candidate
        // missing it just scores 0 against it.
        let reference = (!self.reference.is_empty()).then(|| {
            normalized_similarity(
                &self.reference,
                &normalize_opt(candidate.reference.as_deref()),
            )
        });
        let name = (!self.name.is_empty()).then(|| {
            normalized_similarity(&self.name, &normalize_opt(candidate.name.as_deref()))
        });

        MatchCandidate {
            source: self.record.clone(),
            candidate: candidate.clone(),
            reference_similarity: reference.unwrap_or(0.0),
            name_similarity: name.unwrap_or(0.0),
            average_similarity: fuse(reference, name, weights),
        }
    }
}

/// Score one source record against one candidate.
#[must_use]
pub fn score_pair(
    source: &ProductRecord,
    candidate: &ProductRecord,
    weights: FusionWeights,
) -> MatchCandidate {
    SourceKey::new(source).score(candidate, weights)
}

/// Score `source` against every candidate, preserving candidate order.
///
/// Runs on the rayon pool once `candidates.len()` reaches
/// `scoring.parallel_threshold`.
#[must_use]
pub fn score_candidates(
    source: &ProductRecord,
    candidates: &[ProductRecord],
    scoring: &Scoring,
) -> Vec<MatchCandidate> {
    let key = SourceKey::new(source);
    if candidates.len() >= scoring.parallel_threshold {
        candidates
            .par_iter()
            .map(|c| key.score(c, scoring.weights))
            .collect()
    } else {
        candidates
            .iter()
            .map(|c| key.score(c, scoring.weights))
            .collect()
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
enum DedupKey {
    Reference(u64),
    Entry(i64),
}

impl DedupKey {
    fn of(scored: &MatchCandidate) -> Self {
        if scored.reference_similarity > 0.0 {
            DedupKey::Reference(scored.reference_similarity.to_bits())
        } else {
            DedupKey::Entry(scored.candidate.entry_id)
        }
    }
}

/// Reject a source that has neither a reference nor a name.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] when both fields are blank.
pub fn check_source(source: &ProductRecord) -> Result<(), EngineError> {
    if SourceKey::new(source).is_blank() {
        return Err(EngineError::InvalidInput(
            "a reference or a name is required".to_string(),
        ));
    }
    Ok(())
}

/// Rank `candidates` for `source` and keep the best `top_n`.
///
/// Candidates are deduplicated first-seen-wins on their reference score (or
/// on their entry id when that score is zero), filtered to
/// `average_similarity >= min_confidence`, stably sorted descending and
/// truncated.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] when the source has neither a
/// reference nor a name, or when `min_confidence` is outside `[0, 1]`.
pub fn rank_matches(
    source: &ProductRecord,
    candidates: &[ProductRecord],
    top_n: usize,
    min_confidence: f64,
    scoring: &Scoring,
) -> Result<Vec<MatchCandidate>, EngineError> {
    check_source(source)?;
    check_fraction("min_confidence", min_confidence)?;

    if candidates.is_empty() || top_n == 0 {
        return Ok(Vec::new());
    }

    let scored = score_candidates(source, candidates, scoring);

    let mut seen = HashSet::new();
    let mut ranked: Vec<MatchCandidate> = scored
        .into_iter()
        .filter(|m| seen.insert(DedupKey::of(m)))
        .filter(|m| m.average_similarity >= min_confidence)
        .collect();

    ranked.sort_by(|a, b| b.average_similarity.total_cmp(&a.average_similarity));
    ranked.truncate(top_n);

    tracing::debug!(
        candidates = candidates.len(),
        ranked = ranked.len(),
        "ranked best matches"
    );
    Ok(ranked)
}

#[cfg(test)]
#[path = "rank_test.rs"]
mod tests;
