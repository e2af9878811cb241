use catmatch_core::{CatalogEntry, EntryScores, FusionWeights, Vendor};

use crate::rank::score_pair;

/// Whether any cached column of `entry` is stale.
///
/// A missing price difference only counts when both prices are present.
#[must_use]
pub fn needs_rescore(entry: &CatalogEntry) -> bool {
    entry.cached_scores().is_none()
        || (entry.price_difference.is_none()
            && entry.tunisianet_price.is_some()
            && entry.mytek_price.is_some())
}

/// Recompute cached scores for entries that need it, or for all of them when
/// `force` is set. Entries missing either side are skipped.
#[must_use]
pub fn rescore(entries: &[CatalogEntry], weights: FusionWeights, force: bool) -> Vec<EntryScores> {
    entries
        .iter()
        .filter(|entry| force || needs_rescore(entry))
        .filter_map(|entry| {
            let source = entry.record(Vendor::Tunisianet)?;
            let candidate = entry.record(Vendor::Mytek)?;
            let scored = score_pair(&source, &candidate, weights);
            let price_difference = source
                .comparable_price()
                .zip(candidate.comparable_price())
                .map(|(a, b)| (a - b).abs());

            Some(EntryScores {
                id: entry.id,
                reference_similarity: scored.reference_similarity,
                name_similarity: scored.name_similarity,
                average_similarity: scored.average_similarity,
                price_difference,
            })
        })
        .collect()
}
