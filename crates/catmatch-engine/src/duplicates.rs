use std::collections::{HashMap, HashSet};

use catmatch_core::{CatalogEntry, DuplicateGroup, Vendor};

use crate::error::{check_fraction, EngineError};
use crate::normalize::normalize_opt;
use crate::pairs::entry_matches;
use crate::rank::Scoring;

/// Group catalog entries whose pairing scores strictly above `threshold`.
///
/// Each qualifying entry forms a group of its two records. Entries sharing a
/// normalized A-side reference are merged into the first such group; records
/// are deduplicated by `(vendor, entry id)` and the group keeps its highest
/// similarity. Groups come out best first, ties in first-seen order.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] when `threshold` is outside `[0, 1]`.
pub fn find_duplicates(
    entries: &[CatalogEntry],
    threshold: f64,
    scoring: &Scoring,
) -> Result<Vec<DuplicateGroup>, EngineError> {
    check_fraction("threshold", threshold)?;

    let mut groups: Vec<DuplicateGroup> = Vec::new();
    let mut members: Vec<HashSet<(Vendor, i64)>> = Vec::new();
    let mut by_reference: HashMap<String, usize> = HashMap::new();

    for (entry, pair) in entry_matches(entries, scoring) {
        if pair.average_similarity <= threshold {
            continue;
        }

        let key = normalize_opt(entry.tunisianet_reference.as_deref());
        let existing = (!key.is_empty())
            .then(|| by_reference.get(&key).copied())
            .flatten();

        let idx = if let Some(idx) = existing {
            idx
        } else {
            groups.push(DuplicateGroup {
                entry_ids: Vec::new(),
                records: Vec::new(),
                average_similarity: pair.average_similarity,
            });
            members.push(HashSet::new());
            let idx = groups.len() - 1;
            if !key.is_empty() {
                by_reference.insert(key, idx);
            }
            idx
        };

        let group = &mut groups[idx];
        if !group.entry_ids.contains(&entry.id) {
            group.entry_ids.push(entry.id);
        }
        for record in [pair.source, pair.candidate] {
            if members[idx].insert((record.vendor, record.entry_id)) {
                group.records.push(record);
            }
        }
        group.average_similarity = group.average_similarity.max(pair.average_similarity);
    }

    groups.sort_by(|a, b| b.average_similarity.total_cmp(&a.average_similarity));

    tracing::debug!(
        entries = entries.len(),
        groups = groups.len(),
        "duplicate scan complete"
    );
    Ok(groups)
}
