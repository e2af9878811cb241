//! Dashboard figures over the whole catalog.

use catmatch_core::{BestDeal, CatalogEntry};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{check_fraction, check_percentage, EngineError};
use crate::pairs::entry_match;
use crate::price::compare_price;
use crate::rank::Scoring;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BestDealCounts {
    pub tunisianet: usize,
    pub mytek: usize,
    pub equal: usize,
}

impl BestDealCounts {
    fn record(&mut self, deal: BestDeal) {
        match deal {
            BestDeal::Tunisianet => self.tunisianet += 1,
            BestDeal::Mytek => self.mytek += 1,
            BestDeal::Equal => self.equal += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchSummary {
    pub total_entries: usize,
    /// Entries where both vendors list a usable price.
    pub priced_pairs: usize,
    pub average_match_score: f64,
    pub average_price_difference: Decimal,
    pub duplicates_count: usize,
    pub anomalies_count: usize,
    pub best_deals: BestDealCounts,
}

/// Summarize `entries` for the dashboard.
///
/// Everything except `total_entries` is computed over priced pairs only.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] for an out-of-range threshold.
pub fn summarize(
    entries: &[CatalogEntry],
    duplicate_threshold: f64,
    price_threshold: f64,
    scoring: &Scoring,
) -> Result<MatchSummary, EngineError> {
    check_fraction("duplicate_threshold", duplicate_threshold)?;
    let price_threshold = Decimal::try_from(check_percentage("price_threshold", price_threshold)?)
        .map_err(|e| EngineError::InvalidInput(format!("price_threshold: {e}")))?;

    let mut summary = MatchSummary {
        total_entries: entries.len(),
        ..MatchSummary::default()
    };
    let mut score_total = 0.0;
    let mut scored = 0_usize;
    let mut pct_total = Decimal::ZERO;

    for entry in entries {
        let Some(comparison) = priced(entry).and_then(|(a, b)| compare_price(a, b)) else {
            continue;
        };
        summary.priced_pairs += 1;
        summary.best_deals.record(comparison.best_deal);
        pct_total = pct_total.saturating_add(comparison.percentage_difference);
        if comparison.percentage_difference > price_threshold {
            summary.anomalies_count += 1;
        }

        if let Some(pair) = entry_match(entry, scoring.weights) {
            score_total += pair.average_similarity;
            scored += 1;
            if pair.average_similarity > duplicate_threshold {
                summary.duplicates_count += 1;
            }
        }
    }

    if scored > 0 {
        #[allow(clippy::cast_precision_loss)]
        let mean = score_total / scored as f64;
        summary.average_match_score = mean;
    }
    if summary.priced_pairs > 0 {
        summary.average_price_difference = pct_total
            .checked_div(Decimal::from(summary.priced_pairs))
            .unwrap_or_default();
    }

    Ok(summary)
}

fn priced(entry: &CatalogEntry) -> Option<(Decimal, Decimal)> {
    let a = entry.tunisianet_price.filter(|p| !p.is_sign_negative())?;
    let b = entry.mytek_price.filter(|p| !p.is_sign_negative())?;
    Some((a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, reference: &str, a: i64, b: Option<i64>) -> CatalogEntry {
        CatalogEntry {
            id,
            tunisianet_reference: Some(reference.to_string()),
            mytek_reference: Some(reference.to_string()),
            tunisianet_price: Some(Decimal::new(a, 0)),
            mytek_price: b.map(|b| Decimal::new(b, 0)),
            ..CatalogEntry::default()
        }
    }

    #[test]
    fn empty_catalog_is_all_zero() {
        let summary = summarize(&[], 0.85, 10.0, &Scoring::default()).expect("summary");
        assert_eq!(summary, MatchSummary::default());
    }

    #[test]
    fn counts_over_priced_pairs() {
        let entries = vec![
            entry(1, "A1", 100, Some(150)), // 40%, tunisianet
            entry(2, "B2", 100, Some(100)), // 0%, equal
            entry(3, "C3", 120, Some(100)), // ~18.18%, mytek
            entry(4, "D4", 100, None),      // unpriced
        ];
        let summary = summarize(&entries, 0.85, 10.0, &Scoring::default()).expect("summary");

        assert_eq!(summary.total_entries, 4);
        assert_eq!(summary.priced_pairs, 3);
        assert_eq!(summary.anomalies_count, 2);
        assert_eq!(summary.duplicates_count, 3);
        assert!((summary.average_match_score - 1.0).abs() < 1e-12);
        assert_eq!(
            summary.best_deals,
            BestDealCounts {
                tunisianet: 1,
                mytek: 1,
                equal: 1,
            }
        );
        // (40 + 0 + 18.18...) / 3
        assert_eq!(
            summary.average_price_difference.round_dp(2),
            Decimal::new(1939, 2)
        );
    }

    #[test]
    fn rejects_percentage_scale_duplicate_threshold() {
        assert!(summarize(&[], 85.0, 10.0, &Scoring::default()).is_err());
    }
}
