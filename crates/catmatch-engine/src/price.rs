//! Price comparison between matched listings and the bulk anomaly scan.

use catmatch_core::{BestDeal, CatalogEntry, PriceAnomaly, PriceComparison};
use rust_decimal::Decimal;

use crate::error::{check_fraction, check_percentage, EngineError};
use crate::pairs::entry_matches;
use crate::rank::Scoring;

/// Compare the A-side price `a` with the B-side price `b`.
///
/// The percentage difference is relative to the average of the two prices,
/// and is zero when that average is zero. Returns `None` if either price is
/// negative or the arithmetic overflows.
#[must_use]
pub fn compare_price(a: Decimal, b: Decimal) -> Option<PriceComparison> {
    if a.is_sign_negative() || b.is_sign_negative() {
        return None;
    }

    let average_price = a.checked_add(b)?.checked_div(Decimal::TWO)?;
    let absolute_difference = (a - b).abs();
    let percentage_difference = if average_price > Decimal::ZERO {
        absolute_difference
            .checked_div(average_price)?
            .checked_mul(Decimal::ONE_HUNDRED)?
    } else {
        Decimal::ZERO
    };

    let best_deal = match a.cmp(&b) {
        std::cmp::Ordering::Less => BestDeal::Tunisianet,
        std::cmp::Ordering::Greater => BestDeal::Mytek,
        std::cmp::Ordering::Equal => BestDeal::Equal,
    };

    Some(PriceComparison {
        price_a: a,
        price_b: b,
        average_price,
        absolute_difference,
        percentage_difference,
        best_deal,
    })
}

/// Matched pairs whose similarity is strictly above `similarity_threshold`
/// and whose price gap is strictly above `price_threshold` percent.
///
/// Sorted by percentage difference, largest first; ties keep entry order.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] when `similarity_threshold` is outside
/// `[0, 1]` or `price_threshold` is negative or not finite.
pub fn find_price_anomalies(
    entries: &[CatalogEntry],
    similarity_threshold: f64,
    price_threshold: f64,
    scoring: &Scoring,
) -> Result<Vec<PriceAnomaly>, EngineError> {
    check_fraction("similarity_threshold", similarity_threshold)?;
    let price_threshold = Decimal::try_from(check_percentage("price_threshold", price_threshold)?)
        .map_err(|e| EngineError::InvalidInput(format!("price_threshold: {e}")))?;

    let mut anomalies: Vec<PriceAnomaly> = entry_matches(entries, scoring)
        .into_iter()
        .filter(|(_, m)| m.average_similarity > similarity_threshold)
        .filter_map(|(_, m)| {
            let comparison = compare_price(
                m.source.comparable_price()?,
                m.candidate.comparable_price()?,
            )?;
            (comparison.percentage_difference > price_threshold).then_some(PriceAnomaly {
                matched: m,
                comparison,
            })
        })
        .collect();

    anomalies.sort_by(|a, b| {
        b.comparison
            .percentage_difference
            .cmp(&a.comparison.percentage_difference)
    });

    tracing::debug!(
        entries = entries.len(),
        anomalies = anomalies.len(),
        "price anomaly scan complete"
    );
    Ok(anomalies)
}
