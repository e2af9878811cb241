//! Read-only catalog reports: matches, duplicates, anomalies, search, stats.

use catmatch_core::{MatchCandidate, MatchPolicy, ProductRecord, Vendor};
use catmatch_engine::Scoring;
use serde::Serialize;

/// Inputs of a best-match lookup, as given on the command line.
#[derive(Debug, Clone, Default)]
pub(crate) struct MatchRequest {
    pub reference: Option<String>,
    pub name: Option<String>,
    pub top_n: Option<i64>,
    pub min_confidence: Option<f64>,
}

/// Negative counts become 0.
pub(crate) fn count_arg(value: Option<i64>, default: usize) -> usize {
    value.map_or(default, |n| usize::try_from(n.max(0)).unwrap_or(0))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn truncate(value: Option<&str>, max: usize) -> String {
    let value = value.unwrap_or("-");
    if value.chars().count() > max {
        format!("{}...", value.chars().take(max).collect::<String>())
    } else {
        value.to_string()
    }
}

fn print_matches(matches: &[MatchCandidate]) {
    println!(
        "{:<8}{:<22}{:<8}{:<22}{:<8}{:<8}AVG",
        "ENTRY", "SOURCE REF", "ENTRY", "CANDIDATE REF", "REF", "NAME"
    );
    for m in matches {
        println!(
            "{:<8}{:<22}{:<8}{:<22}{:<8.3}{:<8.3}{:.3}",
            m.source.entry_id,
            truncate(m.source.reference.as_deref(), 18),
            m.candidate.entry_id,
            truncate(m.candidate.reference.as_deref(), 18),
            m.reference_similarity,
            m.name_similarity,
            m.average_similarity,
        );
    }
}

/// Rank mytek candidates for the requested reference and/or name.
///
/// # Errors
///
/// Returns an error if the input is invalid or the database query fails.
pub(crate) async fn run_match(
    pool: &sqlx::PgPool,
    policy: &MatchPolicy,
    request: MatchRequest,
    json: bool,
) -> anyhow::Result<()> {
    let mut source = ProductRecord::new(0, Vendor::Tunisianet);
    source.reference = request.reference;
    source.name = request.name;
    let top_n = count_arg(request.top_n, policy.top_n);
    let min_confidence = request.min_confidence.unwrap_or(policy.min_confidence);
    catmatch_engine::check_source(&source)?;
    catmatch_engine::check_fraction("min_confidence", min_confidence)?;

    let entries = catmatch_db::list_candidate_entries(pool).await?;
    let candidates: Vec<ProductRecord> = entries
        .iter()
        .filter_map(|entry| entry.record(Vendor::Mytek))
        .collect();

    let ranked = catmatch_engine::rank_matches(
        &source,
        &candidates,
        top_n,
        min_confidence,
        &Scoring::from(policy),
    )?;

    if json {
        return print_json(&ranked);
    }
    if ranked.is_empty() {
        println!(
            "no match at or above {min_confidence:.2} among {} candidates",
            candidates.len()
        );
        return Ok(());
    }
    print_matches(&ranked);
    Ok(())
}

/// Print the highest-scoring stored pairs.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_top(
    pool: &sqlx::PgPool,
    policy: &MatchPolicy,
    limit: Option<i64>,
    json: bool,
) -> anyhow::Result<()> {
    let entries = catmatch_db::list_entries(pool).await?;
    let top = catmatch_engine::top_pairs(
        &entries,
        count_arg(limit, policy.top_n),
        &Scoring::from(policy),
    );

    if json {
        return print_json(&top);
    }
    if top.is_empty() {
        println!("no entries carry both vendors; nothing to rank");
        return Ok(());
    }
    print_matches(&top);
    Ok(())
}

/// Print duplicate groups.
///
/// # Errors
///
/// Returns an error if the threshold is invalid or the database query fails.
pub(crate) async fn run_duplicates(
    pool: &sqlx::PgPool,
    policy: &MatchPolicy,
    threshold: Option<f64>,
    json: bool,
) -> anyhow::Result<()> {
    let threshold = threshold.unwrap_or(policy.duplicate_threshold);
    catmatch_engine::check_fraction("threshold", threshold)?;

    let entries = catmatch_db::list_entries(pool).await?;
    let groups = catmatch_engine::find_duplicates(&entries, threshold, &Scoring::from(policy))?;

    if json {
        return print_json(&groups);
    }
    if groups.is_empty() {
        println!("no duplicates above {threshold:.2}");
        return Ok(());
    }

    println!("{:<8}{:<20}RECORDS", "SCORE", "ENTRIES");
    for group in &groups {
        let ids = group
            .entry_ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let records = group
            .records
            .iter()
            .map(|r| format!("{}:{}", r.vendor, truncate(r.reference.as_deref(), 18)))
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "{:<8.3}{:<20}{}",
            group.average_similarity,
            truncate(Some(&ids), 16),
            records
        );
    }
    println!("{} group(s)", groups.len());
    Ok(())
}

/// Print price anomalies, largest gap first.
///
/// # Errors
///
/// Returns an error if a threshold is invalid or the database query fails.
pub(crate) async fn run_anomalies(
    pool: &sqlx::PgPool,
    policy: &MatchPolicy,
    similarity_threshold: Option<f64>,
    price_threshold: Option<f64>,
    json: bool,
) -> anyhow::Result<()> {
    let similarity_threshold =
        similarity_threshold.unwrap_or(policy.anomaly_similarity_threshold);
    let price_threshold = price_threshold.unwrap_or(policy.price_difference_threshold);
    catmatch_engine::check_fraction("similarity_threshold", similarity_threshold)?;
    catmatch_engine::check_percentage("price_threshold", price_threshold)?;

    let entries = catmatch_db::list_entries(pool).await?;
    let anomalies = catmatch_engine::find_price_anomalies(
        &entries,
        similarity_threshold,
        price_threshold,
        &Scoring::from(policy),
    )?;

    if json {
        return print_json(&anomalies);
    }
    if anomalies.is_empty() {
        println!("no anomalies above {price_threshold}%");
        return Ok(());
    }

    println!(
        "{:<8}{:<22}{:<12}{:<12}{:<10}{:<8}BEST",
        "ENTRY", "REFERENCE", "TUNISIANET", "MYTEK", "DIFF %", "SIM"
    );
    for anomaly in &anomalies {
        let c = &anomaly.comparison;
        println!(
            "{:<8}{:<22}{:<12}{:<12}{:<10}{:<8.3}{}",
            anomaly.matched.source.entry_id,
            truncate(anomaly.matched.source.reference.as_deref(), 18),
            c.price_a.to_string(),
            c.price_b.to_string(),
            c.percentage_difference.round_dp(2).to_string(),
            anomaly.matched.average_similarity,
            c.best_deal.vendor().map_or("equal", Vendor::as_str),
        );
    }
    Ok(())
}

/// Print vendor records whose reference contains `query`.
///
/// # Errors
///
/// Returns an error if the query is blank or the database query fails.
pub(crate) async fn run_search(pool: &sqlx::PgPool, query: &str, json: bool) -> anyhow::Result<()> {
    let term = catmatch_engine::check_query(query)?;
    let entries = catmatch_db::search_entries(pool, term).await?;
    let records = catmatch_engine::search_by_reference(&entries, term)?;

    if json {
        return print_json(&records);
    }
    if records.is_empty() {
        println!("no reference contains '{term}'");
        return Ok(());
    }

    println!(
        "{:<8}{:<12}{:<22}{:<12}NAME",
        "ENTRY", "VENDOR", "REFERENCE", "PRICE"
    );
    for record in &records {
        println!(
            "{:<8}{:<12}{:<22}{:<12}{}",
            record.entry_id,
            record.vendor.as_str(),
            truncate(record.reference.as_deref(), 18),
            record
                .price
                .map_or_else(|| "-".to_string(), |p| p.to_string()),
            truncate(record.name.as_deref(), 40),
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct VendorStats {
    vendor: String,
    total_products: i64,
    brand_count: i64,
    category_count: i64,
    avg_price: Option<rust_decimal::Decimal>,
}

#[derive(Debug, Serialize)]
struct StatsReport {
    summary: catmatch_engine::MatchSummary,
    vendors: Vec<VendorStats>,
}

/// Print dashboard statistics.
///
/// # Errors
///
/// Returns an error if a database query fails.
pub(crate) async fn run_stats(
    pool: &sqlx::PgPool,
    policy: &MatchPolicy,
    json: bool,
) -> anyhow::Result<()> {
    let entries = catmatch_db::list_entries(pool).await?;
    let vendor_rows = catmatch_db::vendor_stats(pool).await?;

    let summary = catmatch_engine::summarize(
        &entries,
        policy.duplicate_threshold,
        policy.price_difference_threshold,
        &Scoring::from(policy),
    )?;
    let report = StatsReport {
        summary,
        vendors: vendor_rows
            .into_iter()
            .map(|row| VendorStats {
                vendor: row.vendor,
                total_products: row.total_products,
                brand_count: row.brand_count,
                category_count: row.category_count,
                avg_price: row.avg_price,
            })
            .collect(),
    };

    if json {
        return print_json(&report);
    }

    let s = &report.summary;
    println!("entries:              {}", s.total_entries);
    println!("priced pairs:         {}", s.priced_pairs);
    println!("average match score:  {:.3}", s.average_match_score);
    println!(
        "average price diff:   {}%",
        s.average_price_difference.round_dp(2)
    );
    println!("duplicates:           {}", s.duplicates_count);
    println!("anomalies:            {}", s.anomalies_count);
    println!(
        "best deals:           tunisianet {} / mytek {} / equal {}",
        s.best_deals.tunisianet, s.best_deals.mytek, s.best_deals.equal
    );
    println!();
    println!(
        "{:<12}{:<10}{:<8}{:<12}AVG PRICE",
        "VENDOR", "PRODUCTS", "BRANDS", "CATEGORIES"
    );
    for v in &report.vendors {
        println!(
            "{:<12}{:<10}{:<8}{:<12}{}",
            v.vendor,
            v.total_products,
            v.brand_count,
            v.category_count,
            v.avg_price
                .map_or_else(|| "-".to_string(), |p| p.round_dp(3).to_string()),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_arg_clamps_negative_to_zero() {
        assert_eq!(count_arg(Some(-3), 3), 0);
        assert_eq!(count_arg(None, 3), 3);
        assert_eq!(count_arg(Some(7), 3), 7);
    }

    #[test]
    fn truncate_adds_ellipsis_past_max() {
        assert_eq!(truncate(Some("abcdef"), 3), "abc...");
        assert_eq!(truncate(Some("abc"), 3), "abc");
        assert_eq!(truncate(None, 3), "-");
    }
}
