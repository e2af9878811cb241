use catmatch_core::MatchPolicy;

/// Recompute cached similarity and price-difference columns.
///
/// Without `force` only entries with stale columns are loaded. With
/// `dry_run` the scores are computed and reported but not written.
///
/// # Errors
///
/// Returns an error if loading or writing entries fails.
pub(crate) async fn run_rescore(
    pool: &sqlx::PgPool,
    policy: &MatchPolicy,
    force: bool,
    dry_run: bool,
) -> anyhow::Result<()> {
    let entries = if force {
        catmatch_db::list_entries(pool).await?
    } else {
        catmatch_db::list_entries_needing_rescore(pool).await?
    };

    let scores = catmatch_engine::rescore(&entries, policy.weights, force);
    let skipped = entries.len() - scores.len();
    tracing::info!(
        loaded = entries.len(),
        scored = scores.len(),
        skipped,
        force,
        "rescore: scores computed"
    );

    if dry_run {
        println!(
            "dry run: {} entr(ies) would be updated, {skipped} skipped",
            scores.len()
        );
        return Ok(());
    }

    let updated = catmatch_db::update_entry_scores(pool, &scores).await?;
    tracing::info!(updated, "rescore: complete");
    println!("updated {updated} entr(ies), {skipped} skipped");
    Ok(())
}
