//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! score-cache refresh job when a cron expression is configured.

use std::sync::Arc;

use catmatch_core::{AppConfig, MatchPolicy};
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    config: &AppConfig,
    policy: Arc<MatchPolicy>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    match config.rescore_cron.as_deref() {
        Some(cron) => register_rescore_job(&scheduler, cron, pool, policy).await?,
        None => tracing::info!("scheduler: CATMATCH_RESCORE_CRON not set; rescore job disabled"),
    }

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the job that fills missing score-cache columns.
async fn register_rescore_job(
    scheduler: &JobScheduler,
    cron: &str,
    pool: PgPool,
    policy: Arc<MatchPolicy>,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let policy = Arc::clone(&policy);

        Box::pin(async move {
            tracing::info!("scheduler: starting score-cache refresh");
            run_rescore_job(&pool, &policy).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: rescore job registered");
    Ok(())
}

async fn run_rescore_job(pool: &PgPool, policy: &MatchPolicy) {
    let entries = match catmatch_db::list_entries_needing_rescore(pool).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to load entries needing rescore");
            return;
        }
    };

    if entries.is_empty() {
        tracing::info!("scheduler: score cache is current; nothing to do");
        return;
    }

    let pending = entries.len();
    let weights = policy.weights;
    let scores = match tokio::task::spawn_blocking(move || {
        catmatch_engine::rescore(&entries, weights, false)
    })
    .await
    {
        Ok(scores) => scores,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: rescore task failed");
            return;
        }
    };
    match catmatch_db::update_entry_scores(pool, &scores).await {
        Ok(updated) => tracing::info!(
            pending,
            updated,
            "scheduler: score-cache refresh complete"
        ),
        Err(e) => tracing::error!(error = %e, "scheduler: failed to write scores"),
    }
}
