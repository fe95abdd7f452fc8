//! Long-running mode: the schedule and trending passes on cron schedules.
//!
//! Each job run reloads the catalogs and ledger from disk, so edits made
//! while `watch` is running are picked up on the next tick. The passes do
//! blocking file I/O and run on tokio's blocking pool.

use std::sync::Arc;

use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use trendscope_core::AppConfig;

use crate::commands;

/// Builds and starts the job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process; dropping it stops all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, a
/// cron expression is rejected, or the scheduler fails to start.
pub(crate) async fn build_scheduler(
    config: Arc<AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_schedule_job(&scheduler, Arc::clone(&config)).await?;
    register_trending_job(&scheduler, config).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_schedule_job(
    scheduler: &JobScheduler,
    config: Arc<AppConfig>,
) -> Result<(), JobSchedulerError> {
    let cron = config.schedule_cron.clone();
    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let config = Arc::clone(&config);

        Box::pin(async move {
            tracing::info!("scheduler: starting snapshot schedule pass");
            let pass = tokio::task::spawn_blocking(move || {
                commands::schedule_once(&config, config.active_window(), false, Utc::now())
            });
            match pass.await {
                Ok(Ok(summary)) => tracing::info!(
                    created = summary.tasks_created,
                    duplicates = summary.duplicates,
                    failures = summary.failures,
                    pruned = summary.pruned,
                    "scheduler: snapshot schedule pass complete"
                ),
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "scheduler: snapshot schedule pass failed");
                }
                Err(e) => tracing::error!(error = %e, "scheduler: snapshot schedule pass panicked"),
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, "scheduler: registered snapshot schedule job");
    Ok(())
}

async fn register_trending_job(
    scheduler: &JobScheduler,
    config: Arc<AppConfig>,
) -> Result<(), JobSchedulerError> {
    let cron = config.trending_cron.clone();
    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let config = Arc::clone(&config);

        Box::pin(async move {
            let pass =
                tokio::task::spawn_blocking(move || commands::trending_once(&config, Utc::now()));
            match pass.await {
                Ok(Ok(summary)) => {
                    for candidate in summary.admitted() {
                        tracing::info!(
                            youtube_video_id = %candidate.youtube_video_id,
                            title = %candidate.title,
                            "scheduler: trending candidate admitted"
                        );
                    }
                }
                Ok(Err(e)) => tracing::error!(error = %e, "scheduler: trending pass failed"),
                Err(e) => tracing::error!(error = %e, "scheduler: trending pass panicked"),
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, "scheduler: registered trending job");
    Ok(())
}

/// Resolves on ctrl-c, or SIGTERM on unix.
pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
