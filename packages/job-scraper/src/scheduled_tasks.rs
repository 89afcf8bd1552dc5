//! Scheduled scrape runs using tokio-cron-scheduler.
//!
//! ```text
//! Scheduler (SCRAPE_SCHEDULE)
//!     │
//!     └─► AppState::try_run(all sources)
//!             └─► skipped if a triggered run holds the lock
//! ```

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::server::{AppState, RunRefused};

/// Start the periodic full-catalog scrape. `schedule` is a 6-field cron expression.
pub async fn start_scheduler(state: AppState, schedule: &str) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let scrape_job = Job::new_async(schedule, move |_uuid, _lock| {
        let state = state.clone();
        Box::pin(async move {
            run_scheduled_scrape(&state).await;
        })
    })?;

    scheduler.add(scrape_job).await?;
    scheduler.start().await?;

    tracing::info!(schedule, "Scheduled scraping started");
    Ok(scheduler)
}

/// One scheduled run. Failures are logged, never propagated.
pub async fn run_scheduled_scrape(state: &AppState) {
    tracing::info!("Running scheduled scrape");

    match state.try_run(&[]).await {
        Ok(report) => tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            imported = report.imported(),
            "Scheduled scrape complete"
        ),
        Err(RunRefused::AlreadyRunning) => {
            tracing::info!("Skipping scheduled scrape: a run is already in progress")
        }
        Err(e) => tracing::error!(error = %e, "Scheduled scrape failed"),
    }
}
