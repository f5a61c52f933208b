//! Scheduled cleanup of the in-memory registries using tokio-cron-scheduler.
//!
//! Heartbeats already sweep the queue; this job keeps memory bounded when
//! nobody is polling.

use std::time::Duration;

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::debug;

use super::ServerDeps;

/// What one housekeeping pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HousekeepingReport {
    pub evicted: usize,
    pub forgotten: usize,
}

/// Start the housekeeping job, repeating every `every` (at least one second).
pub async fn start_housekeeping(deps: ServerDeps, every: Duration) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let every = every.max(Duration::from_secs(1));
    let job = Job::new_repeated_async(every, move |_uuid, _lock| {
        let deps = deps.clone();
        Box::pin(async move {
            run_housekeeping(&deps);
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    tracing::info!(interval_secs = every.as_secs(), "Housekeeping scheduled");
    Ok(scheduler)
}

/// Evict stale queue entries and offers, and forget inactive presence records.
pub fn run_housekeeping(deps: &ServerDeps) -> HousekeepingReport {
    let report = HousekeepingReport {
        evicted: deps.chat_queue.evict_stale(),
        forgotten: deps.presence.forget_inactive(),
    };
    if report != HousekeepingReport::default() {
        debug!(
            evicted = report.evicted,
            forgotten = report.forgotten,
            "housekeeping pass"
        );
    }
    report
}
