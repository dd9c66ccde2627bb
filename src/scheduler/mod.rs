//! Periodic hunt cycles.
//!
//! [`CycleScheduler`] runs a cycle as soon as it starts and then once per
//! configured interval (daily by default) until its stop token fires.
//!
//! Cycles are not serialized against each other. A tick that fires while an
//! earlier cycle is still running starts another one alongside it, so two cycles
//! may read the same existing links and write overlapping rows.
//!
//! Stopping prevents new cycles from starting but does not interrupt running
//! ones. The scheduler waits for them, up to
//! [`SchedulerConfig::shutdown_timeout`], and cancels whatever is still running
//! after that.

use crate::config::SchedulerConfig;
use crate::error::Result;
use crate::jobhunter::JobHunter;
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span, warn};

/// Runs [`JobHunter::execute_job_hunt`] on a fixed interval
pub struct CycleScheduler {
    hunter: Arc<JobHunter>,
    config: SchedulerConfig,
}

impl CycleScheduler {
    /// Create a scheduler for `hunter`
    pub fn new(hunter: Arc<JobHunter>, config: SchedulerConfig) -> Self {
        Self { hunter, config }
    }

    /// Run cycles until `stop` is cancelled, then wait for running cycles
    ///
    /// A failed cycle is logged and never ends the schedule.
    pub async fn start(self, stop: CancellationToken) -> Result<()> {
        let period = self.config.interval;
        info!(interval_secs = period.as_secs(), "Job hunt scheduler started");

        // Shared by every cycle; cancelled only when shutdown times out
        let cycle_cancel = CancellationToken::new();
        let mut cycles = JoinSet::new();
        let mut next_cycle = 0u64;

        self.spawn_cycle(&mut cycles, &cycle_cancel, &mut next_cycle);

        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = stop.cancelled() => break,
                Some(joined) = cycles.join_next(), if !cycles.is_empty() => reap(joined),
                _ = ticker.tick() => self.spawn_cycle(&mut cycles, &cycle_cancel, &mut next_cycle),
            }
        }

        info!(in_flight = cycles.len(), "Stop requested, waiting for running cycles");
        self.drain(&mut cycles, &cycle_cancel).await;
        info!("Job hunt scheduler stopped");

        Ok(())
    }

    fn spawn_cycle(
        &self,
        cycles: &mut JoinSet<()>,
        cancel: &CancellationToken,
        next_cycle: &mut u64,
    ) {
        let cycle = *next_cycle;
        *next_cycle += 1;

        let hunter = Arc::clone(&self.hunter);
        let cancel = cancel.clone();
        cycles.spawn(
            async move {
                info!("Job hunt cycle started");
                match hunter.execute_job_hunt(&cancel).await {
                    Ok(report) => info!(
                        feeds = report.feeds,
                        new_postings = report.new_postings,
                        written = report.written,
                        "Job hunt cycle finished"
                    ),
                    Err(e) => error!(error = %e, error_code = e.code(), "Job hunt cycle failed"),
                }
            }
            .instrument(info_span!("job_hunt_cycle", cycle)),
        );
    }

    async fn drain(&self, cycles: &mut JoinSet<()>, cycle_cancel: &CancellationToken) {
        let Some(timeout) = self.config.shutdown_timeout else {
            reap_all(cycles).await;
            return;
        };

        if tokio::time::timeout(timeout, reap_all(cycles)).await.is_err() {
            warn!(
                in_flight = cycles.len(),
                timeout_secs = timeout.as_secs(),
                "Shutdown timeout elapsed, cancelling running cycles"
            );
            cycle_cancel.cancel();
            reap_all(cycles).await;
        }
    }
}

async fn reap_all(cycles: &mut JoinSet<()>) {
    while let Some(joined) = cycles.join_next().await {
        reap(joined);
    }
}

fn reap(joined: std::result::Result<(), JoinError>) {
    if let Err(e) = joined {
        error!(error = %e, "Job hunt cycle task did not complete");
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
