//! Scheduler for the repeating mode
//!
//! This module handles:
//! - Running one cycle immediately and then at a fixed interval
//! - Isolating each cycle on its own task so that a panic cannot stop the loop
//! - Waiting a cooldown after a failed cycle before trying again
//! - Stopping when a shutdown signal resolves

use crate::config::ScheduleConfig;
use crate::crawler::coordinator::CycleOutcome;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Something that can run one cycle
#[async_trait]
pub trait CycleRunner: Send + Sync + 'static {
    async fn run_cycle(&self) -> crate::Result<CycleOutcome>;
}

/// How a scheduled tick ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Completed,

    /// Another cycle held the guard
    Skipped,

    /// The cycle returned an error or panicked
    Failed(String),
}

impl TickOutcome {
    /// Wait before the next tick
    pub fn next_wait(&self, interval: Duration, cooldown: Duration) -> Duration {
        match self {
            Self::Completed | Self::Skipped => interval,
            Self::Failed(_) => cooldown,
        }
    }
}

/// Repeats cycles until shutdown
pub struct Scheduler<R: CycleRunner> {
    runner: Arc<R>,
    interval: Duration,
    cooldown: Duration,
}

impl<R: CycleRunner> Scheduler<R> {
    pub fn new(runner: Arc<R>, config: &ScheduleConfig) -> Self {
        Self::with_durations(
            runner,
            Duration::from_secs(config.interval_secs),
            Duration::from_secs(config.cooldown_secs),
        )
    }

    pub fn with_durations(runner: Arc<R>, interval: Duration, cooldown: Duration) -> Self {
        Self {
            runner,
            interval,
            cooldown,
        }
    }

    /// Runs one cycle on its own task
    pub async fn tick(&self) -> TickOutcome {
        let runner = Arc::clone(&self.runner);

        match tokio::spawn(async move { runner.run_cycle().await }).await {
            Ok(Ok(CycleOutcome::Completed(report))) => {
                tracing::info!(
                    "Cycle completed: {} new, {} updated, {} unchanged",
                    report.new_count(),
                    report.updated_count(),
                    report.unchanged_count()
                );
                TickOutcome::Completed
            }
            Ok(Ok(CycleOutcome::AlreadyRunning)) => {
                tracing::info!("Previous cycle still running, skipping this tick");
                TickOutcome::Skipped
            }
            Ok(Err(e)) => {
                tracing::error!("Cycle failed: {}", e);
                TickOutcome::Failed(e.to_string())
            }
            Err(e) => {
                tracing::error!("Cycle task aborted: {}", e);
                TickOutcome::Failed(e.to_string())
            }
        }
    }

    /// Runs cycles until `shutdown` resolves
    ///
    /// The first cycle starts immediately. After a completed or skipped cycle
    /// the loop waits the interval; after a failed one it waits the cooldown.
    /// A cycle in progress when shutdown resolves is abandoned.
    ///
    /// # Returns
    ///
    /// The number of cycles that were started and finished
    pub async fn run_until<F>(&self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut cycles = 0;

        tracing::info!(
            "Repeating every {:?} (cooldown after failure {:?})",
            self.interval,
            self.cooldown
        );

        loop {
            let outcome = tokio::select! {
                outcome = self.tick() => outcome,
                _ = &mut shutdown => break,
            };
            cycles += 1;

            let wait = outcome.next_wait(self.interval, self.cooldown);
            tracing::debug!("Next cycle in {:?}", wait);

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = &mut shutdown => break,
            }
        }

        tracing::info!("Scheduler stopped after {} cycles", cycles);
        cycles
    }
}
