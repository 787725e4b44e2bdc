//! Background cache refresh.
//!
//! # Responsibilities
//! - Force one cache reset at startup, before traffic is accepted
//! - Poll the wall clock and force a reset whenever a checkpoint is crossed
//! - Stop promptly on request and let the caller await termination

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::lifecycle::Shutdown;
use crate::refresh::schedule::DailySchedule;
use crate::routing::RouteCache;

type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

pub struct RefreshScheduler {
    cache: Arc<RouteCache>,
    schedule: DailySchedule,
    poll_interval: Duration,
    clock: Clock,
}

impl RefreshScheduler {
    pub fn new(cache: Arc<RouteCache>, schedule: DailySchedule, poll_interval: Duration) -> Self {
        Self {
            cache,
            schedule,
            poll_interval,
            clock: Arc::new(|| Local::now().naive_local()),
        }
    }

    /// Replace the local wall clock.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> NaiveDateTime + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Run the startup reset, then spawn the polling loop.
    ///
    /// A failed startup reset is logged; requests populate the cache lazily.
    pub async fn start(self) -> SchedulerHandle {
        tracing::info!(
            checkpoints = ?self.schedule.checkpoints(),
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Starting refresh scheduler"
        );

        if let Err(e) = self.cache.ensure_populated(true).await {
            tracing::error!(error = %e, "Startup cache reset failed");
        }

        let shutdown = Shutdown::new();
        let receiver = shutdown.subscribe();
        let task = tokio::spawn(self.run(receiver));

        SchedulerHandle { shutdown, task }
    }

    async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut previous = (self.clock)();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let now = (self.clock)();
                    if self.schedule.crossed(previous, now) {
                        tracing::info!(
                            at = %now,
                            "Refresh checkpoint reached, resetting route cache"
                        );
                        tokio::select! {
                            result = self.cache.ensure_populated(true) => {
                                if let Err(e) = result {
                                    tracing::error!(error = %e, "Scheduled cache reset failed");
                                }
                            }
                            _ = shutdown.recv() => {
                                tracing::info!("Refresh scheduler stopped during reset");
                                return;
                            }
                        }
                    }
                    previous = now;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Refresh scheduler received shutdown signal, exiting loop");
                    return;
                }
            }
        }
    }
}

/// Handle to a running scheduler.
pub struct SchedulerHandle {
    shutdown: Shutdown,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signal the loop and wait for it to finish.
    pub async fn stop(self) {
        self.shutdown.trigger();
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Refresh scheduler task failed");
        }
        tracing::info!("Stopped refresh scheduler");
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
