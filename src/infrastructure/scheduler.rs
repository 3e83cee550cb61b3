//! Fixed-period task scheduler.
//!
//! Every task gets its own tokio task and its own interval. A cycle is
//! awaited inside the loop, so a task never runs concurrently with itself.
//! When a cycle overruns its period the ticks that fell due meanwhile are
//! dropped and the schedule restarts one period after the cycle finished.
//! A panicking cycle is logged and the loop keeps going.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::port::PeriodicTask;

/// When a task first runs and how often after that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub initial_delay: Duration,
    pub period: Duration,
}

impl Schedule {
    pub fn every(period: Duration) -> Self {
        Self {
            initial_delay: Duration::ZERO,
            period,
        }
    }

    pub fn after(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }
}

/// Drive `task` on `schedule` until `shutdown` turns true or its sender is
/// dropped.
///
/// # Panics
///
/// Panics if `schedule.period` is zero.
pub fn spawn_periodic<T>(
    mut task: T,
    schedule: Schedule,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    T: PeriodicTask + 'static,
{
    let period = schedule.period;
    let mut ticker = interval_at(Instant::now() + schedule.initial_delay, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tokio::spawn(async move {
        let name = task.name();
        debug!(
            task = name,
            period_secs = period.as_secs_f64(),
            initial_delay_secs = schedule.initial_delay.as_secs_f64(),
            "Scheduled task started"
        );

        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let started = Instant::now();
                    if let Err(panic) = AssertUnwindSafe(task.run_cycle()).catch_unwind().await {
                        error!(
                            task = name,
                            panic = panic_message(&*panic),
                            "Scheduled cycle panicked"
                        );
                    }
                    let elapsed = started.elapsed();
                    if elapsed >= period {
                        let skipped = elapsed.as_nanos() / period.as_nanos();
                        debug!(
                            task = name,
                            elapsed_ms = elapsed.as_millis() as u64,
                            skipped = skipped as u64,
                            "Cycle overran its period, skipping missed runs"
                        );
                        ticker.reset();
                    }
                }
            }
        }

        info!(task = name, "Scheduled task stopped");
    })
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Owns a set of scheduled tasks and their shared shutdown signal.
///
/// Dropping the scheduler aborts every task still running.
pub struct Scheduler {
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            shutdown_tx,
            tasks: Vec::new(),
        }
    }

    pub fn spawn<T>(&mut self, task: T, schedule: Schedule)
    where
        T: PeriodicTask + 'static,
    {
        let name = task.name();
        let handle = spawn_periodic(task, schedule, self.shutdown_tx.subscribe());
        self.tasks.push((name, handle));
    }

    pub fn task_names(&self) -> Vec<&'static str> {
        self.tasks.iter().map(|(name, _)| *name).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Signal every task to stop and wait for them. A task in the middle of
    /// a cycle finishes that cycle first.
    pub async fn shutdown(mut self) {
        self.shutdown_tx.send_replace(true);
        for (name, handle) in std::mem::take(&mut self.tasks) {
            if let Err(e) = handle.await {
                error!(task = name, error = %e, "Scheduled task ended abnormally");
            }
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown_tx.send_replace(true);
        for (_, handle) in &self.tasks {
            handle.abort();
        }
    }
}
