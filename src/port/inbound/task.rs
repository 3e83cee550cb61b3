//! Scheduled task port.
//!
//! The scheduler awaits each cycle to completion before waiting for the next
//! tick, so a task's cycles never overlap. That is what lets a task keep
//! cross-cycle state behind `&mut self` without a lock.

use async_trait::async_trait;

/// A unit of background work driven on a fixed period.
#[async_trait]
pub trait PeriodicTask: Send {
    /// Short stable name used in logs and alerts.
    fn name(&self) -> &'static str;

    /// Run one cycle. Failures are handled inside the cycle; nothing escapes
    /// to the scheduler.
    async fn run_cycle(&mut self);
}
