//! Periodic pool monitor.
//!
//! Samples the pool on a fixed period, logs one status record per cycle,
//! raises threshold alerts and runs the leak heuristic against the previous
//! sample. It never corrects anything; correction is the evictor's job.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use super::reader::PoolSnapshotReader;
use crate::domain::{Alert, LeakHeuristic, LeakSignal, PoolSnapshot, SnapshotDelta};
use crate::error::Unavailable;
use crate::port::{Notifier, PeriodicTask};

/// Alerting thresholds for [`PeriodicMonitor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitorThresholds {
    /// Utilization percentage at or above which to warn.
    pub utilization_warn_pct: f64,
    /// Fraction of `max_size` at which a growing pool counts as saturated.
    pub saturation_ratio: f64,
}

impl Default for MonitorThresholds {
    fn default() -> Self {
        Self {
            utilization_warn_pct: 80.0,
            saturation_ratio: 0.9,
        }
    }
}

/// What one monitor cycle saw.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorReport {
    pub snapshot: PoolSnapshot,
    pub delta: SnapshotDelta,
    pub utilization_pct: f64,
    pub alerts: Vec<Alert>,
    pub leak: LeakSignal,
}

pub struct PeriodicMonitor {
    reader: PoolSnapshotReader,
    notifier: Arc<dyn Notifier>,
    thresholds: MonitorThresholds,
    leak: LeakHeuristic,
    /// Most recent completed sample. Only this task's own cycles touch it,
    /// and they never overlap.
    previous: PoolSnapshot,
}

impl PeriodicMonitor {
    pub fn new(
        reader: PoolSnapshotReader,
        notifier: Arc<dyn Notifier>,
        thresholds: MonitorThresholds,
        leak: LeakHeuristic,
    ) -> Self {
        Self {
            reader,
            notifier,
            thresholds,
            leak,
            previous: PoolSnapshot::zero(),
        }
    }

    pub fn previous(&self) -> &PoolSnapshot {
        &self.previous
    }

    /// Run one cycle and return what it saw. A failed read leaves the
    /// previous sample untouched.
    pub async fn observe(&mut self) -> Result<MonitorReport, Unavailable> {
        let current = self.reader.read()?;
        let delta = current.delta_since(&self.previous);
        let utilization_pct = current.utilization_pct();

        info!(
            active = current.active,
            idle = current.idle,
            total = current.total,
            waiting = current.threads_awaiting,
            max_size = current.max_size,
            active_delta = delta.active,
            idle_delta = delta.idle,
            total_delta = delta.total,
            utilization_pct = format_args!("{utilization_pct:.1}"),
            "Pool status"
        );

        let mut alerts = self.threshold_alerts(&current, &delta, utilization_pct);

        let leak = self.leak.classify(&self.previous, &current);
        if leak == LeakSignal::Suspect {
            alerts.push(Alert::LeakSuspected {
                active: current.active,
                idle: current.idle,
                total: current.total,
            });
        }

        for alert in &alerts {
            self.notifier.notify(alert);
        }

        self.previous = current;

        Ok(MonitorReport {
            snapshot: current,
            delta,
            utilization_pct,
            alerts,
            leak,
        })
    }

    fn threshold_alerts(
        &self,
        current: &PoolSnapshot,
        delta: &SnapshotDelta,
        utilization_pct: f64,
    ) -> Vec<Alert> {
        let mut alerts = Vec::new();

        if current.max_size > 0 && utilization_pct >= self.thresholds.utilization_warn_pct {
            alerts.push(Alert::HighUtilization {
                utilization_pct,
                active: current.active,
                max_size: current.max_size,
            });
        }
        if current.threads_awaiting > 0 {
            alerts.push(Alert::ThreadsWaiting {
                waiting: current.threads_awaiting,
            });
        }
        if current.active >= current.max_size && current.threads_awaiting > 0 {
            alerts.push(Alert::PoolExhausted {
                active: current.active,
                max_size: current.max_size,
                waiting: current.threads_awaiting,
            });
        }
        let saturation = f64::from(current.max_size) * self.thresholds.saturation_ratio;
        if delta.total > 0 && current.max_size > 0 && f64::from(current.total) >= saturation {
            alerts.push(Alert::GrowingNearSaturation {
                total: current.total,
                max_size: current.max_size,
                grew_by: delta.total,
            });
        }

        alerts
    }
}

#[async_trait]
impl PeriodicTask for PeriodicMonitor {
    fn name(&self) -> &'static str {
        "monitor"
    }

    async fn run_cycle(&mut self) {
        if let Err(e) = self.observe().await {
            warn!(error = %e, "Monitor cycle skipped");
        }
    }
}
