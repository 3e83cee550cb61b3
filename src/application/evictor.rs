//! Reconciliation evictor.
//!
//! Compares the pool's total against the server's count of this
//! application's idle sessions. When the server holds more than the pool
//! knows about, it terminates the oldest idle sessions that have outlived the
//! pool's own idle timeout plus a safety margin. Sessions inside that window
//! are left for the pool's housekeeper to close.
//!
//! # Pass
//!
//! ```text
//! PoolSnapshotReader ──> pool total ──┐
//!                                     ├──> Drift ──(delta > threshold)──> candidates
//! ServerSessionReader ─> idle rows ───┘                                     │
//!                                                     oldest first, capped at surplus
//!                                                                           │
//!                                                   terminate(pid), one checkout each
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::reader::{bounded, PoolSnapshotReader, ServerSessionReader};
use crate::domain::{Alert, Drift, EvictionCandidate};
use crate::error::Result;
use crate::port::{Notifier, PeriodicTask, SessionStore};

/// Tuning for [`ReconciliationEvictor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvictionPolicy {
    /// Pool idle timeout plus safety margin. Only sessions idle for strictly
    /// longer are eligible.
    pub threshold: Duration,
    /// Act only when the drift exceeds this many sessions.
    pub drift_threshold: u32,
    /// Fraction of `max_size` at which an in-sync pool counts as nearing
    /// capacity.
    pub nearing_capacity_ratio: f64,
    /// Per-call timeout on every backend operation.
    pub query_timeout: Duration,
}

impl Default for EvictionPolicy {
    fn default() -> Self {
        Self {
            threshold: Duration::from_secs(180 + 60),
            drift_threshold: 0,
            nearing_capacity_ratio: 0.8,
            query_timeout: Duration::from_secs(5),
        }
    }
}

/// What one eviction pass decided.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EvictionOutcome {
    /// The server holds no more sessions than the pool.
    InSync {
        drift: Drift,
        nearing_capacity: bool,
    },
    /// Positive drift, but not above the configured threshold.
    BelowThreshold { drift: Drift },
    /// Positive drift, but every idle session is still inside the safety
    /// window.
    NoEligibleSessions { drift: Drift },
    /// Sessions were terminated.
    Reconciled {
        drift_before: Drift,
        drift_after: Drift,
        candidates: Vec<EvictionCandidate>,
        terminated: usize,
        failed: usize,
    },
}

pub struct ReconciliationEvictor {
    pool: PoolSnapshotReader,
    sessions: ServerSessionReader,
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
    policy: EvictionPolicy,
}

impl ReconciliationEvictor {
    pub fn new(
        pool: PoolSnapshotReader,
        sessions: ServerSessionReader,
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
        policy: EvictionPolicy,
    ) -> Self {
        Self {
            pool,
            sessions,
            store,
            notifier,
            policy,
        }
    }

    /// Run one pass.
    ///
    /// # Errors
    ///
    /// Returns an error if either read fails. Individual termination
    /// failures are counted, not returned.
    pub async fn run_pass(&mut self) -> Result<EvictionOutcome> {
        let snapshot = self.pool.read()?;
        let idle = self.sessions.idle_sessions().await?;
        let server_total = u32::try_from(idle.len()).unwrap_or(u32::MAX);
        let drift = Drift::detect(&snapshot, server_total);

        if !drift.is_actionable() {
            let nearing_capacity = snapshot.idle > 3
                || f64::from(snapshot.total)
                    >= f64::from(snapshot.max_size) * self.policy.nearing_capacity_ratio;
            if nearing_capacity {
                debug!(
                    idle = snapshot.idle,
                    total = snapshot.total,
                    max_size = snapshot.max_size,
                    "Pool nearing capacity, relying on automatic cleanup"
                );
            }
            return Ok(EvictionOutcome::InSync {
                drift,
                nearing_capacity,
            });
        }

        if drift.surplus() <= self.policy.drift_threshold {
            debug!(
                delta = drift.delta,
                drift_threshold = self.policy.drift_threshold,
                "Drift below threshold"
            );
            return Ok(EvictionOutcome::BelowThreshold { drift });
        }

        let mut candidates: Vec<EvictionCandidate> = idle
            .iter()
            .filter_map(|s| s.eviction_candidate(self.policy.threshold))
            .collect();
        if candidates.is_empty() {
            info!(
                delta = drift.delta,
                threshold_secs = self.policy.threshold.as_secs(),
                "Drift detected but no idle session is past the safety window"
            );
            return Ok(EvictionOutcome::NoEligibleSessions { drift });
        }
        candidates.sort_by(|a, b| b.idle_duration_seconds.cmp(&a.idle_duration_seconds));
        candidates.truncate(drift.surplus() as usize);

        let mut terminated = 0usize;
        let mut failed = 0usize;
        for candidate in &candidates {
            match self.terminate(candidate.pid).await {
                Ok(true) => terminated += 1,
                Ok(false) => {
                    failed += 1;
                    debug!(pid = candidate.pid, "Session already gone or refused");
                }
                Err(e) => {
                    failed += 1;
                    warn!(pid = candidate.pid, error = %e, "Failed to terminate session");
                }
            }
        }

        let remaining = server_total.saturating_sub(u32::try_from(terminated).unwrap_or(u32::MAX));
        let drift_after = Drift::between(drift.pool_total, remaining);

        warn!(
            drift_before = drift.delta,
            drift_after = drift_after.delta,
            pool_total = drift.pool_total,
            server_total = drift.server_total,
            candidates = candidates.len(),
            terminated,
            failed,
            "Reconciled pool drift by terminating abandoned sessions"
        );
        self.notifier.notify(&Alert::DriftReconciled {
            drift_before: drift.delta,
            drift_after: drift_after.delta,
            candidates: candidates.len(),
            terminated,
            failed,
        });

        Ok(EvictionOutcome::Reconciled {
            drift_before: drift,
            drift_after,
            candidates,
            terminated,
            failed,
        })
    }

    /// One checkout per termination, returned before the next.
    async fn terminate(&self, pid: i64) -> Result<bool> {
        bounded("terminate backend", self.policy.query_timeout, async {
            let mut channel = self.store.open().await?;
            channel.terminate(pid).await
        })
        .await
    }
}

#[async_trait]
impl PeriodicTask for ReconciliationEvictor {
    fn name(&self) -> &'static str {
        "evictor"
    }

    async fn run_cycle(&mut self) {
        if let Err(e) = self.run_pass().await {
            error!(error = %e, "Eviction pass failed");
            self.notifier.notify(&Alert::TaskFailed {
                task: self.name(),
                reason: e.to_string(),
            });
        }
    }
}
