//! Alert events emitted by the monitor, evictor and reaper.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Alert {
    /// Active connections reached the utilization warning level.
    HighUtilization {
        utilization_pct: f64,
        active: u32,
        max_size: u32,
    },
    /// Callers are blocked waiting for a connection.
    ThreadsWaiting { waiting: u32 },
    /// Every connection is in use and callers are queueing.
    PoolExhausted {
        active: u32,
        max_size: u32,
        waiting: u32,
    },
    /// The pool grew this interval and is close to its ceiling.
    GrowingNearSaturation {
        total: u32,
        max_size: u32,
        grew_by: i64,
    },
    /// Idle count static under active load across one interval.
    LeakSuspected { active: u32, idle: u32, total: u32 },
    /// The evictor terminated abandoned server sessions.
    DriftReconciled {
        drift_before: i32,
        drift_after: i32,
        candidates: usize,
        terminated: usize,
        failed: usize,
    },
    /// The startup reaper finished its pass.
    ReaperFinished { found: usize, terminated: usize },
    /// A scheduled cycle ended early on an error.
    TaskFailed { task: &'static str, reason: String },
}

impl Alert {
    pub fn severity(&self) -> Severity {
        match self {
            Self::HighUtilization { .. }
            | Self::ThreadsWaiting { .. }
            | Self::GrowingNearSaturation { .. }
            | Self::LeakSuspected { .. }
            | Self::DriftReconciled { .. } => Severity::Warning,
            Self::PoolExhausted { .. } => Severity::Critical,
            Self::ReaperFinished { .. } => Severity::Info,
            Self::TaskFailed { .. } => Severity::Error,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::HighUtilization { .. } => "high_utilization",
            Self::ThreadsWaiting { .. } => "threads_waiting",
            Self::PoolExhausted { .. } => "pool_exhausted",
            Self::GrowingNearSaturation { .. } => "growing_near_saturation",
            Self::LeakSuspected { .. } => "leak_suspected",
            Self::DriftReconciled { .. } => "drift_reconciled",
            Self::ReaperFinished { .. } => "reaper_finished",
            Self::TaskFailed { .. } => "task_failed",
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HighUtilization {
                utilization_pct,
                active,
                max_size,
            } => write!(
                f,
                "pool utilization {utilization_pct:.1}% ({active}/{max_size} active)"
            ),
            Self::ThreadsWaiting { waiting } => {
                write!(f, "{waiting} caller(s) blocked waiting for a connection")
            }
            Self::PoolExhausted {
                active,
                max_size,
                waiting,
            } => write!(
                f,
                "pool exhausted: {active}/{max_size} active with {waiting} waiting"
            ),
            Self::GrowingNearSaturation {
                total,
                max_size,
                grew_by,
            } => write!(
                f,
                "possible leak: pool grew by {grew_by} to {total}/{max_size}, nearly saturated while still growing"
            ),
            Self::LeakSuspected {
                active,
                idle,
                total,
            } => write!(
                f,
                "idle count stuck at {idle} (total {total}) with {active} active; check for unclosed transactions, long external calls while holding a connection, or a true leak"
            ),
            Self::DriftReconciled {
                drift_before,
                drift_after,
                candidates,
                terminated,
                failed,
            } => write!(
                f,
                "drift {drift_before} -> {drift_after}: terminated {terminated} of {candidates} abandoned session(s), {failed} failed"
            ),
            Self::ReaperFinished { found, terminated } => {
                write!(f, "startup reaper terminated {terminated} of {found} stale session(s)")
            }
            Self::TaskFailed { task, reason } => write!(f, "{task} cycle failed: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhaustion_is_critical() {
        let alert = Alert::PoolExhausted {
            active: 10,
            max_size: 10,
            waiting: 3,
        };
        assert_eq!(alert.severity(), Severity::Critical);
        assert_eq!(alert.name(), "pool_exhausted");
    }

    #[test]
    fn reconciliation_message_cites_drift() {
        let alert = Alert::DriftReconciled {
            drift_before: 2,
            drift_after: 0,
            candidates: 2,
            terminated: 2,
            failed: 0,
        };
        assert_eq!(alert.severity(), Severity::Warning);
        assert!(alert.to_string().starts_with("drift 2 -> 0"));
    }

    #[test]
    fn severities_are_ordered() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Critical);
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_value(Alert::ThreadsWaiting { waiting: 4 }).unwrap();
        assert_eq!(json["kind"], "threads_waiting");
        assert_eq!(json["waiting"], 4);
    }
}
