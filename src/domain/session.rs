//! Server-side sessions as reported by the backend's activity view.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Backend session state, collapsed to the cases the reconciler cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Active,
    Idle,
    IdleInTransaction,
    Other,
}

impl SessionState {
    /// Parse the `state` column of `pg_stat_activity`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("active") => Self::Active,
            Some("idle") => Self::Idle,
            Some("idle in transaction") | Some("idle in transaction (aborted)") => {
                Self::IdleInTransaction
            }
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Idle => "idle",
            Self::IdleInTransaction => "idle in transaction",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which sessions an activity query should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateFilter {
    /// Only `idle` sessions.
    Idle,
    /// Everything that is not plain `idle`.
    Busy,
}

impl StateFilter {
    pub fn admits(&self, state: SessionState) -> bool {
        match self {
            Self::Idle => state == SessionState::Idle,
            Self::Busy => state != SessionState::Idle,
        }
    }
}

/// One row of the backend's session-activity view at sample time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerSession {
    pub pid: i64,
    pub client_addr: Option<String>,
    pub state: SessionState,
    pub query_start: Option<DateTime<Utc>>,
    pub state_changed_at: Option<DateTime<Utc>>,
    /// Time spent in the current state, measured by the server's clock.
    pub in_state_for: Option<Duration>,
}

impl ServerSession {
    /// An idle session whose idle time strictly exceeds `threshold` becomes
    /// an eviction candidate.
    pub fn eviction_candidate(&self, threshold: Duration) -> Option<EvictionCandidate> {
        if self.state != SessionState::Idle {
            return None;
        }
        let idle = self.in_state_for?;
        if idle <= threshold {
            return None;
        }
        Some(EvictionCandidate {
            pid: self.pid,
            idle_duration_seconds: u32::try_from(idle.as_secs()).unwrap_or(u32::MAX),
        })
    }
}

/// An idle session old enough to be terminated within one eviction pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EvictionCandidate {
    pub pid: i64,
    pub idle_duration_seconds: u32,
}
