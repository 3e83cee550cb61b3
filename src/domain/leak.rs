//! Leak heuristic over two consecutive pool snapshots.

use serde::Serialize;

use super::snapshot::PoolSnapshot;

/// Default idle floor below which a static idle count is not interesting.
pub const DEFAULT_MIN_IDLE: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeakSignal {
    None,
    Suspect,
}

/// Flags "requests are running but connections are not coming back".
///
/// Suspect only when the idle count is at or above the floor, there is active
/// load, and neither idle nor total moved across the sampling interval. An
/// idle pool with no active connections is minimum-idle warm keeping and is
/// never flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeakHeuristic {
    min_idle: u32,
}

impl Default for LeakHeuristic {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_IDLE)
    }
}

impl LeakHeuristic {
    pub fn new(min_idle: u32) -> Self {
        Self { min_idle }
    }

    pub fn classify(&self, previous: &PoolSnapshot, current: &PoolSnapshot) -> LeakSignal {
        if current.active == 0 {
            return LeakSignal::None;
        }
        let static_idle = current.idle == previous.idle && current.total == previous.total;
        if current.idle >= self.min_idle && static_idle {
            LeakSignal::Suspect
        } else {
            LeakSignal::None
        }
    }
}
