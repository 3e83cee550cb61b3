//! Point-in-time pool counters.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Raw counters exposed by a connection pool's read API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolCounters {
    pub active: u32,
    pub idle: u32,
    pub total: u32,
    pub threads_awaiting: u32,
    pub max_size: u32,
}

/// Immutable sample of a pool's counters.
///
/// Created fresh on every read and never mutated afterwards. The monitor
/// keeps only the single most recent one to compute deltas against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolSnapshot {
    pub active: u32,
    pub idle: u32,
    pub total: u32,
    pub threads_awaiting: u32,
    pub max_size: u32,
    pub taken_at: DateTime<Utc>,
}

impl PoolSnapshot {
    /// The all-zero snapshot the monitor starts from.
    pub fn zero() -> Self {
        Self {
            active: 0,
            idle: 0,
            total: 0,
            threads_awaiting: 0,
            max_size: 0,
            taken_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    pub fn from_counters(counters: PoolCounters, taken_at: DateTime<Utc>) -> Self {
        Self {
            active: counters.active,
            idle: counters.idle,
            total: counters.total,
            threads_awaiting: counters.threads_awaiting,
            max_size: counters.max_size,
            taken_at,
        }
    }

    /// Active connections as a percentage of `max_size`. Zero for an
    /// unsized pool.
    pub fn utilization_pct(&self) -> f64 {
        if self.max_size == 0 {
            return 0.0;
        }
        f64::from(self.active) * 100.0 / f64::from(self.max_size)
    }

    /// Signed change in each counter relative to `previous`.
    pub fn delta_since(&self, previous: &PoolSnapshot) -> SnapshotDelta {
        SnapshotDelta {
            active: i64::from(self.active) - i64::from(previous.active),
            idle: i64::from(self.idle) - i64::from(previous.idle),
            total: i64::from(self.total) - i64::from(previous.total),
        }
    }
}

/// Per-counter movement between two consecutive snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotDelta {
    pub active: i64,
    pub idle: i64,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(active: u32, idle: u32, total: u32, max_size: u32) -> PoolSnapshot {
        PoolSnapshot::from_counters(
            PoolCounters {
                active,
                idle,
                total,
                threads_awaiting: 0,
                max_size,
            },
            Utc::now(),
        )
    }

    #[test]
    fn zero_snapshot_has_no_counts() {
        let zero = PoolSnapshot::zero();
        assert_eq!(zero.active, 0);
        assert_eq!(zero.total, 0);
        assert_eq!(zero.max_size, 0);
    }

    #[test]
    fn utilization_is_active_over_max() {
        assert_eq!(snapshot(8, 2, 10, 10).utilization_pct(), 80.0);
        assert_eq!(snapshot(1, 0, 1, 4).utilization_pct(), 25.0);
    }

    #[test]
    fn utilization_of_unsized_pool_is_zero() {
        assert_eq!(snapshot(3, 0, 3, 0).utilization_pct(), 0.0);
    }

    #[test]
    fn delta_can_go_negative() {
        let previous = snapshot(5, 2, 7, 10);
        let current = snapshot(2, 4, 6, 10);
        let delta = current.delta_since(&previous);
        assert_eq!(delta.active, -3);
        assert_eq!(delta.idle, 2);
        assert_eq!(delta.total, -1);
    }
}
