//! Disagreement between the pool's bookkeeping and the server's session table.

use serde::Serialize;

use super::snapshot::PoolSnapshot;

/// Server-observed session count minus the pool's own total.
///
/// Transient non-zero values are normal. A delta that stays positive means the
/// server holds sessions the pool no longer knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Drift {
    pub pool_total: u32,
    pub server_total: u32,
    pub delta: i32,
}

impl Drift {
    pub fn between(pool_total: u32, server_total: u32) -> Self {
        let delta = i64::from(server_total) - i64::from(pool_total);
        Self {
            pool_total,
            server_total,
            delta: delta.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
        }
    }

    pub fn detect(snapshot: &PoolSnapshot, server_session_count: u32) -> Self {
        Self::between(snapshot.total, server_session_count)
    }

    /// Only a surplus on the server side is ever acted upon. A negative delta
    /// just means connections are busy elsewhere.
    pub fn is_actionable(&self) -> bool {
        self.delta > 0
    }

    /// Positive part of the delta.
    pub fn surplus(&self) -> u32 {
        u32::try_from(self.delta.max(0)).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_is_server_minus_pool() {
        for (pool, server) in [(0, 0), (8, 10), (10, 8), (0, 25), (u32::MAX, 0)] {
            let drift = Drift::between(pool, server);
            let expected = (i64::from(server) - i64::from(pool))
                .clamp(i64::from(i32::MIN), i64::from(i32::MAX));
            assert_eq!(i64::from(drift.delta), expected);
        }
    }

    #[test]
    fn only_positive_delta_is_actionable() {
        assert!(Drift::between(8, 10).is_actionable());
        assert!(!Drift::between(8, 8).is_actionable());
        assert!(!Drift::between(10, 3).is_actionable());
    }

    #[test]
    fn surplus_ignores_negative_delta() {
        assert_eq!(Drift::between(8, 10).surplus(), 2);
        assert_eq!(Drift::between(10, 8).surplus(), 0);
    }
}
