//! Pool ports: counter reads and idle-connection reclamation.

use std::time::Duration;

use crate::domain::PoolCounters;
use crate::error::Result;

/// Read access to a connection pool's internal counters.
///
/// # Implementation Notes
///
/// - Must read in-memory state only; never touch the network
/// - Must not check out or otherwise disturb pooled connections
pub trait PoolStatsSource: Send + Sync {
    /// Current counters. Errors are reported, never panicked on.
    fn counters(&self) -> Result<PoolCounters>;
}

/// Closes pooled connections that have sat unused for too long.
///
/// # Implementation Notes
///
/// - Must only close connections that are idle in the pool, never ones
///   checked out by a caller
/// - Must not block on the network
pub trait IdleReclaimer: Send + Sync {
    /// Close idle pooled connections unused for at least `max_idle`.
    /// Returns how many were closed.
    fn reclaim_idle(&self, max_idle: Duration) -> usize;
}
