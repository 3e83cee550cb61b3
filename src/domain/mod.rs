//! Pool-health domain: snapshots, server sessions and the pure detectors
//! that compare them.
//!
//! Nothing in here performs I/O. [`Drift`] and [`LeakHeuristic`] are pure
//! functions over values taken independently by each task, which is what
//! lets the monitor and evictor interleave without coordination.

pub mod alert;
pub mod drift;
pub mod label;
pub mod leak;
pub mod session;
pub mod snapshot;

pub use alert::{Alert, Severity};
pub use drift::Drift;
pub use label::LabelPattern;
pub use leak::{LeakHeuristic, LeakSignal};
pub use session::{EvictionCandidate, ServerSession, SessionState, StateFilter};
pub use snapshot::{PoolCounters, PoolSnapshot, SnapshotDelta};
