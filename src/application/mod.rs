//! Application services (use cases).
//!
//! Each service drives domain logic through the outbound ports. The
//! scheduled ones implement [`PeriodicTask`](crate::port::PeriodicTask) and
//! share nothing mutable with each other; they only meet at the pool and the
//! backend.
//!
//! - [`reader`]: pool counter and server session samplers
//! - [`reaper`]: one-shot stale session cleanup at startup
//! - [`monitor`]: fast periodic status, threshold alerts, leak heuristic
//! - [`diagnostics`]: slower busy-session listing
//! - [`housekeeper`]: closes pooled connections idle past the timeout
//! - [`evictor`]: slow periodic drift reconciliation
//! - [`watch`]: read-only session summary for processes outside the pool

pub mod diagnostics;
pub mod evictor;
pub mod housekeeper;
pub mod monitor;
pub mod reader;
pub mod reaper;
pub mod watch;

pub use diagnostics::ActiveDiagnostics;
pub use evictor::{EvictionOutcome, EvictionPolicy, ReconciliationEvictor};
pub use housekeeper::Housekeeper;
pub use monitor::{MonitorReport, MonitorThresholds, PeriodicMonitor};
pub use reader::{PoolSnapshotReader, ServerSessionReader};
pub use reaper::{ReapOutcome, StartupReaper};
pub use watch::{SessionSummary, SessionWatch};
