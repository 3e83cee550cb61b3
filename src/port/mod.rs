//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the seams between the reconciler and the things it observes
//! or acts on: the connection pool's counters, the backend's session table,
//! and whatever consumes alerts.
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │                         │
//!     ┌──────────────┤  Domain + Port          ├──────────────┐
//!     │              │                         │              │
//!     │              └─────────────────────────┘              │
//!     │                         │                             │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌───────────┐
//! │  Pool   │            │  Session    │              │ Notifier  │
//! │ Counters│            │  Store      │              │  Adapter  │
//! └─────────┘            └─────────────┘              └───────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`PoolStatsSource`] - In-memory pool counters
//! - [`IdleReclaimer`] - Closing pooled connections idle too long
//! - [`SessionStore`], [`SessionChannel`] - Backend session enumeration and termination
//! - [`Notifier`] - Alert delivery (logging, tests, etc.)
//! - [`PeriodicTask`] - Work the scheduler drives on a fixed period

pub mod inbound;
pub mod outbound;

pub use inbound::task::PeriodicTask;

pub use outbound::notifier::{LogNotifier, Notifier, NotifierRegistry};
pub use outbound::pool::{IdleReclaimer, PoolStatsSource};
pub use outbound::session::{SessionChannel, SessionScope, SessionStore};
