//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`pool`] - `ScriptedPool`, a [`PoolStatsSource`](crate::port::PoolStatsSource)
//!   with settable or queued counters that can own fake sessions for
//!   idle reclamation.
//! - [`session`] - `InMemorySessionStore`, a backend session table that
//!   records terminations.
//! - [`notifier`] - `RecordingNotifier` for alert assertions.
//! - [`config`] - Canonical test configurations.

pub mod config;
pub mod notifier;
pub mod pool;
pub mod session;
