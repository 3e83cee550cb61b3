//! Application orchestration.
//!
//! Runtime wiring and lifecycle management for the warden.

pub mod health;
pub mod runtime;
pub mod warden;

pub use health::{health_check, HealthCheck, HealthReport, HealthStatus};
pub use runtime::{reap_once, status};
pub use warden::{Warden, WardenHandle};
