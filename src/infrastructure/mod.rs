//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without containing
//! business logic: configuration, task scheduling and runtime wiring.
//!
//! # Submodules
//!
//! - [`config`] - Configuration loading and validation
//! - [`orchestration`] - Warden startup, process runtime and health report
//! - [`scheduler`] - Non-overlapping fixed-period task driver

pub mod config;
pub mod orchestration;
pub mod scheduler;
