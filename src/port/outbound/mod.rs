//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the infrastructure the reconciler depends on:
//! the pool handle, a raw SQL channel to the backend, and alert sinks.

pub mod notifier;
pub mod pool;
pub mod session;
