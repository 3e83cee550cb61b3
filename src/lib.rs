//! Poolwarden - connection-pool health reconciliation for PostgreSQL.
//!
//! Keeps a deadpool-postgres pool and the server's session table in
//! agreement:
//!
//! - **Startup reaper** - terminates sessions a crashed predecessor left on
//!   the server before the pool starts serving
//! - **Monitor** - samples pool counters on a fixed period, raises threshold
//!   alerts and flags idle counts that stop moving under load
//! - **Diagnostics** - lists what busy sessions are doing
//! - **Evictor** - when the server holds more of this application's idle
//!   sessions than the pool knows about, terminates the ones the pool has
//!   apparently abandoned
//! - **Housekeeper** - closes pooled connections idle past the pool's idle
//!   timeout, which the evictor's safety window is measured against
//!
//! All of that runs inside the application that owns the pool, through
//! [`Warden::start`](infrastructure::orchestration::Warden::start). The
//! `poolwarden` binary only watches and reports.
//!
//! # Modules
//!
//! - [`domain`] - Snapshots, sessions, drift and leak detection (pure)
//! - [`port`] - Traits at the pool, backend and alert boundaries
//! - [`adapter`] - deadpool-postgres / tokio-postgres implementations
//! - [`application`] - Readers, reaper, monitor, diagnostics, evictor
//! - [`infrastructure`] - Config, scheduler, orchestration
//! - [`cli`] - Command-line interface
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use poolwarden::adapter::outbound::postgres::{create_pool, DeadpoolHandle, PgSessionStore};
//! use poolwarden::infrastructure::config::settings::Config;
//! use poolwarden::infrastructure::orchestration::Warden;
//! use poolwarden::port::NotifierRegistry;
//!
//! # async fn example() -> poolwarden::error::Result<()> {
//! let mut config = Config::load("poolwarden.toml")?;
//! config.database.application_name = "app-orders-1".to_string();
//! config.scope.application_label = "app-orders-1".to_string();
//! let pool = create_pool(&config.database)?;
//! let warden = Warden::start(
//!     &config,
//!     Arc::new(DeadpoolHandle::new(pool.clone())),
//!     Arc::new(PgSessionStore::new(pool.clone())),
//!     Arc::new(NotifierRegistry::logging()),
//! )
//! .await;
//! // ... serve traffic from `pool` ...
//! warden.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
