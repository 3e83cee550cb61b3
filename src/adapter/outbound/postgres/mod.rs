//! PostgreSQL adapter built on deadpool-postgres and tokio-postgres.
//!
//! - [`pool`] - Pool construction, counter reads and idle reclamation
//! - [`session`] - Session enumeration and termination over `pg_stat_activity`

pub mod pool;
pub mod session;

#[cfg(feature = "creation-trace")]
mod trace;

pub use pool::{create_pool, DeadpoolHandle};
pub use session::PgSessionStore;
