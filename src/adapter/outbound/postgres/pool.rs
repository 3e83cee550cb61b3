//! PostgreSQL connection pool construction, counter reads and idle
//! reclamation.

use std::time::Duration;

use deadpool_postgres::{ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;

use crate::domain::PoolCounters;
use crate::error::{Error, Result};
use crate::infrastructure::config::database::DatabaseConfig;
use crate::port::{IdleReclaimer, PoolStatsSource};

/// Build the monitored pool.
///
/// No connection is opened here; deadpool connects lazily on first checkout.
/// Every connection carries `application_name` so the backend's activity view
/// can attribute it to this application.
///
/// # Errors
///
/// Returns an error if the configuration cannot be turned into a pool.
pub fn create_pool(config: &DatabaseConfig) -> Result<Pool> {
    let mut cfg = deadpool_postgres::Config::new();
    cfg.host = Some(config.host.clone());
    cfg.port = Some(config.port);
    cfg.dbname = Some(config.dbname.clone());
    cfg.user = Some(config.user.clone());
    cfg.password = config.password.clone();
    cfg.application_name = Some(config.application_name.clone());
    cfg.connect_timeout = Some(config.connect_timeout());
    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });
    cfg.pool = Some(PoolConfig::new(config.max_size as usize));

    let builder = cfg
        .builder(NoTls)
        .map_err(|e| Error::PoolBuild(e.to_string()))?
        .runtime(Runtime::Tokio1);

    #[cfg(feature = "creation-trace")]
    let builder = builder.post_create(super::trace::creation_hook(config.creation_trace_sample));

    builder.build().map_err(|e| Error::PoolBuild(e.to_string()))
}

/// The monitored pool seen through the pool ports.
///
/// deadpool reports `size` (open connections) and `available` (idle in the
/// pool); anything open but not available is checked out. deadpool never
/// closes idle connections on its own, so reclamation goes through
/// `Pool::retain`, which only visits connections sitting in the pool.
#[derive(Clone)]
pub struct DeadpoolHandle {
    pool: Pool,
}

impl DeadpoolHandle {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

impl PoolStatsSource for DeadpoolHandle {
    fn counters(&self) -> Result<PoolCounters> {
        let status = self.pool.status();
        Ok(PoolCounters {
            active: saturating_u32(status.size.saturating_sub(status.available)),
            idle: saturating_u32(status.available),
            total: saturating_u32(status.size),
            threads_awaiting: saturating_u32(status.waiting),
            max_size: saturating_u32(status.max_size),
        })
    }
}

impl IdleReclaimer for DeadpoolHandle {
    fn reclaim_idle(&self, max_idle: Duration) -> usize {
        self.pool
            .retain(|_, metrics| metrics.last_used() < max_idle)
            .removed
            .len()
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
