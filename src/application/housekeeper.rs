//! Pool-side idle-connection reclamation.
//!
//! The evictor's safety window is measured against this task: pooled
//! connections unused for `idle_timeout` are closed here, so anything idle
//! on the server for longer than `idle_timeout + margin` is no longer owned
//! by the pool.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::port::{IdleReclaimer, PeriodicTask};

pub struct Housekeeper {
    pool: Arc<dyn IdleReclaimer>,
    idle_timeout: Duration,
}

impl Housekeeper {
    pub fn new(pool: Arc<dyn IdleReclaimer>, idle_timeout: Duration) -> Self {
        Self { pool, idle_timeout }
    }

    /// Close pooled connections unused for the idle timeout.
    /// Returns how many were closed.
    pub fn sweep(&self) -> usize {
        self.pool.reclaim_idle(self.idle_timeout)
    }
}

#[async_trait]
impl PeriodicTask for Housekeeper {
    fn name(&self) -> &'static str {
        "housekeeper"
    }

    async fn run_cycle(&mut self) {
        let closed = self.sweep();
        if closed > 0 {
            info!(
                closed,
                idle_timeout_secs = self.idle_timeout.as_secs(),
                "Closed idle pooled connections"
            );
        } else {
            debug!("No idle pooled connections past timeout");
        }
    }
}
