//! Active-connection diagnostics.
//!
//! Companion to the monitor on a slower period. When the pool reports any
//! active connections it lists what the server thinks those sessions are
//! doing. Operator visibility only; nothing here feeds a decision.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::reader::{PoolSnapshotReader, ServerSessionReader};
use crate::domain::{ServerSession, SessionState};
use crate::error::Unavailable;
use crate::port::PeriodicTask;

pub struct ActiveDiagnostics {
    pool: PoolSnapshotReader,
    sessions: ServerSessionReader,
}

impl ActiveDiagnostics {
    pub fn new(pool: PoolSnapshotReader, sessions: ServerSessionReader) -> Self {
        Self { pool, sessions }
    }

    /// Busy server sessions, or `None` when the pool has nothing active and
    /// the backend was not queried.
    pub async fn inspect(&self) -> Result<Option<Vec<ServerSession>>, Unavailable> {
        let snapshot = self.pool.read()?;
        if snapshot.active == 0 {
            return Ok(None);
        }

        let busy = self.sessions.busy_sessions().await?;
        info!(
            pool_active = snapshot.active,
            server_busy = busy.len(),
            "Active connection diagnostics"
        );
        for session in &busy {
            log_session(session);
        }
        Ok(Some(busy))
    }
}

fn log_session(session: &ServerSession) {
    let in_state_secs = session.in_state_for.map(|d| d.as_secs());
    let client = session.client_addr.as_deref().unwrap_or("local");
    match session.state {
        SessionState::IdleInTransaction => warn!(
            pid = session.pid,
            client,
            in_state_secs,
            "Session idle in transaction is holding a connection"
        ),
        _ => info!(
            pid = session.pid,
            state = %session.state,
            client,
            in_state_secs,
            "Busy session"
        ),
    }
}

#[async_trait]
impl PeriodicTask for ActiveDiagnostics {
    fn name(&self) -> &'static str {
        "diagnostics"
    }

    async fn run_cycle(&mut self) {
        match self.inspect().await {
            Ok(None) => debug!("No active connections"),
            Ok(Some(_)) => {}
            Err(e) => warn!(error = %e, "Diagnostics cycle skipped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::testkit::pool::ScriptedPool;
    use crate::testkit::session::{FakeSession, InMemorySessionStore};

    fn diagnostics(pool: &ScriptedPool, store: &InMemorySessionStore) -> ActiveDiagnostics {
        ActiveDiagnostics::new(
            PoolSnapshotReader::new(Arc::new(pool.clone())),
            ServerSessionReader::new(
                Arc::new(store.clone()),
                crate::testkit::config::scope("app-*"),
                Duration::from_secs(1),
            ),
        )
    }

    #[tokio::test]
    async fn idle_pool_skips_the_backend() {
        let pool = ScriptedPool::fixed(ScriptedPool::counters(0, 4, 4, 20));
        let store = InMemorySessionStore::new();

        assert!(diagnostics(&pool, &store).inspect().await.unwrap().is_none());
        assert_eq!(store.opened(), 0);
    }

    #[tokio::test]
    async fn active_pool_lists_busy_sessions() {
        let pool = ScriptedPool::fixed(ScriptedPool::counters(2, 2, 4, 20));
        let store = InMemorySessionStore::new();
        store.add(FakeSession::active(21, "app-api", 2));
        store.add(FakeSession::idle_in_transaction(22, "app-api", 45));
        store.add(FakeSession::idle(23, "app-api", 45));

        let busy = diagnostics(&pool, &store).inspect().await.unwrap().unwrap();

        let pids: Vec<i64> = busy.iter().map(|s| s.pid).collect();
        assert_eq!(pids, vec![21, 22]);
    }

    #[tokio::test]
    async fn unreachable_backend_is_unavailable() {
        let pool = ScriptedPool::fixed(ScriptedPool::counters(1, 0, 1, 20));
        let store = InMemorySessionStore::new();
        store.set_unreachable(true);

        let mut task = diagnostics(&pool, &store);
        assert!(task.inspect().await.is_err());
        task.run_cycle().await;
    }
}
