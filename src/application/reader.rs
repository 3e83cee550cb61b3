//! Read-only samplers over the pool and the backend.
//!
//! Neither reader ever propagates a failure. A broken read comes back as
//! [`Unavailable`] so the calling cycle can end early without taking the
//! monitored system down with it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::domain::{PoolSnapshot, ServerSession, StateFilter};
use crate::error::{Error, Result, Unavailable};
use crate::port::{PoolStatsSource, SessionScope, SessionStore};

/// Await `fut`, failing with [`Error::Timeout`] once `timeout` elapses.
pub(crate) async fn bounded<T, F>(operation: &'static str, timeout: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout { operation, timeout }),
    }
}

/// Samples the pool's in-memory counters.
#[derive(Clone)]
pub struct PoolSnapshotReader {
    source: Arc<dyn PoolStatsSource>,
}

impl PoolSnapshotReader {
    pub fn new(source: Arc<dyn PoolStatsSource>) -> Self {
        Self { source }
    }

    pub fn read(&self) -> std::result::Result<PoolSnapshot, Unavailable> {
        self.source
            .counters()
            .map(|counters| PoolSnapshot::from_counters(counters, Utc::now()))
            .map_err(|e| Unavailable::new("pool counters", e.to_string()))
    }
}

/// Queries the backend's activity view for this application's sessions.
///
/// Each read checks out one connection for one query and gives it back, all
/// under a timeout shorter than any task period.
#[derive(Clone)]
pub struct ServerSessionReader {
    store: Arc<dyn SessionStore>,
    scope: SessionScope,
    timeout: Duration,
}

impl ServerSessionReader {
    pub fn new(store: Arc<dyn SessionStore>, scope: SessionScope, timeout: Duration) -> Self {
        Self {
            store,
            scope,
            timeout,
        }
    }

    pub fn scope(&self) -> &SessionScope {
        &self.scope
    }

    /// Idle sessions carrying this application's label.
    pub async fn idle_sessions(&self) -> std::result::Result<Vec<ServerSession>, Unavailable> {
        self.sessions(StateFilter::Idle).await
    }

    /// Sessions carrying this application's label that are doing something.
    pub async fn busy_sessions(&self) -> std::result::Result<Vec<ServerSession>, Unavailable> {
        self.sessions(StateFilter::Busy).await
    }

    async fn sessions(
        &self,
        filter: StateFilter,
    ) -> std::result::Result<Vec<ServerSession>, Unavailable> {
        let query = async {
            let mut channel = self.store.open().await?;
            channel.app_sessions(&self.scope, filter).await
        };
        bounded("session query", self.timeout, query)
            .await
            .map_err(|e| Unavailable::new("server sessions", e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PoolCounters;
    use crate::testkit::pool::ScriptedPool;
    use crate::testkit::session::{FakeSession, InMemorySessionStore};

    fn scope() -> SessionScope {
        crate::testkit::config::scope("app-*")
    }

    #[test]
    fn pool_reader_maps_counters() {
        let pool = ScriptedPool::fixed(PoolCounters {
            active: 3,
            idle: 2,
            total: 5,
            threads_awaiting: 1,
            max_size: 10,
        });
        let snapshot = PoolSnapshotReader::new(Arc::new(pool)).read().unwrap();
        assert_eq!(snapshot.active, 3);
        assert_eq!(snapshot.total, 5);
        assert_eq!(snapshot.threads_awaiting, 1);
    }

    #[test]
    fn pool_reader_failure_is_unavailable() {
        let pool = ScriptedPool::fixed(PoolCounters::default());
        pool.fail_next("pool closed");
        let err = PoolSnapshotReader::new(Arc::new(pool)).read().unwrap_err();
        assert_eq!(err.what, "pool counters");
        assert!(err.reason.contains("pool closed"));
    }

    #[tokio::test]
    async fn idle_read_only_sees_labelled_idle_sessions() {
        let store = InMemorySessionStore::new();
        store.add(FakeSession::idle(101, "app-orders", 30));
        store.add(FakeSession::idle(102, "app-orders", 300));
        store.add(FakeSession::idle(103, "batch-export", 300));
        store.add(FakeSession::active(104, "app-orders", 5));

        let reader = ServerSessionReader::new(Arc::new(store), scope(), Duration::from_secs(1));
        let idle: Vec<i64> = reader
            .idle_sessions()
            .await
            .unwrap()
            .iter()
            .map(|s| s.pid)
            .collect();
        assert_eq!(idle, vec![101, 102]);
        let busy = reader.busy_sessions().await.unwrap();
        assert_eq!(busy.len(), 1);
        assert_eq!(busy[0].pid, 104);
    }

    #[tokio::test]
    async fn unreachable_backend_is_unavailable() {
        let store = InMemorySessionStore::new();
        store.set_unreachable(true);
        let reader = ServerSessionReader::new(Arc::new(store), scope(), Duration::from_secs(1));
        let err = reader.idle_sessions().await.unwrap_err();
        assert_eq!(err.what, "server sessions");
    }

    #[tokio::test(start_paused = true)]
    async fn slow_backend_times_out() {
        let store = InMemorySessionStore::new();
        store.set_query_delay(Duration::from_secs(30));
        let reader =
            ServerSessionReader::new(Arc::new(store), scope(), Duration::from_millis(500));
        let err = reader.idle_sessions().await.unwrap_err();
        assert!(err.reason.contains("timed out after 500ms"), "{err}");
    }
}
