//! Startup reaper.
//!
//! A crashed or force-killed predecessor can leave server sessions behind
//! that nothing will ever return. Before the pool starts serving, the reaper
//! opens one connection and terminates every other session the same role
//! holds in the same database.
//!
//! The pass is best-effort. No failure here ever blocks startup.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::reader::{bounded, PoolSnapshotReader};
use crate::domain::Alert;
use crate::error::Result;
use crate::port::{Notifier, SessionStore};

/// Result of one reaper pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReapOutcome {
    /// Sessions of this role found at startup.
    pub found: usize,
    /// Sessions the server confirmed it terminated.
    pub terminated: usize,
}

pub struct StartupReaper {
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
    pool: Option<PoolSnapshotReader>,
    query_timeout: Duration,
    settle_delay: Duration,
}

impl StartupReaper {
    pub fn new(
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
        query_timeout: Duration,
        settle_delay: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            pool: None,
            query_timeout,
            settle_delay,
        }
    }

    /// Log the pool's counters at debug level after the pass.
    pub fn with_pool(mut self, pool: PoolSnapshotReader) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Run the pass once. Every error is logged and swallowed; `None` means
    /// the pass could not complete.
    pub async fn run(&self) -> Option<ReapOutcome> {
        match self.reap().await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(error = %e, "Startup reaper failed, continuing startup");
                None
            }
        }
    }

    async fn reap(&self) -> Result<ReapOutcome> {
        let mut channel = bounded("reaper connect", self.query_timeout, self.store.open()).await?;
        let own_pid = bounded("reaper connect", self.query_timeout, channel.backend_pid()).await?;
        debug!(own_pid, "Startup reaper connected");

        let stale = bounded(
            "reaper session scan",
            self.query_timeout,
            channel.role_sessions(),
        )
        .await?;

        if stale.is_empty() {
            info!("Startup reaper found no stale sessions, nothing to do");
            return Ok(ReapOutcome {
                found: 0,
                terminated: 0,
            });
        }

        let found = stale.len();
        let mut terminated = 0;
        for session in &stale {
            match bounded(
                "reaper terminate",
                self.query_timeout,
                channel.terminate(session.pid),
            )
            .await
            {
                Ok(true) => terminated += 1,
                Ok(false) => debug!(pid = session.pid, "Session already gone"),
                Err(e) => warn!(pid = session.pid, error = %e, "Failed to terminate stale session"),
            }
        }
        drop(channel);

        info!(found, terminated, "Startup reaper terminated stale sessions");

        // Give the server a moment to tear the terminated backends down.
        tokio::time::sleep(self.settle_delay).await;

        if let Some(pool) = &self.pool {
            if let Ok(snapshot) = pool.read() {
                debug!(
                    active = snapshot.active,
                    idle = snapshot.idle,
                    total = snapshot.total,
                    "Pool after startup reap"
                );
            }
        }

        self.notifier
            .notify(&Alert::ReaperFinished { found, terminated });
        Ok(ReapOutcome { found, terminated })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::notifier::RecordingNotifier;
    use crate::testkit::session::{FakeSession, InMemorySessionStore};

    fn reaper(store: &InMemorySessionStore, notifier: &RecordingNotifier) -> StartupReaper {
        StartupReaper::new(
            Arc::new(store.clone()),
            Arc::new(notifier.clone()),
            Duration::from_secs(5),
            Duration::from_millis(500),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn terminates_every_session_of_the_role() {
        let store = InMemorySessionStore::new();
        store.add(FakeSession::idle(11, "app-orders", 900));
        store.add(FakeSession::active(12, "app-orders", 3));
        store.add(FakeSession::idle(13, "psql", 10));
        store.add(FakeSession::idle(14, "app-orders", 900).with_role("admin"));
        let notifier = RecordingNotifier::new();

        let outcome = reaper(&store, &notifier).run().await.unwrap();

        assert_eq!(outcome, ReapOutcome { found: 3, terminated: 3 });
        assert_eq!(store.pids(), vec![14]);
        assert_eq!(store.opened(), 1);
        assert_eq!(notifier.names(), vec!["reaper_finished"]);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_scan_returns_without_settle_delay() {
        let store = InMemorySessionStore::new();
        let notifier = RecordingNotifier::new();
        let started = tokio::time::Instant::now();

        let outcome = reaper(&store, &notifier).run().await.unwrap();

        assert_eq!(outcome.found, 0);
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert!(notifier.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn waits_settle_delay_after_terminating() {
        let store = InMemorySessionStore::new();
        store.add(FakeSession::idle(11, "app-orders", 900));
        let started = tokio::time::Instant::now();

        reaper(&store, &RecordingNotifier::new()).run().await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_terminations_are_tolerated() {
        let store = InMemorySessionStore::new();
        store.add(FakeSession::idle(11, "app-orders", 900));
        store.add(FakeSession::idle(12, "app-orders", 900));
        store.add(FakeSession::idle(13, "app-orders", 900));
        store.fail_termination(11);
        store.refuse_termination(12);

        let outcome = reaper(&store, &RecordingNotifier::new()).run().await.unwrap();

        assert_eq!(outcome, ReapOutcome { found: 3, terminated: 1 });
        assert_eq!(store.termination_attempts(), vec![11, 12, 13]);
    }

    #[tokio::test]
    async fn unreachable_backend_is_swallowed() {
        let store = InMemorySessionStore::new();
        store.set_unreachable(true);
        let notifier = RecordingNotifier::new();

        assert!(reaper(&store, &notifier).run().await.is_none());
        assert!(notifier.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_scan_times_out() {
        let store = InMemorySessionStore::new();
        store.add(FakeSession::idle(11, "app-orders", 900));
        store.set_query_delay(Duration::from_secs(60));

        assert!(reaper(&store, &RecordingNotifier::new()).run().await.is_none());
        assert_eq!(store.pids(), vec![11]);
    }
}
