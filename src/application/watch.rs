//! Read-only view of this application's sessions from outside its process.
//!
//! A process that does not own the application's pool cannot tell its
//! connections from abandoned ones: its own counters say nothing about the
//! sessions it sees. This task therefore only reports what the evictor of
//! an embedded warden would be looking at, and never terminates anything.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use super::reader::ServerSessionReader;
use crate::error::Unavailable;
use crate::port::PeriodicTask;

/// Server-side view of this application's sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub label: String,
    pub idle_sessions: usize,
    pub busy_sessions: usize,
    /// Idle sessions already past the eviction threshold.
    pub past_threshold: usize,
    pub oldest_idle_secs: Option<u64>,
    pub eviction_threshold_secs: u64,
}

pub struct SessionWatch {
    sessions: ServerSessionReader,
    threshold: Duration,
}

impl SessionWatch {
    pub fn new(sessions: ServerSessionReader, threshold: Duration) -> Self {
        Self {
            sessions,
            threshold,
        }
    }

    pub async fn summarize(&self) -> Result<SessionSummary, Unavailable> {
        let idle = self.sessions.idle_sessions().await?;
        let busy = self.sessions.busy_sessions().await?;

        Ok(SessionSummary {
            label: self.sessions.scope().label.to_string(),
            idle_sessions: idle.len(),
            busy_sessions: busy.len(),
            past_threshold: idle
                .iter()
                .filter(|s| s.eviction_candidate(self.threshold).is_some())
                .count(),
            oldest_idle_secs: idle
                .iter()
                .filter_map(|s| s.in_state_for)
                .map(|d| d.as_secs())
                .max(),
            eviction_threshold_secs: self.threshold.as_secs(),
        })
    }
}

#[async_trait]
impl PeriodicTask for SessionWatch {
    fn name(&self) -> &'static str {
        "session-watch"
    }

    async fn run_cycle(&mut self) {
        match self.summarize().await {
            Ok(summary) => info!(
                label = %summary.label,
                idle = summary.idle_sessions,
                busy = summary.busy_sessions,
                past_threshold = summary.past_threshold,
                oldest_idle_secs = ?summary.oldest_idle_secs,
                "Session status"
            ),
            Err(e) => warn!(error = %e, "Session watch skipped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testkit::config::scope;
    use crate::testkit::session::{FakeSession, InMemorySessionStore};

    fn watch(store: &InMemorySessionStore) -> SessionWatch {
        let reader = ServerSessionReader::new(
            Arc::new(store.clone()),
            scope("app-*"),
            Duration::from_secs(1),
        );
        SessionWatch::new(reader, Duration::from_secs(240))
    }

    #[tokio::test]
    async fn summary_counts_sessions_past_threshold() {
        let store = InMemorySessionStore::new();
        store.add(FakeSession::idle(1, "app-a", 100));
        store.add(FakeSession::idle(2, "app-a", 241));
        store.add(FakeSession::idle(3, "app-a", 900));
        store.add(FakeSession::active(4, "app-a", 1));
        store.add(FakeSession::idle(5, "batch", 5_000));

        let summary = watch(&store).summarize().await.unwrap();

        assert_eq!(
            summary,
            SessionSummary {
                label: "app-*".to_string(),
                idle_sessions: 3,
                busy_sessions: 1,
                past_threshold: 2,
                oldest_idle_secs: Some(900),
                eviction_threshold_secs: 240,
            }
        );
    }

    #[tokio::test]
    async fn empty_backend_has_no_oldest_session() {
        let summary = watch(&InMemorySessionStore::new()).summarize().await.unwrap();
        assert_eq!(summary.idle_sessions, 0);
        assert_eq!(summary.oldest_idle_secs, None);
    }

    #[tokio::test]
    async fn cycles_never_terminate_anything() {
        let store = InMemorySessionStore::new();
        store.add(FakeSession::idle(1, "app-a", 5_000));
        let mut task = watch(&store);

        task.run_cycle().await;
        store.set_unreachable(true);
        task.run_cycle().await;

        assert!(store.termination_attempts().is_empty());
        assert_eq!(task.name(), "session-watch");
    }
}
