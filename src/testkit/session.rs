//! In-memory backend session table.
//!
//! Mirrors the slice of `pg_stat_activity` the reconciler reads: sessions
//! carry a database, a role, an `application_name`, a state and how long they
//! have been in it. Every [`open`](SessionStore::open) hands out a channel
//! with a fresh backend pid that is excluded from its own queries, like a
//! real checked-out connection.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{ServerSession, SessionState, StateFilter};
use crate::error::{Error, Result};
use crate::port::{SessionChannel, SessionScope, SessionStore};

/// Database and role every [`FakeSession`] and channel defaults to.
pub const CURRENT_DATABASE: &str = "app";
pub const CURRENT_ROLE: &str = "app";

/// First pid handed to an opened channel. Kept far away from test pids.
const CHANNEL_PID_BASE: i64 = 90_000;

// ----------------------------------------------------------------------------
// FakeSession
// ----------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FakeSession {
    pub pid: i64,
    pub database: String,
    pub role: String,
    pub application_name: String,
    pub state: SessionState,
    pub in_state_for: Duration,
}

impl FakeSession {
    pub fn idle(pid: i64, application_name: &str, idle_secs: u64) -> Self {
        Self::new(pid, application_name, SessionState::Idle, idle_secs)
    }

    pub fn active(pid: i64, application_name: &str, secs: u64) -> Self {
        Self::new(pid, application_name, SessionState::Active, secs)
    }

    pub fn idle_in_transaction(pid: i64, application_name: &str, secs: u64) -> Self {
        Self::new(pid, application_name, SessionState::IdleInTransaction, secs)
    }

    fn new(pid: i64, application_name: &str, state: SessionState, secs: u64) -> Self {
        Self {
            pid,
            database: CURRENT_DATABASE.to_string(),
            role: CURRENT_ROLE.to_string(),
            application_name: application_name.to_string(),
            state,
            in_state_for: Duration::from_secs(secs),
        }
    }

    pub fn in_database(mut self, database: &str) -> Self {
        self.database = database.to_string();
        self
    }

    pub fn with_role(mut self, role: &str) -> Self {
        self.role = role.to_string();
        self
    }

    fn to_server_session(&self) -> ServerSession {
        ServerSession {
            pid: self.pid,
            client_addr: Some("127.0.0.1".to_string()),
            state: self.state,
            query_start: None,
            state_changed_at: None,
            in_state_for: Some(self.in_state_for),
        }
    }
}

// ----------------------------------------------------------------------------
// InMemorySessionStore
// ----------------------------------------------------------------------------

#[derive(Default)]
struct Table {
    sessions: Vec<FakeSession>,
    unreachable: bool,
    query_delay: Duration,
    refusing: HashSet<i64>,
    failing: HashSet<i64>,
    terminated: Vec<i64>,
    attempts: Vec<i64>,
    opened: i64,
}

/// Shared fake backend. Clones see the same table, so a test can keep one
/// handle after moving another into an `Arc<dyn SessionStore>`.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    table: Arc<Mutex<Table>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, session: FakeSession) {
        self.table.lock().sessions.push(session);
    }

    /// Make `open` fail as if the server refused connections.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.table.lock().unreachable = unreachable;
    }

    /// Delay every query by `delay` before answering.
    pub fn set_query_delay(&self, delay: Duration) {
        self.table.lock().query_delay = delay;
    }

    /// Termination of `pid` answers `Ok(false)` and leaves it in place.
    pub fn refuse_termination(&self, pid: i64) {
        self.table.lock().refusing.insert(pid);
    }

    /// Termination of `pid` fails with an error and leaves it in place.
    pub fn fail_termination(&self, pid: i64) {
        self.table.lock().failing.insert(pid);
    }

    /// Age every session by `by`.
    pub fn advance(&self, by: Duration) {
        for session in &mut self.table.lock().sessions {
            session.in_state_for += by;
        }
    }

    /// Close `pid` from the client side if it has been idle for at least
    /// `max_idle`. Not recorded as a termination.
    pub fn close_idle(&self, pid: i64, max_idle: Duration) -> bool {
        let mut table = self.table.lock();
        let before = table.sessions.len();
        table.sessions.retain(|s| {
            s.pid != pid || s.state != SessionState::Idle || s.in_state_for < max_idle
        });
        table.sessions.len() < before
    }

    /// Pids successfully terminated, in order.
    pub fn terminated(&self) -> Vec<i64> {
        self.table.lock().terminated.clone()
    }

    /// Every pid a termination was attempted on, in order.
    pub fn termination_attempts(&self) -> Vec<i64> {
        self.table.lock().attempts.clone()
    }

    pub fn pids(&self) -> Vec<i64> {
        self.table.lock().sessions.iter().map(|s| s.pid).collect()
    }

    pub fn len(&self) -> usize {
        self.table.lock().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.lock().sessions.is_empty()
    }

    /// Number of channels opened so far.
    pub fn opened(&self) -> usize {
        usize::try_from(self.table.lock().opened).unwrap_or(usize::MAX)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn open(&self) -> Result<Box<dyn SessionChannel>> {
        let pid = {
            let mut table = self.table.lock();
            if table.unreachable {
                return Err(Error::Other("connection refused".to_string()));
            }
            table.opened += 1;
            CHANNEL_PID_BASE + table.opened
        };
        Ok(Box::new(InMemoryChannel {
            table: Arc::clone(&self.table),
            pid,
        }))
    }
}

struct InMemoryChannel {
    table: Arc<Mutex<Table>>,
    pid: i64,
}

impl InMemoryChannel {
    async fn pause(&self) {
        let delay = self.table.lock().query_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    fn select(&self, keep: impl Fn(&FakeSession) -> bool) -> Vec<ServerSession> {
        self.table
            .lock()
            .sessions
            .iter()
            .filter(|s| s.pid != self.pid && keep(s))
            .map(FakeSession::to_server_session)
            .collect()
    }
}

#[async_trait]
impl SessionChannel for InMemoryChannel {
    async fn backend_pid(&mut self) -> Result<i64> {
        Ok(self.pid)
    }

    async fn role_sessions(&mut self) -> Result<Vec<ServerSession>> {
        self.pause().await;
        Ok(self.select(|s| s.database == CURRENT_DATABASE && s.role == CURRENT_ROLE))
    }

    async fn app_sessions(
        &mut self,
        scope: &SessionScope,
        filter: StateFilter,
    ) -> Result<Vec<ServerSession>> {
        self.pause().await;
        let database = scope.database.as_deref().unwrap_or(CURRENT_DATABASE);
        Ok(self.select(|s| {
            s.database == database
                && s.role == CURRENT_ROLE
                && scope.label.matches(&s.application_name)
                && filter.admits(s.state)
        }))
    }

    async fn terminate(&mut self, pid: i64) -> Result<bool> {
        self.pause().await;
        let mut table = self.table.lock();
        table.attempts.push(pid);
        if table.failing.contains(&pid) {
            return Err(Error::Other(format!("permission denied to terminate {pid}")));
        }
        if table.refusing.contains(&pid) {
            return Ok(false);
        }
        let before = table.sessions.len();
        table.sessions.retain(|s| s.pid != pid);
        let removed = table.sessions.len() < before;
        if removed {
            table.terminated.push(pid);
        }
        Ok(removed)
    }
}
