//! Backend session port.
//!
//! Termination acts on server-side session identifiers only. Nothing behind
//! this port hands out or manipulates the pool's own connection objects.

use async_trait::async_trait;

use crate::domain::{LabelPattern, ServerSession, StateFilter};
use crate::error::Result;

/// Which server-side sessions belong to this application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionScope {
    /// Database to match; `None` means the connection's current database.
    pub database: Option<String>,
    /// Pattern over `application_name`.
    pub label: LabelPattern,
}

/// Opens raw SQL channels to the backend.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Check out one connection. Dropping the channel returns it.
    async fn open(&self) -> Result<Box<dyn SessionChannel>>;
}

/// One checked-out backend connection.
#[async_trait]
pub trait SessionChannel: Send {
    /// Server pid of this channel's own session.
    async fn backend_pid(&mut self) -> Result<i64>;

    /// Sessions in the current database opened by the current role,
    /// excluding this channel's own session.
    async fn role_sessions(&mut self) -> Result<Vec<ServerSession>>;

    /// Sessions matching `scope` whose state passes `filter`, excluding this
    /// channel's own session.
    async fn app_sessions(
        &mut self,
        scope: &SessionScope,
        filter: StateFilter,
    ) -> Result<Vec<ServerSession>>;

    /// Ask the server to terminate session `pid`. `Ok(false)` means the
    /// server refused or the session was already gone.
    async fn terminate(&mut self, pid: i64) -> Result<bool>;
}
