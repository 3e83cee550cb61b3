//! Session enumeration and termination over `pg_stat_activity`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::{Object, Pool};
use tokio_postgres::Row;

use crate::domain::{ServerSession, SessionState, StateFilter};
use crate::error::{Error, Result};
use crate::port::{SessionChannel, SessionScope, SessionStore};

const SESSION_COLUMNS: &str = "pid::bigint AS pid, \
     host(client_addr) AS client_addr, \
     state, \
     query_start, \
     state_change, \
     EXTRACT(EPOCH FROM (now() - state_change))::float8 AS in_state_secs";

/// Checks out connections from the monitored pool itself, so every query
/// competes for the same slots as request traffic. Callers hold a channel
/// only for as long as they need it.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: Pool,
}

impl PgSessionStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn open(&self) -> Result<Box<dyn SessionChannel>> {
        let client = self.pool.get().await?;
        Ok(Box::new(PgSessionChannel { client }))
    }
}

struct PgSessionChannel {
    client: Object,
}

#[async_trait]
impl SessionChannel for PgSessionChannel {
    async fn backend_pid(&mut self) -> Result<i64> {
        let row = self
            .client
            .query_one("SELECT pg_backend_pid()::bigint", &[])
            .await?;
        Ok(row.try_get(0)?)
    }

    async fn role_sessions(&mut self) -> Result<Vec<ServerSession>> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM pg_stat_activity \
             WHERE datname = current_database() \
               AND usename = current_user \
               AND pid <> pg_backend_pid()"
        );
        let rows = self.client.query(sql.as_str(), &[]).await?;
        rows.iter().map(session_from_row).collect()
    }

    async fn app_sessions(
        &mut self,
        scope: &SessionScope,
        filter: StateFilter,
    ) -> Result<Vec<ServerSession>> {
        let state_clause = match filter {
            StateFilter::Idle => "state = 'idle'",
            StateFilter::Busy => "state IS DISTINCT FROM 'idle'",
        };
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM pg_stat_activity \
             WHERE datname = COALESCE($1::text, current_database()) \
               AND usename = current_user \
               AND application_name LIKE $2::text ESCAPE '\\' \
               AND pid <> pg_backend_pid() \
               AND {state_clause}"
        );
        let like = scope.label.to_like();
        let rows = self
            .client
            .query(sql.as_str(), &[&scope.database, &like])
            .await?;
        rows.iter().map(session_from_row).collect()
    }

    async fn terminate(&mut self, pid: i64) -> Result<bool> {
        let pid = i32::try_from(pid)
            .map_err(|_| Error::Other(format!("pid {pid} out of range for a backend pid")))?;
        let row = self
            .client
            .query_one("SELECT pg_terminate_backend($1::int)", &[&pid])
            .await?;
        let terminated: Option<bool> = row.try_get(0)?;
        Ok(terminated.unwrap_or(false))
    }
}

fn session_from_row(row: &Row) -> Result<ServerSession> {
    let state: Option<String> = row.try_get("state")?;
    let in_state_secs: Option<f64> = row.try_get("in_state_secs")?;
    Ok(ServerSession {
        pid: row.try_get("pid")?,
        client_addr: row.try_get("client_addr")?,
        state: SessionState::parse(state.as_deref()),
        query_start: row.try_get::<_, Option<DateTime<Utc>>>("query_start")?,
        state_changed_at: row.try_get::<_, Option<DateTime<Utc>>>("state_change")?,
        in_state_for: in_state_secs.map(secs_to_duration),
    })
}

/// Server clocks can put `state_change` marginally in the future.
fn secs_to_duration(secs: f64) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::from_secs_f64(secs)
    } else {
        Duration::ZERO
    }
}
