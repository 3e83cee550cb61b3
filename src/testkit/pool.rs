//! Scripted pool counters.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::domain::PoolCounters;
use crate::error::{Error, Result};
use crate::port::{IdleReclaimer, PoolStatsSource};
use crate::testkit::session::InMemorySessionStore;

#[derive(Default)]
struct Inner {
    current: PoolCounters,
    queued: VecDeque<PoolCounters>,
    failures: VecDeque<String>,
    owned: Option<(InMemorySessionStore, Vec<i64>)>,
    reclaimed: Vec<i64>,
}

/// A [`PoolStatsSource`] whose answers are set by the test.
///
/// Reads pop queued failures first, then queued counters, then fall back to
/// the current value. Clones share state.
///
/// Reclamation only sees connections handed over with
/// [`own`](Self::own); without them it closes nothing.
#[derive(Clone, Default)]
pub struct ScriptedPool {
    inner: Arc<Mutex<Inner>>,
}

impl ScriptedPool {
    pub fn fixed(counters: PoolCounters) -> Self {
        let pool = Self::default();
        pool.set(counters);
        pool
    }

    /// Counters with no waiters.
    pub fn counters(active: u32, idle: u32, total: u32, max_size: u32) -> PoolCounters {
        PoolCounters {
            active,
            idle,
            total,
            threads_awaiting: 0,
            max_size,
        }
    }

    pub fn set(&self, counters: PoolCounters) {
        self.inner.lock().current = counters;
    }

    /// Serve `counters` on successive reads before falling back to the
    /// current value; the last one served becomes current.
    pub fn queue(&self, counters: impl IntoIterator<Item = PoolCounters>) {
        self.inner.lock().queued.extend(counters);
    }

    pub fn fail_next(&self, reason: &str) {
        self.inner.lock().failures.push_back(reason.to_string());
    }

    /// Treat `pids` in `store` as this pool's idle connections, so
    /// reclamation closes them on the server and drops them from the counts.
    pub fn own(&self, store: &InMemorySessionStore, pids: impl IntoIterator<Item = i64>) {
        self.inner.lock().owned = Some((store.clone(), pids.into_iter().collect()));
    }

    /// Pids closed by reclamation, in order.
    pub fn reclaimed(&self) -> Vec<i64> {
        self.inner.lock().reclaimed.clone()
    }
}

impl PoolStatsSource for ScriptedPool {
    fn counters(&self) -> Result<PoolCounters> {
        let mut inner = self.inner.lock();
        if let Some(reason) = inner.failures.pop_front() {
            return Err(Error::Other(reason));
        }
        if let Some(next) = inner.queued.pop_front() {
            inner.current = next;
        }
        Ok(inner.current)
    }
}

impl IdleReclaimer for ScriptedPool {
    fn reclaim_idle(&self, max_idle: Duration) -> usize {
        let mut inner = self.inner.lock();
        let Some((store, pids)) = inner.owned.take() else {
            return 0;
        };
        let (closed, kept): (Vec<i64>, Vec<i64>) = pids
            .into_iter()
            .partition(|pid| store.close_idle(*pid, max_idle));

        let n = u32::try_from(closed.len()).unwrap_or(u32::MAX);
        inner.current.idle = inner.current.idle.saturating_sub(n);
        inner.current.total = inner.current.total.saturating_sub(n);
        inner.reclaimed.extend(&closed);
        inner.owned = Some((store, kept));
        closed.len()
    }
}
