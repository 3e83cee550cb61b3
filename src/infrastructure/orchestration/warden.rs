//! Warden wiring: the startup reaper, then the periodic tasks.

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::{
    ActiveDiagnostics, EvictionPolicy, Housekeeper, MonitorThresholds, PeriodicMonitor,
    PoolSnapshotReader, ReapOutcome, ReconciliationEvictor, ServerSessionReader, SessionWatch,
    StartupReaper,
};
use crate::domain::LeakHeuristic;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::scheduler::{Schedule, Scheduler};
use crate::port::{IdleReclaimer, Notifier, PeriodicTask, PoolStatsSource, SessionStore};

/// Entry point for running the reconciler.
///
/// Reconciliation only makes sense inside the process that owns the pool:
/// drift compares the pool's own counters with the sessions carrying its
/// label. [`Warden::start`] is that mode. [`Warden::watch`] is for a process
/// outside the application and never terminates anything.
pub struct Warden;

impl Warden {
    /// Run the startup reaper once (if enabled), then schedule the pool
    /// housekeeper, the monitor, its diagnostics companion and the evictor
    /// (if enabled).
    ///
    /// `pool` must be the pool that opens the sessions matching
    /// `scope.application_label`. Every task gets its own readers over the
    /// shared pool and backend handles and nothing else; they never talk to
    /// each other.
    pub async fn start<P>(
        config: &Config,
        pool: Arc<P>,
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> WardenHandle
    where
        P: PoolStatsSource + IdleReclaimer + 'static,
    {
        let scope = config.scope.session_scope();
        if !scope.label.matches(&config.database.application_name) {
            warn!(
                application_name = %config.database.application_name,
                label = %scope.label,
                "Pool application_name is outside the session label"
            );
        }

        let reclaimer: Arc<dyn IdleReclaimer> = pool.clone();
        let pool = PoolSnapshotReader::new(pool);
        let sessions = ServerSessionReader::new(
            Arc::clone(&store),
            scope,
            config.scope.query_timeout(),
        );

        let reaped = if config.reaper.enabled {
            StartupReaper::new(
                Arc::clone(&store),
                Arc::clone(&notifier),
                config.scope.query_timeout(),
                config.reaper.settle_delay(),
            )
            .with_pool(pool.clone())
            .run()
            .await
        } else {
            info!("Startup reaper disabled");
            None
        };

        let mut scheduler = Scheduler::new();

        scheduler.spawn(
            Housekeeper::new(reclaimer, config.database.idle_timeout()),
            Schedule::every(config.database.housekeeping_interval()),
        );

        scheduler.spawn(
            PeriodicMonitor::new(
                pool.clone(),
                Arc::clone(&notifier),
                monitor_thresholds(config),
                LeakHeuristic::new(config.monitor.leak_min_idle),
            ),
            Schedule::every(config.monitor.interval()),
        );

        scheduler.spawn(
            ActiveDiagnostics::new(pool.clone(), sessions.clone()),
            Schedule::every(config.monitor.diagnostics_interval()),
        );

        if config.evictor.enabled {
            scheduler.spawn(
                ReconciliationEvictor::new(
                    pool,
                    sessions,
                    store,
                    notifier,
                    eviction_policy(config),
                ),
                Schedule::every(config.evictor.interval()).after(config.evictor.initial_delay()),
            );
        } else {
            info!("Reconciliation evictor disabled");
        }

        info!(
            tasks = ?scheduler.task_names(),
            label = %config.scope.application_label,
            eviction_threshold_secs = config.eviction_threshold().as_secs(),
            "Pool warden started"
        );

        WardenHandle { scheduler, reaped }
    }

    /// Schedule only the read-only session watch. No reaper, no evictor.
    pub fn watch(config: &Config, store: Arc<dyn SessionStore>) -> WardenHandle {
        let sessions = ServerSessionReader::new(
            store,
            config.scope.session_scope(),
            config.scope.query_timeout(),
        );

        let mut scheduler = Scheduler::new();
        scheduler.spawn(
            SessionWatch::new(sessions, config.eviction_threshold()),
            Schedule::every(config.monitor.interval()),
        );

        info!(
            label = %config.scope.application_label,
            "Session watch started; reconciliation runs only inside the application"
        );

        WardenHandle {
            scheduler,
            reaped: None,
        }
    }
}

pub(crate) fn monitor_thresholds(config: &Config) -> MonitorThresholds {
    MonitorThresholds {
        utilization_warn_pct: config.monitor.utilization_warn_pct,
        saturation_ratio: config.monitor.saturation_ratio,
    }
}

pub(crate) fn eviction_policy(config: &Config) -> EvictionPolicy {
    EvictionPolicy {
        threshold: config.eviction_threshold(),
        drift_threshold: config.evictor.drift_threshold,
        nearing_capacity_ratio: config.evictor.nearing_capacity_ratio,
        query_timeout: config.scope.query_timeout(),
    }
}

/// Running warden. Dropping it aborts every scheduled task.
pub struct WardenHandle {
    scheduler: Scheduler,
    reaped: Option<ReapOutcome>,
}

impl WardenHandle {
    /// What the startup reaper did, if it ran and completed.
    pub fn reaped(&self) -> Option<ReapOutcome> {
        self.reaped
    }

    pub fn task_names(&self) -> Vec<&'static str> {
        self.scheduler.task_names()
    }

    /// Schedule an extra task under the same shutdown signal.
    pub fn spawn<T>(&mut self, task: T, schedule: Schedule)
    where
        T: PeriodicTask + 'static,
    {
        self.scheduler.spawn(task, schedule);
    }

    /// Stop every task after its current cycle.
    pub async fn shutdown(self) {
        self.scheduler.shutdown().await;
        info!("Pool warden stopped");
    }
}
