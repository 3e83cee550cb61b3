//! End-to-end reconciliation against the in-memory backend.

use std::sync::Arc;
use std::time::Duration;

use poolwarden::application::{
    EvictionOutcome, EvictionPolicy, PoolSnapshotReader, ReconciliationEvictor,
    ServerSessionReader,
};
use poolwarden::domain::{Alert, PoolCounters};
use poolwarden::port::PeriodicTask;
use poolwarden::testkit::config::scope;
use poolwarden::testkit::notifier::RecordingNotifier;
use poolwarden::testkit::pool::ScriptedPool;
use poolwarden::testkit::session::{FakeSession, InMemorySessionStore};

fn evictor(
    pool: &ScriptedPool,
    store: &InMemorySessionStore,
    notifier: &RecordingNotifier,
) -> ReconciliationEvictor {
    let policy = EvictionPolicy {
        threshold: Duration::from_secs(180 + 60),
        ..EvictionPolicy::default()
    };
    ReconciliationEvictor::new(
        PoolSnapshotReader::new(Arc::new(pool.clone())),
        ServerSessionReader::new(Arc::new(store.clone()), scope("app-*"), policy.query_timeout),
        Arc::new(store.clone()),
        Arc::new(notifier.clone()),
        policy,
    )
}

/// Pool total 8, server reports 10 idle "app-*" sessions of which 2 are past
/// idle timeout + safety margin.
fn drifted_backend() -> (ScriptedPool, InMemorySessionStore) {
    let pool = ScriptedPool::fixed(PoolCounters {
        active: 0,
        idle: 8,
        total: 8,
        threads_awaiting: 0,
        max_size: 20,
    });
    let store = InMemorySessionStore::new();
    for pid in 1..=8 {
        store.add(FakeSession::idle(pid, "app-api", 20 * pid as u64));
    }
    store.add(FakeSession::idle(9, "app-api", 600));
    store.add(FakeSession::idle(10, "app-worker", 1_800));
    // Outside the label scope; never counted or touched.
    store.add(FakeSession::idle(11, "reporting", 3_600));
    (pool, store)
}

#[tokio::test]
async fn three_passes_terminate_exactly_the_two_abandoned_sessions() {
    let (pool, store) = drifted_backend();
    let notifier = RecordingNotifier::new();
    let mut evictor = evictor(&pool, &store, &notifier);

    let first = evictor.run_pass().await.unwrap();
    match first {
        EvictionOutcome::Reconciled {
            drift_before,
            drift_after,
            terminated,
            failed,
            ..
        } => {
            assert_eq!((drift_before.pool_total, drift_before.server_total), (8, 10));
            assert_eq!(drift_before.delta, 2);
            assert_eq!((drift_after.pool_total, drift_after.server_total), (8, 8));
            assert_eq!(drift_after.delta, 0);
            assert_eq!((terminated, failed), (2, 0));
        }
        other => panic!("first pass should reconcile, got {other:?}"),
    }

    for _ in 0..2 {
        store.advance(Duration::from_secs(120));
        let outcome = evictor.run_pass().await.unwrap();
        assert!(
            matches!(outcome, EvictionOutcome::InSync { drift, .. } if drift.delta == 0),
            "later passes must not act, got {outcome:?}"
        );
    }

    assert_eq!(store.termination_attempts(), vec![10, 9]);
    assert!(store.pids().contains(&11));

    let alerts = notifier.alerts();
    assert_eq!(alerts.len(), 1);
    assert!(matches!(
        alerts[0],
        Alert::DriftReconciled {
            drift_before: 2,
            drift_after: 0,
            terminated: 2,
            ..
        }
    ));
    assert!(alerts[0].to_string().contains("drift 2 -> 0"));
}

#[tokio::test]
async fn scheduled_cycles_swallow_backend_outages() {
    let (pool, store) = drifted_backend();
    let notifier = RecordingNotifier::new();
    let mut evictor = evictor(&pool, &store, &notifier);

    store.set_unreachable(true);
    evictor.run_cycle().await;
    assert_eq!(notifier.names(), vec!["task_failed"]);
    assert!(store.termination_attempts().is_empty());

    store.set_unreachable(false);
    evictor.run_cycle().await;
    assert_eq!(store.terminated(), vec![10, 9]);
}

#[tokio::test]
async fn pool_that_knows_every_session_is_never_touched() {
    let (pool, store) = drifted_backend();
    pool.set(PoolCounters {
        active: 2,
        idle: 8,
        total: 10,
        threads_awaiting: 0,
        max_size: 20,
    });
    let notifier = RecordingNotifier::new();
    let mut evictor = evictor(&pool, &store, &notifier);

    for _ in 0..3 {
        evictor.run_pass().await.unwrap();
    }

    assert!(store.termination_attempts().is_empty());
    assert!(notifier.is_empty());
}
