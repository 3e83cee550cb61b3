//! Standalone process runtime.
//!
//! The binary is not the application: the pool it builds carries no traffic
//! and owns none of the application's sessions. It therefore only watches;
//! reconciliation runs inside the application through [`Warden::start`].

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use super::warden::Warden;
use crate::adapter::outbound::postgres::{create_pool, PgSessionStore};
use crate::application::{
    ReapOutcome, ServerSessionReader, SessionSummary, SessionWatch, StartupReaper,
};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::NotifierRegistry;

impl Warden {
    /// Watch until ctrl-c.
    pub async fn run(config: Config) -> Result<()> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received");
                shutdown_tx.send_replace(true);
            }
        });
        run_with_shutdown(config, shutdown_rx).await
    }

    /// Watch with an externally controlled shutdown signal.
    pub async fn run_with_shutdown(config: Config, shutdown: watch::Receiver<bool>) -> Result<()> {
        run_with_shutdown(config, shutdown).await
    }
}

/// Runtime entrypoint used by [`Warden::run`].
pub async fn run_with_shutdown(config: Config, mut shutdown: watch::Receiver<bool>) -> Result<()> {
    info!(
        host = %config.database.host,
        dbname = %config.database.dbname,
        "Starting poolwarden"
    );

    let pool = create_pool(&config.database)?;
    let warden = Warden::watch(&config, Arc::new(PgSessionStore::new(pool.clone())));

    loop {
        match shutdown.changed().await {
            Ok(()) if *shutdown.borrow() => {
                info!("Shutdown signal received");
                break;
            }
            Ok(()) => {}
            Err(_) => {
                info!("Shutdown channel closed");
                break;
            }
        }
    }

    warden.shutdown().await;
    pool.close();
    Ok(())
}

/// Run only the startup reaper against the configured database.
///
/// Terminates every session of the configured role, so it must only run
/// while no instance of the application is serving.
pub async fn reap_once(config: &Config) -> Result<Option<ReapOutcome>> {
    let pool = create_pool(&config.database)?;
    let outcome = StartupReaper::new(
        Arc::new(PgSessionStore::new(pool.clone())),
        Arc::new(NotifierRegistry::logging()),
        config.scope.query_timeout(),
        config.reaper.settle_delay(),
    )
    .run()
    .await;
    pool.close();
    Ok(outcome)
}

/// Query the backend once and summarize what an embedded evictor would see.
pub async fn status(config: &Config) -> Result<SessionSummary> {
    let pool = create_pool(&config.database)?;
    let reader = ServerSessionReader::new(
        Arc::new(PgSessionStore::new(pool.clone())),
        config.scope.session_scope(),
        config.scope.query_timeout(),
    );
    let summary = SessionWatch::new(reader, config.eviction_threshold())
        .summarize()
        .await;
    pool.close();
    Ok(summary?)
}
