//! Configuration validation command.

use std::path::Path;

use crate::cli::output;
use crate::error::{Error, Result};
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::orchestration::{health_check, HealthStatus};

/// Validate configuration file without touching the database.
pub fn execute_config<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    println!("Checking configuration: {}", path.display());
    println!();

    let config = Config::load(path)?;
    output::ok("Configuration file is valid");

    output::section("Summary");
    output::key_value(
        "Database",
        format!(
            "{}@{}:{}/{}",
            config.database.user, config.database.host, config.database.port, config.database.dbname
        ),
    );
    output::key_value("Pool max size", config.database.max_size);
    output::key_value("Session label", &config.scope.application_label);
    output::key_value("Monitor interval", format!("{}s", config.monitor.interval_secs));
    output::key_value(
        "Eviction threshold",
        format!("{}s", config.eviction_threshold().as_secs()),
    );
    output::key_value("Evictor", if config.evictor.enabled { "enabled" } else { "disabled" });
    output::key_value("Startup reaper", if config.reaper.enabled { "enabled" } else { "disabled" });

    let report = health_check(&config);
    output::section("Health check");
    for check in report.checks() {
        let critical = if check.critical() { " (critical)" } else { "" };
        match check.status() {
            HealthStatus::Healthy => output::ok(&format!("{}{critical}", check.name())),
            HealthStatus::Unhealthy(reason) => {
                output::warn(&format!("{}{critical}: {reason}", check.name()));
            }
        }
    }
    println!();

    if !report.is_healthy() {
        output::error("Health check failed");
        return Err(Error::Other("health check failed".to_string()));
    }
    output::ok("Configuration is ready to use");
    Ok(())
}
