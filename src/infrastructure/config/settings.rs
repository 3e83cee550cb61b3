//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings.
//! Configuration is loaded from a TOML file with an environment variable
//! override for the database password (`POOLWARDEN_DATABASE_PASSWORD`).
//!
//! # Example
//!
//! ```no_run
//! use poolwarden::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("poolwarden.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use super::database::DatabaseConfig;
use super::logging::LoggingConfig;
use super::reconcile::{EvictorConfig, MonitorConfig, ReaperConfig, ScopeConfig};
use crate::error::{ConfigError, Result};

/// Environment variable that overrides `database.password`.
pub const PASSWORD_ENV: &str = "POOLWARDEN_DATABASE_PASSWORD";

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`]. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Connection settings and pool limits.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Which server-side sessions belong to this application.
    #[serde(default)]
    pub scope: ScopeConfig,

    /// Periodic monitor and diagnostics settings.
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Reconciliation evictor settings.
    #[serde(default)]
    pub evictor: EvictorConfig,

    /// Startup reaper settings.
    #[serde(default)]
    pub reaper: ReaperConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            config.database.password = Some(password);
        }

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is
    /// malformed, or validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Age an idle server session must exceed before the evictor may
    /// terminate it.
    pub fn eviction_threshold(&self) -> Duration {
        self.database.idle_timeout() + self.evictor.safety_margin()
    }

    /// Shortest period of any scheduled task that issues backend queries.
    fn shortest_period(&self) -> Duration {
        let mut shortest = self
            .monitor
            .interval()
            .min(self.monitor.diagnostics_interval());
        if self.evictor.enabled {
            shortest = shortest.min(self.evictor.interval());
        }
        shortest
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        let invalid = |field: &'static str, reason: &str| -> crate::error::Error {
            ConfigError::InvalidValue {
                field,
                reason: reason.to_string(),
            }
            .into()
        };

        if self.database.host.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "host" }.into());
        }
        if self.database.dbname.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "dbname" }.into());
        }
        if self.database.user.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "user" }.into());
        }
        if self.database.max_size == 0 {
            return Err(invalid("max_size", "must be > 0"));
        }
        if self.database.idle_timeout_secs == 0 {
            return Err(invalid("idle_timeout_secs", "must be > 0"));
        }
        if self.database.housekeeping_interval_secs == 0 {
            return Err(invalid("housekeeping_interval_secs", "must be > 0"));
        }

        if self.scope.application_label.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "application_label",
            }
            .into());
        }
        if self.scope.query_timeout_ms == 0 {
            return Err(invalid("query_timeout_ms", "must be > 0"));
        }

        if self.monitor.interval_secs == 0 {
            return Err(invalid("monitor.interval_secs", "must be > 0"));
        }
        if self.monitor.diagnostics_interval_secs == 0 {
            return Err(invalid("diagnostics_interval_secs", "must be > 0"));
        }
        if !(self.monitor.utilization_warn_pct > 0.0 && self.monitor.utilization_warn_pct <= 100.0)
        {
            return Err(invalid("utilization_warn_pct", "must be in (0, 100]"));
        }
        if self.monitor.leak_min_idle == 0 {
            return Err(invalid("leak_min_idle", "must be >= 1"));
        }
        if !(self.monitor.saturation_ratio > 0.0 && self.monitor.saturation_ratio <= 1.0) {
            return Err(invalid("saturation_ratio", "must be in (0, 1]"));
        }

        if self.evictor.enabled {
            if self.evictor.interval_secs == 0 {
                return Err(invalid("evictor.interval_secs", "must be > 0"));
            }
            if self.evictor.interval_secs <= self.monitor.interval_secs {
                return Err(invalid(
                    "evictor.interval_secs",
                    "must be > monitor.interval_secs",
                ));
            }
            if !(self.evictor.nearing_capacity_ratio > 0.0
                && self.evictor.nearing_capacity_ratio <= 1.0)
            {
                return Err(invalid("nearing_capacity_ratio", "must be in (0, 1]"));
            }
        }

        if self.scope.query_timeout() >= self.shortest_period() {
            return Err(invalid(
                "query_timeout_ms",
                "must be shorter than every task interval",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn rejects(toml: &str, field: &str) {
        match Config::parse_toml(toml) {
            Err(Error::Config(ConfigError::InvalidValue { field: f, .. }))
            | Err(Error::Config(ConfigError::MissingField { field: f })) => {
                assert_eq!(f, field, "wrong field rejected for:\n{toml}")
            }
            other => panic!("expected {field} to be rejected, got {other:?}"),
        }
    }

    #[test]
    fn empty_file_yields_reference_values() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config.monitor.interval_secs, 30);
        assert_eq!(config.monitor.diagnostics_interval_secs, 60);
        assert_eq!(config.evictor.interval_secs, 120);
        assert_eq!(config.evictor.initial_delay_secs, 60);
        assert_eq!(config.database.idle_timeout_secs, 180);
        assert_eq!(config.reaper.settle_delay_ms, 500);
        assert_eq!(config.scope.application_label, "app-*");
        assert_eq!(config.eviction_threshold(), Duration::from_secs(240));
    }

    #[test]
    fn parses_all_sections() {
        let toml = r#"
            [logging]
            level = "debug"
            format = "json"

            [database]
            host = "db.internal"
            port = 6432
            dbname = "orders"
            user = "orders_app"
            application_name = "orders-api-1"
            max_size = 40
            idle_timeout_secs = 300

            [scope]
            database = "orders"
            application_label = "orders-*"
            query_timeout_ms = 2000

            [monitor]
            interval_secs = 15
            utilization_warn_pct = 75.0

            [evictor]
            interval_secs = 90
            safety_margin_secs = 30
            drift_threshold = 2

            [reaper]
            enabled = false
        "#;

        let config = Config::parse_toml(toml).unwrap();
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.database.port, 6432);
        assert_eq!(config.database.max_size, 40);
        assert_eq!(config.scope.database.as_deref(), Some("orders"));
        assert_eq!(config.monitor.interval_secs, 15);
        assert_eq!(config.evictor.drift_threshold, 2);
        assert!(!config.reaper.enabled);
        assert_eq!(config.eviction_threshold(), Duration::from_secs(330));

        let scope = config.scope.session_scope();
        assert_eq!(scope.label.to_like(), "orders-%");
    }

    #[test]
    fn rejects_zero_max_size() {
        rejects("[database]\nmax_size = 0", "max_size");
    }

    #[test]
    fn rejects_zero_leak_floor() {
        rejects("[monitor]\nleak_min_idle = 0", "leak_min_idle");
    }

    #[test]
    fn rejects_empty_label() {
        rejects("[scope]\napplication_label = \"  \"", "application_label");
    }

    #[test]
    fn rejects_query_timeout_not_shorter_than_period() {
        rejects(
            "[scope]\nquery_timeout_ms = 30000\n[monitor]\ninterval_secs = 30",
            "query_timeout_ms",
        );
    }

    #[test]
    fn rejects_evictor_faster_than_monitor() {
        rejects(
            "[monitor]\ninterval_secs = 60\n[evictor]\ninterval_secs = 60",
            "evictor.interval_secs",
        );
    }

    #[test]
    fn disabled_evictor_skips_its_checks() {
        let config =
            Config::parse_toml("[monitor]\ninterval_secs = 60\n[evictor]\nenabled = false\ninterval_secs = 0")
                .unwrap();
        assert!(!config.evictor.enabled);
    }

    #[test]
    fn rejects_out_of_range_ratios() {
        rejects("[monitor]\nsaturation_ratio = 1.5", "saturation_ratio");
        rejects("[monitor]\nutilization_warn_pct = 0.0", "utilization_warn_pct");
        rejects("[evictor]\nnearing_capacity_ratio = 0.0", "nearing_capacity_ratio");
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            Config::parse_toml("[database\nhost ="),
            Err(Error::Config(ConfigError::Parse(_)))
        ));
    }

    #[test]
    fn load_missing_file_is_read_error() {
        assert!(matches!(
            Config::load("/nonexistent/poolwarden.toml"),
            Err(Error::Config(ConfigError::ReadFile(_)))
        ));
    }
}
