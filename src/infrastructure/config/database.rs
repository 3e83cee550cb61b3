//! Database connection and pool configuration.

use std::time::Duration;

use serde::Deserialize;

/// Connection settings for the monitored PostgreSQL pool.
///
/// `POOLWARDEN_DATABASE_PASSWORD` overrides `password` when set.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_dbname")]
    pub dbname: String,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default)]
    pub password: Option<String>,
    /// `application_name` set on every connection of a pool built from this
    /// config. An application embedding the warden sets it to a value inside
    /// `scope.application_label`; the default stays outside the default
    /// label so the standalone binary never counts its own connections.
    #[serde(default = "default_application_name")]
    pub application_name: String,
    /// Maximum number of pooled connections.
    #[serde(default = "default_max_size")]
    pub max_size: u32,
    /// Pooled connections unused for longer than this are dropped by the
    /// housekeeper.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// Interval of the housekeeper's idle sweep.
    #[serde(default = "default_housekeeping_interval_secs")]
    pub housekeeping_interval_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// With the `creation-trace` feature, capture a backtrace for one in
    /// every N new connections. Zero disables sampling.
    #[serde(default = "default_creation_trace_sample")]
    pub creation_trace_sample: u32,
}

fn default_host() -> String {
    "localhost".to_string()
}

const fn default_port() -> u16 {
    5432
}

fn default_dbname() -> String {
    "postgres".to_string()
}

fn default_user() -> String {
    "postgres".to_string()
}

fn default_application_name() -> String {
    "poolwarden".to_string()
}

const fn default_max_size() -> u32 {
    20
}

const fn default_idle_timeout_secs() -> u64 {
    180 // 3 minutes
}

const fn default_housekeeping_interval_secs() -> u64 {
    30
}

const fn default_connect_timeout_secs() -> u64 {
    5
}

const fn default_creation_trace_sample() -> u32 {
    10
}

impl DatabaseConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn housekeeping_interval(&self) -> Duration {
        Duration::from_secs(self.housekeeping_interval_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            dbname: default_dbname(),
            user: default_user(),
            password: None,
            application_name: default_application_name(),
            max_size: default_max_size(),
            idle_timeout_secs: default_idle_timeout_secs(),
            housekeeping_interval_secs: default_housekeeping_interval_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            creation_trace_sample: default_creation_trace_sample(),
        }
    }
}
