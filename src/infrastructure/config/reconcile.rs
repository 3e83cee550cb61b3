//! Monitor, evictor, reaper and session-scope configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::domain::LabelPattern;
use crate::port::SessionScope;

/// Which backend sessions count as "ours".
#[derive(Debug, Clone, Deserialize)]
pub struct ScopeConfig {
    /// Database to scope queries to. Unset means the connection's current
    /// database.
    #[serde(default)]
    pub database: Option<String>,
    /// Glob over `application_name`; `*` matches any run of characters.
    #[serde(default = "default_application_label")]
    pub application_label: String,
    /// Timeout applied to every backend query and termination (milliseconds).
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

fn default_application_label() -> String {
    "app-*".to_string()
}

const fn default_query_timeout_ms() -> u64 {
    5000
}

impl ScopeConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn session_scope(&self) -> SessionScope {
        SessionScope {
            database: self.database.clone(),
            label: LabelPattern::new(self.application_label.clone()),
        }
    }
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            database: None,
            application_label: default_application_label(),
            query_timeout_ms: default_query_timeout_ms(),
        }
    }
}

/// Periodic monitor and its diagnostic companion.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_monitor_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_diagnostics_interval_secs")]
    pub diagnostics_interval_secs: u64,
    /// Warn when `active / max_size` reaches this percentage.
    #[serde(default = "default_utilization_warn_pct")]
    pub utilization_warn_pct: f64,
    /// Warn on growth once `total >= max_size * saturation_ratio`.
    #[serde(default = "default_saturation_ratio")]
    pub saturation_ratio: f64,
    /// Idle floor for the leak heuristic.
    #[serde(default = "default_leak_min_idle")]
    pub leak_min_idle: u32,
}

const fn default_monitor_interval_secs() -> u64 {
    30
}

const fn default_diagnostics_interval_secs() -> u64 {
    60
}

const fn default_utilization_warn_pct() -> f64 {
    80.0
}

const fn default_saturation_ratio() -> f64 {
    0.9
}

const fn default_leak_min_idle() -> u32 {
    crate::domain::leak::DEFAULT_MIN_IDLE
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn diagnostics_interval(&self) -> Duration {
        Duration::from_secs(self.diagnostics_interval_secs)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_monitor_interval_secs(),
            diagnostics_interval_secs: default_diagnostics_interval_secs(),
            utilization_warn_pct: default_utilization_warn_pct(),
            saturation_ratio: default_saturation_ratio(),
            leak_min_idle: default_leak_min_idle(),
        }
    }
}

/// Reconciliation evictor.
#[derive(Debug, Clone, Deserialize)]
pub struct EvictorConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_evictor_interval_secs")]
    pub interval_secs: u64,
    /// Delay before the first pass so the pool can stabilize.
    #[serde(default = "default_evictor_initial_delay_secs")]
    pub initial_delay_secs: u64,
    /// Added to the pool idle timeout to get the eviction age threshold.
    #[serde(default = "default_safety_margin_secs")]
    pub safety_margin_secs: u64,
    /// Act only when the drift exceeds this many sessions.
    #[serde(default)]
    pub drift_threshold: u32,
    /// Ratio of `max_size` at which a no-action pass notes the pool is near
    /// capacity.
    #[serde(default = "default_nearing_capacity_ratio")]
    pub nearing_capacity_ratio: f64,
}

const fn default_true() -> bool {
    true
}

const fn default_evictor_interval_secs() -> u64 {
    120
}

const fn default_evictor_initial_delay_secs() -> u64 {
    60
}

const fn default_safety_margin_secs() -> u64 {
    60
}

const fn default_nearing_capacity_ratio() -> f64 {
    0.8
}

impl EvictorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }

    pub fn safety_margin(&self) -> Duration {
        Duration::from_secs(self.safety_margin_secs)
    }
}

impl Default for EvictorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_evictor_interval_secs(),
            initial_delay_secs: default_evictor_initial_delay_secs(),
            safety_margin_secs: default_safety_margin_secs(),
            drift_threshold: 0,
            nearing_capacity_ratio: default_nearing_capacity_ratio(),
        }
    }
}

/// One-shot startup reaper.
#[derive(Debug, Clone, Deserialize)]
pub struct ReaperConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Pause after terminations so the backend can settle.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

const fn default_settle_delay_ms() -> u64 {
    500
}

impl ReaperConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}
