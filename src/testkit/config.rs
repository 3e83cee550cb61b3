//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.

use crate::domain::LabelPattern;
use crate::infrastructure::config::settings::Config;
use crate::port::SessionScope;

/// Reference configuration: idle timeout 180s, safety margin 60s, monitor
/// every 30s, evictor every 120s after 60s, reaper settle 500ms.
pub fn reference() -> Config {
    Config::default()
}

/// Scope over the current database with the given label glob.
pub fn scope(label: &str) -> SessionScope {
    SessionScope {
        database: None,
        label: LabelPattern::new(label),
    }
}
