//! Configuration health reporting.

use crate::infrastructure::config::settings::Config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy(String),
}

#[derive(Debug, Clone)]
pub struct HealthCheck {
    name: &'static str,
    critical: bool,
    status: HealthStatus,
}

impl HealthCheck {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn critical(&self) -> bool {
        self.critical
    }

    pub fn status(&self) -> &HealthStatus {
        &self.status
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self.status, HealthStatus::Healthy)
    }
}

#[derive(Debug, Clone)]
pub struct HealthReport {
    checks: Vec<HealthCheck>,
}

impl HealthReport {
    pub fn checks(&self) -> &[HealthCheck] {
        &self.checks
    }

    pub fn is_healthy(&self) -> bool {
        self.checks
            .iter()
            .filter(|check| check.critical())
            .all(HealthCheck::is_healthy)
    }
}

fn status_if(ok: bool, reason: impl FnOnce() -> String) -> HealthStatus {
    if ok {
        HealthStatus::Healthy
    } else {
        HealthStatus::Unhealthy(reason())
    }
}

pub fn health_check(config: &Config) -> HealthReport {
    let mut checks = Vec::new();

    checks.push(HealthCheck {
        name: "database",
        critical: true,
        status: status_if(
            !config.database.host.trim().is_empty() && !config.database.dbname.trim().is_empty(),
            || "host or dbname is empty".to_string(),
        ),
    });

    let query_timeout = config.scope.query_timeout();
    checks.push(HealthCheck {
        name: "scope",
        critical: true,
        status: if config.scope.application_label.trim().is_empty() {
            HealthStatus::Unhealthy("application_label is empty".to_string())
        } else if query_timeout >= config.monitor.interval() {
            HealthStatus::Unhealthy(format!(
                "query timeout {}ms is not shorter than the monitor interval",
                query_timeout.as_millis()
            ))
        } else {
            HealthStatus::Healthy
        },
    });

    checks.push(HealthCheck {
        name: "monitor",
        critical: true,
        status: status_if(config.monitor.interval_secs > 0, || {
            "monitor interval is zero".to_string()
        }),
    });

    checks.push(HealthCheck {
        name: "evictor",
        critical: false,
        status: if !config.evictor.enabled {
            HealthStatus::Unhealthy("evictor disabled".to_string())
        } else if config.evictor.interval_secs <= config.monitor.interval_secs {
            HealthStatus::Unhealthy("evictor runs no slower than the monitor".to_string())
        } else {
            HealthStatus::Healthy
        },
    });

    HealthReport { checks }
}

#[cfg(test)]
mod tests {
    use super::{health_check, HealthCheck, HealthReport, HealthStatus};
    use crate::infrastructure::config::settings::Config;

    fn find<'a>(report: &'a HealthReport, name: &str) -> &'a HealthCheck {
        report
            .checks()
            .iter()
            .find(|c| c.name() == name)
            .unwrap()
    }

    #[test]
    fn health_report_is_healthy_when_all_critical_pass() {
        let report = HealthReport {
            checks: vec![
                HealthCheck {
                    name: "critical_pass",
                    critical: true,
                    status: HealthStatus::Healthy,
                },
                HealthCheck {
                    name: "non_critical_fail",
                    critical: false,
                    status: HealthStatus::Unhealthy("warning".to_string()),
                },
            ],
        };

        assert!(report.is_healthy());
    }

    #[test]
    fn health_check_with_default_config() {
        let report = health_check(&Config::default());

        let names: Vec<_> = report.checks().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["database", "scope", "monitor", "evictor"]);
        assert!(report.is_healthy());
        assert!(report.checks().iter().all(HealthCheck::is_healthy));
    }

    #[test]
    fn empty_host_is_critical() {
        let mut config = Config::default();
        config.database.host = String::new();

        let report = health_check(&config);
        assert!(!find(&report, "database").is_healthy());
        assert!(!report.is_healthy());
    }

    #[test]
    fn slow_query_timeout_fails_scope() {
        let mut config = Config::default();
        config.scope.query_timeout_ms = 30_000;

        let report = health_check(&config);
        assert!(matches!(
            find(&report, "scope").status(),
            HealthStatus::Unhealthy(reason) if reason.contains("30000ms")
        ));
    }

    #[test]
    fn disabled_evictor_is_not_critical() {
        let mut config = Config::default();
        config.evictor.enabled = false;

        let report = health_check(&config);
        assert!(!find(&report, "evictor").is_healthy());
        assert!(report.is_healthy());
    }
}
