//! Handler for the `status` command.

use crate::cli::{output, StatusArgs};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::application::SessionSummary;
use crate::infrastructure::orchestration::status;

/// Execute the status command.
pub async fn execute(args: &StatusArgs) -> Result<()> {
    let config = Config::load(&args.config)?;
    let report = status(&config).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&config, &report);
    }
    Ok(())
}

fn print_report(config: &Config, report: &SessionSummary) {
    let version = env!("CARGO_PKG_VERSION");

    output::section(&format!("poolwarden v{version}"));
    output::key_value("Database", &config.database.dbname);
    output::key_value("Session label", &report.label);
    output::key_value("Idle sessions", report.idle_sessions);
    output::key_value("Busy sessions", report.busy_sessions);
    output::key_value(
        "Oldest idle",
        report
            .oldest_idle_secs
            .map_or_else(|| "-".to_string(), |secs| format!("{secs}s")),
    );
    output::key_value(
        "Eviction threshold",
        format!("{}s", report.eviction_threshold_secs),
    );
    println!();

    if report.past_threshold > 0 {
        output::warn(&format!(
            "{} idle session(s) past the eviction threshold",
            report.past_threshold
        ));
    } else {
        output::ok("No idle session past the eviction threshold");
    }
}

#[cfg(test)]
mod tests {
    use crate::application::SessionSummary;

    #[test]
    fn json_report_fields() {
        let summary = SessionSummary {
            label: "app-*".to_string(),
            idle_sessions: 3,
            busy_sessions: 1,
            past_threshold: 2,
            oldest_idle_secs: None,
            eviction_threshold_secs: 240,
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "label": "app-*",
                "idle_sessions": 3,
                "busy_sessions": 1,
                "past_threshold": 2,
                "oldest_idle_secs": null,
                "eviction_threshold_secs": 240,
            })
        );
    }
}
