//! Handler for the `reap` command.

use crate::cli::{output, ConfigPathArg};
use crate::error::{Error, Result};
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::orchestration::reap_once;

/// Execute the reap command.
pub async fn execute(args: &ConfigPathArg) -> Result<()> {
    let config = Config::load(&args.config)?;
    config.init_logging();

    match reap_once(&config).await? {
        Some(outcome) if outcome.found == 0 => {
            output::ok("No stale sessions found");
            Ok(())
        }
        Some(outcome) => {
            output::ok(&format!(
                "Terminated {} of {} stale session(s)",
                outcome.terminated, outcome.found
            ));
            Ok(())
        }
        None => Err(Error::Other("reaper could not complete, see log".to_string())),
    }
}
