//! Handler for the `run` command.

use tracing::info;

use crate::cli::RunArgs;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::orchestration::Warden;

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = Config::load(&args.config)?;

    // Apply CLI overrides
    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.format = "json".to_string();
    }

    config.init_logging();

    info!(
        config = %args.config.display(),
        label = %config.scope.application_label,
        "poolwarden starting"
    );

    Warden::run(config).await?;

    info!("poolwarden stopped");
    Ok(())
}
