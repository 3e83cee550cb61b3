//! Command-line interface definitions.

pub mod check;
pub mod output;
pub mod reap;
pub mod run;
pub mod status;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Poolwarden - PostgreSQL connection-pool health reconciliation.
#[derive(Parser, Debug)]
#[command(name = "poolwarden")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch this application's server-side sessions until interrupted
    Run(RunArgs),

    /// Terminate every session of the configured role, then exit.
    /// Only while no instance of the application is running
    Reap(ConfigPathArg),

    /// Show this application's server-side sessions
    Status(StatusArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `poolwarden check`
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate configuration file
    Config(ConfigPathArg),
}

/// Shared argument for commands that only need a config path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(short, long, default_value = "poolwarden.toml")]
    pub config: PathBuf,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "poolwarden.toml")]
    pub config: PathBuf,

    /// Override log level (debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long)]
    pub json_logs: bool,
}

/// Arguments for the `status` subcommand.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "poolwarden.toml")]
    pub config: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}
