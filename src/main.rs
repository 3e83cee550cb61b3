use clap::Parser;
use poolwarden::cli::{self, CheckCommand, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let opts = Cli::parse();
    match &opts.command {
        Commands::Run(args) => cli::run::execute(args).await?,
        Commands::Reap(args) => cli::reap::execute(args).await?,
        Commands::Status(args) => cli::status::execute(args).await?,
        Commands::Check(CheckCommand::Config(args)) => {
            cli::check::execute_config(&args.config)?;
        }
    }
    Ok(())
}
