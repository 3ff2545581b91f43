mod cli;
mod commands;
mod observability;
mod output;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Commands};
use mcpfn_config::DeploymentFile;
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    observability::init_tracing(&cli.log_level);
    let format = cli.format.unwrap_or_default();

    tracing::debug!(file = ?cli.file, "loading deployment file");
    let file = DeploymentFile::load(cli.file.as_deref()).context("failed to load deployment file")?;

    match &cli.command {
        Commands::Validate => commands::plan::validate(&file)?,
        Commands::Names => commands::plan::names(&file, format)?,
        Commands::Flags => commands::plan::flags(&file, format)?,
        Commands::Compose => commands::plan::compose(&file, format)?,
        Commands::Registration => commands::plan::registration(&file, format)?,
        Commands::Plan(args) => {
            commands::plan::plan(&file, args.simulate_registration, format).await?;
        }
        Commands::Outputs(args) => {
            commands::plan::outputs(&file, args.simulate_registration, format).await?;
        }
    }

    Ok(())
}
