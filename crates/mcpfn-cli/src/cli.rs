use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "mcpfn")]
#[command(about = "Plan app settings, auth policy and outputs for an MCP Functions deployment")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Deployment file (defaults to ./mcpfn.toml)
    #[arg(short = 'f', long, global = true, env = "MCPFN_FILE")]
    pub file: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, global = true)]
    pub format: Option<OutputFormat>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, env = "MCPFN_LOG", default_value = "warn")]
    pub log_level: String,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate deployment parameters
    Validate,
    /// Show derived resource names
    Names,
    /// Show feature flags and whether each is enabled
    Flags,
    /// Compose app settings and the auth policy
    Compose,
    /// Show the app registration request
    Registration,
    /// Show the full deployment plan
    Plan(PlanArgs),
    /// Show deployment outputs
    Outputs(PlanArgs),
}

#[derive(clap::Args)]
pub struct PlanArgs {
    /// Register against an in-memory directory to preview auth-enabled output
    #[arg(long)]
    pub simulate_registration: bool,
}
