use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::ConfigLoader;

#[derive(Parser)]
#[command(name = "relay", about = "Manage model providers and their enabled models")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Preview how a provider logo resolves
    Logo(commands::logo::LogoArgs),
    /// Manage enabled models
    Models(commands::models::ModelsArgs),
    /// Manage providers
    Providers(commands::providers::ProvidersArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Config(args) => commands::config::run(args),
        Commands::Logo(args) => commands::logo::run(args, &ConfigLoader::load()?),
        Commands::Models(args) => commands::models::run(args, &ConfigLoader::load()?).await,
        Commands::Providers(args) => {
            commands::providers::run(args, &ConfigLoader::load()?).await
        }
    }
}
