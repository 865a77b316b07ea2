//! Configuration inspection commands.
//!
//! Prints the merged gateway and logo settings, or the locations of the
//! user and project config files that feed them.

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::config::ConfigLoader;

/// Config inspection arguments.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the merged configuration as TOML
    Show,
    /// Show where the user and project config files are read from
    Path,
}

/// Run config command.
pub fn run(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => {
            let config = ConfigLoader::load()?;
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        ConfigCommands::Path => {
            println!("User config:    {}", ConfigLoader::user_config_path().display());
            println!("Project config: {}", ConfigLoader::project_config_path().display());
            Ok(())
        }
    }
}
