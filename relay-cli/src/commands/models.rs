//! Enabled-model management commands.
//!
//! Provides commands for listing a provider's enabled models, browsing its
//! upstream catalog, and enabling or removing models.

use anyhow::Result;
use clap::{Args, Subcommand};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use relay_models::associations::filter_catalog;
use relay_models::{AssociationId, ModelAssociation, RemoteModel};

use super::{Context, Prompt, report};
use crate::config::RelayConfig;

/// Models management arguments.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommands,
}

/// Models subcommands.
#[derive(Subcommand, Debug)]
pub enum ModelsCommands {
    /// List models enabled for a provider
    List {
        /// Provider id
        provider: String,
    },
    /// Fetch a provider's upstream model catalog
    Catalog {
        /// Provider id
        provider: String,

        /// Only show models whose id contains every keyword
        #[arg(long)]
        search: Option<String>,
    },
    /// Enable an upstream model for a provider
    Enable {
        /// Provider id
        provider: String,

        /// Model name as listed in the catalog
        model: String,
    },
    /// Remove an enabled model
    Remove {
        /// Provider id
        provider: String,

        /// Enabled-model id (see `relay models list`)
        association: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Run models command.
pub async fn run(args: ModelsArgs, config: &RelayConfig) -> Result<()> {
    let ctx = Context::connect(config)?;
    match args.command {
        ModelsCommands::List { provider } => {
            let session = ctx.open_with_models(&provider).await?;
            print_enabled(session.enabled_models());
            Ok(())
        }
        ModelsCommands::Catalog { provider, search } => {
            let mut session = ctx.open(Some(&provider)).await?;
            report(session.load_models().await)?;
            let query = search.unwrap_or_default();
            let models = filter_catalog(session.catalog(), &query);
            print_catalog(&models, session.enabled_models());
            Ok(())
        }
        ModelsCommands::Enable { provider, model } => {
            let mut session = ctx.open(Some(&provider)).await?;
            report(session.enable_model(&model).await)?;
            Ok(())
        }
        ModelsCommands::Remove {
            provider,
            association,
            yes,
        } => {
            let mut session = ctx.open(Some(&provider)).await?;
            let outcome = session
                .remove_model(
                    &AssociationId::new(association),
                    &Prompt { assume_yes: yes },
                )
                .await;
            if outcome.is_empty() {
                println!("Cancelled.");
            }
            report(outcome)?;
            Ok(())
        }
    }
}

fn print_enabled(enabled: &[ModelAssociation]) {
    if enabled.is_empty() {
        println!("No models enabled.");
        println!();
        println!("Browse the catalog with: relay models catalog <provider>");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("ID").fg(Color::Cyan),
        Cell::new("Model").fg(Color::Cyan),
    ]);
    for association in enabled {
        table.add_row(vec![
            Cell::new(&association.id),
            Cell::new(&association.model_name),
        ]);
    }
    println!("{table}");
}

fn print_catalog(models: &[&RemoteModel], enabled: &[ModelAssociation]) {
    if models.is_empty() {
        println!("No models match.");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Model").fg(Color::Cyan),
        Cell::new("Owned By").fg(Color::Cyan),
        Cell::new("Enabled").fg(Color::Cyan),
    ]);
    for model in models {
        let enabled_cell = if is_enabled(model, enabled) {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("-")
        };
        table.add_row(vec![
            Cell::new(&model.id),
            Cell::new(model.owned_by.as_deref().unwrap_or("-")),
            enabled_cell,
        ]);
    }
    println!("{table}");
}

fn is_enabled(model: &RemoteModel, enabled: &[ModelAssociation]) -> bool {
    enabled.iter().any(|a| a.model_name == model.id)
}
