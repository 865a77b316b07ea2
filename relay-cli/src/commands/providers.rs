//! Provider management commands.
//!
//! Lists, inspects, creates, edits, deletes and tests providers on the
//! configured gateway.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use dialoguer::{Password, theme::ColorfulTheme};
use relay_models::identity::{IconRegistry, LogoResolver, LogoSource};
use relay_models::session::{Navigation, ProviderForm};
use relay_models::{ApiKey, Provider};
use tracing::warn;

use super::{Context, Prompt, report};
use crate::config::RelayConfig;

/// Providers management arguments.
#[derive(Args, Debug)]
pub struct ProvidersArgs {
    #[command(subcommand)]
    pub command: ProvidersCommands,
}

/// Field changes for add/update.
#[derive(Args, Debug, Default)]
pub struct ProviderFields {
    /// Display name (at least 2 characters)
    #[arg(long)]
    pub name: Option<String>,

    /// API base URL, e.g. https://api.openai.com/v1
    #[arg(long)]
    pub base_url: Option<String>,

    /// API key (prompted for when adding without one)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Icon name (e.g. DeepSeek) or image URL
    #[arg(long)]
    pub logo: Option<String>,
}

/// Providers subcommands.
#[derive(Subcommand, Debug)]
pub enum ProvidersCommands {
    /// List all providers
    List,
    /// Show one provider with its enabled models
    Show {
        /// Provider id
        id: String,
    },
    /// Add a custom provider
    Add {
        #[command(flatten)]
        fields: ProviderFields,
    },
    /// Update an existing provider
    Update {
        /// Provider id
        id: String,

        #[command(flatten)]
        fields: ProviderFields,
    },
    /// Delete a provider and its enabled models
    Delete {
        /// Provider id
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Test connectivity of a saved provider
    Test {
        /// Provider id
        id: String,
    },
}

/// Run providers command.
pub async fn run(args: ProvidersArgs, config: &RelayConfig) -> Result<()> {
    let ctx = Context::connect(config)?;
    match args.command {
        ProvidersCommands::List => list_providers(&ctx).await,
        ProvidersCommands::Show { id } => show_provider(&ctx, &id, config).await,
        ProvidersCommands::Add { fields } => add_provider(&ctx, fields).await,
        ProvidersCommands::Update { id, fields } => update_provider(&ctx, &id, fields).await,
        ProvidersCommands::Delete { id, yes } => {
            let mut session = ctx.open(Some(&id)).await?;
            let outcome = session.delete(&Prompt { assume_yes: yes }).await;
            if outcome.is_empty() {
                println!("Cancelled.");
            }
            report(outcome)?;
            Ok(())
        }
        ProvidersCommands::Test { id } => {
            let mut session = ctx.open(Some(&id)).await?;
            report(session.test_connection().await)?;
            Ok(())
        }
    }
}

async fn list_providers(ctx: &Context) -> Result<()> {
    ctx.store.refresh().await?;
    let providers = ctx.store.list().await;

    if providers.is_empty() {
        println!("No providers configured.");
        println!();
        println!("Add one with: relay providers add --name <NAME> --base-url <URL>");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("ID").fg(Color::Cyan),
        Cell::new("Name").fg(Color::Cyan),
        Cell::new("Type").fg(Color::Cyan),
        Cell::new("Base URL").fg(Color::Cyan),
        Cell::new("API Key").fg(Color::Cyan),
        Cell::new("Enabled").fg(Color::Cyan),
    ]);

    for provider in &providers {
        table.add_row(vec![
            Cell::new(&provider.id),
            Cell::new(&provider.name),
            Cell::new(&provider.kind),
            Cell::new(&provider.base_url),
            Cell::new(format_key(provider.api_key.as_ref())),
            Cell::new(if provider.enabled { "yes" } else { "no" }),
        ]);
    }

    println!("{table}");
    Ok(())
}

async fn show_provider(ctx: &Context, id: &str, config: &RelayConfig) -> Result<()> {
    let session = ctx.open_with_models(id).await?;
    let Some(provider) = session.provider() else {
        bail!("Provider '{}' not found", id);
    };

    println!("Provider: {}", provider.name);
    println!("ID: {}", provider.id);
    println!("Type: {}", provider.kind);
    println!("Base URL: {}", provider.base_url);
    println!("API key: {}", format_key(provider.api_key.as_ref()));
    println!("Enabled: {}", if provider.enabled { "yes" } else { "no" });
    println!("Logo: {}", format_logo(provider, config));
    println!();

    if session.enabled_models().is_empty() {
        println!("No models enabled.");
        return Ok(());
    }
    println!("Enabled models:");
    for association in session.enabled_models() {
        println!("  {} ({})", association.model_name, association.id);
    }
    Ok(())
}

async fn add_provider(ctx: &Context, mut fields: ProviderFields) -> Result<()> {
    if fields.api_key.is_none() {
        let key = Password::with_theme(&ColorfulTheme::default())
            .with_prompt("API key (leave empty for none)")
            .allow_empty_password(true)
            .interact()?;
        fields.api_key = Some(key);
    }

    let mut session = ctx.open(None).await?;
    apply_fields(session.form_mut(), fields);

    if let Some(Navigation::ToProvider(id)) = report(session.submit().await)? {
        println!("Provider id: {id}");
    }
    Ok(())
}

async fn update_provider(ctx: &Context, id: &str, fields: ProviderFields) -> Result<()> {
    let mut session = ctx.open(Some(id)).await?;
    if session.is_built_in() && fields.name.is_some() {
        warn!(provider = id, "built-in provider names cannot be changed; ignoring --name");
    }
    apply_fields(session.form_mut(), fields);
    report(session.submit().await)?;
    Ok(())
}

/// Copy the given fields onto the form, leaving the rest as loaded.
fn apply_fields(form: &mut ProviderForm, fields: ProviderFields) {
    if let Some(name) = fields.name {
        form.name = name;
    }
    if let Some(base_url) = fields.base_url {
        form.base_url = base_url;
    }
    if let Some(api_key) = fields.api_key {
        form.api_key = ApiKey::new(api_key);
    }
    if let Some(logo) = fields.logo {
        form.logo = logo;
    }
}

fn format_key(key: Option<&ApiKey>) -> String {
    match key {
        Some(key) if !key.is_blank() => key.masked(),
        _ => "-".to_string(),
    }
}

fn format_logo(provider: &Provider, config: &RelayConfig) -> String {
    let resolver = LogoResolver::for_provider(provider);
    match resolver.resolve(&IconRegistry::builtin(), config.logo.style) {
        LogoSource::Icon(icon) => match icon.style {
            Some(style) => format!("{} icon ({style})", icon.name),
            None => format!("{} icon", icon.name),
        },
        LogoSource::Image(src) => src,
        LogoSource::Fallback => "default".to_string(),
    }
}
