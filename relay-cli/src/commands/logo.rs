//! Logo resolution preview.

use anyhow::Result;
use clap::Args;
use relay_models::identity::{DEFAULT_LOGO, IconRegistry, IconStyle, LogoResolver, LogoSource};

use crate::config::RelayConfig;

#[derive(Args, Debug)]
pub struct LogoArgs {
    /// Icon name (e.g. DeepSeek) or image URL
    pub name: String,

    /// Provider base URL used to derive favicon candidates
    #[arg(long)]
    pub base_url: Option<String>,

    /// Icon style (Color, Text, Outlined, Glyph); defaults to the configured style
    #[arg(long)]
    pub style: Option<IconStyle>,
}

pub fn run(args: LogoArgs, config: &RelayConfig) -> Result<()> {
    let style = args.style.unwrap_or(config.logo.style);
    let resolver = LogoResolver::new(&args.name, args.base_url.as_deref());
    let source = resolver.resolve(&IconRegistry::builtin(), style);

    println!("Resolved: {}", describe(&source));
    if !resolver.candidates().is_empty() {
        println!();
        println!("Image candidates (tried in order):");
        for (i, candidate) in resolver.candidates().iter().enumerate() {
            println!("  {}. {}", i + 1, candidate);
        }
    }
    println!("Fallback: {DEFAULT_LOGO}");
    Ok(())
}

fn describe(source: &LogoSource) -> String {
    match source {
        LogoSource::Icon(icon) => match icon.style {
            Some(style) => format!("registry icon {} ({style})", icon.name),
            None => format!("registry icon {} (default style)", icon.name),
        },
        LogoSource::Image(src) => format!("image {src}"),
        LogoSource::Fallback => format!("default image {DEFAULT_LOGO}"),
    }
}
