//! CLI command implementations.
//!
//! Every command that touches providers or models goes through a
//! [`ProviderSession`], so the CLI applies the same validation, built-in
//! protection and reload rules as any other front end.

pub mod config;
pub mod logo;
pub mod models;
pub mod providers;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result, bail};
use dialoguer::{Confirm as ConfirmPrompt, theme::ColorfulTheme};
use relay_models::gateway::{HttpGateway, RemoteGateway};
use relay_models::session::{ActionOutcome, Confirm, Navigation, Notice, ProviderSession};
use relay_models::{ModelAssociationManager, ProviderId, ProviderStore};
use tracing::debug;

use crate::config::RelayConfig;

/// Provider store and association manager bound to one gateway.
pub struct Context {
    pub store: Arc<ProviderStore>,
    pub models: Arc<ModelAssociationManager>,
}

impl Context {
    /// Connect to the gateway named in the config.
    pub fn connect(config: &RelayConfig) -> Result<Self> {
        let gateway = HttpGateway::with_timeout(
            &config.gateway.base_url,
            Duration::from_secs(config.gateway.timeout_secs),
        )
        .with_context(|| format!("cannot use gateway at {}", config.gateway.base_url))?;
        debug!(url = %gateway.base_url(), "using gateway");
        Ok(Self::with_gateway(Arc::new(gateway)))
    }

    pub fn with_gateway(gateway: Arc<dyn RemoteGateway>) -> Self {
        Self {
            store: Arc::new(ProviderStore::new(gateway.clone())),
            models: Arc::new(ModelAssociationManager::new(gateway)),
        }
    }

    /// Open a session for an existing provider, or a blank one for `None`.
    pub async fn open(&self, id: Option<&str>) -> Result<ProviderSession> {
        let session =
            ProviderSession::open(self.store.clone(), self.models.clone(), id.map(ProviderId::from))
                .await?;
        Ok(session)
    }

    /// Open an existing provider whose enabled-model list must be shown.
    ///
    /// A failed model load is an error here, not an empty list.
    pub async fn open_with_models(&self, id: &str) -> Result<ProviderSession> {
        let session = self.open(Some(id)).await?;
        if let Some(err) = session.enabled_models_error() {
            bail!("failed to load enabled models for '{id}': {err}");
        }
        Ok(session)
    }
}

/// Interactive yes/no prompt, skipped with `--yes`.
pub struct Prompt {
    pub assume_yes: bool,
}

impl Confirm for Prompt {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        ConfirmPrompt::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

/// Print a session outcome; error notices become command errors.
///
/// Returns the requested navigation, if any.
pub fn report(outcome: ActionOutcome) -> Result<Option<Navigation>> {
    match outcome.notice {
        Some(Notice::Error(msg)) => bail!("{msg}"),
        Some(Notice::Success(msg)) => println!("{msg}"),
        None => {}
    }
    Ok(outcome.navigation)
}
