//! Provider session controller
//!
//! A [`ProviderSession`] drives one provider edit (or create) screen. It
//! owns the form, the enabled-model list and the upstream catalog shown on
//! that screen, and turns every user action into an [`ActionOutcome`]: an
//! optional notice for the user plus an optional navigation request.
//!
//! Reads and writes go through a shared [`ProviderStore`] and
//! [`ModelAssociationManager`]; the session never touches the gateway
//! directly.

mod form;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::associations::ModelAssociationManager;
use crate::store::ProviderStore;
use crate::{AssociationId, Error, ModelAssociation, Provider, ProviderId, RemoteModel, Result};

pub use form::{MIN_NAME_LEN, ProviderForm};

/// Fallback detail when a failed connection test carries no message.
const UNKNOWN_ERROR: &str = "unknown error";

/// State of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Fetching the provider and its enabled models
    Loading,
    /// Waiting for user input
    Ready,
    /// Connection test in flight
    Testing,
    /// Create or update in flight
    Saving,
    /// Delete in flight
    Deleting,
    /// Provider deleted; the session accepts no further actions
    NavigatedAway,
}

/// User-facing message produced by an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Success(msg) | Notice::Error(msg) => msg,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

/// Where the caller should go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Edit screen of a provider
    ToProvider(ProviderId),
    /// Provider list
    ToProviderList,
}

/// Result of a session action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOutcome {
    pub notice: Option<Notice>,
    pub navigation: Option<Navigation>,
}

impl ActionOutcome {
    fn success(message: impl Into<String>) -> Self {
        Self {
            notice: Some(Notice::Success(message.into())),
            navigation: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            notice: Some(Notice::Error(message.into())),
            navigation: None,
        }
    }

    fn navigate(mut self, navigation: Navigation) -> Self {
        self.navigation = Some(navigation);
        self
    }

    /// Nothing happened: no notice, no navigation.
    pub fn is_empty(&self) -> bool {
        self.notice.is_none() && self.navigation.is_none()
    }
}

/// Asks the user to confirm a destructive action.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// User-facing text for an error, preferring the remote side's own message.
fn describe(err: &Error, fallback: &str) -> String {
    if err.is_local() {
        return err.to_string();
    }
    match err {
        Error::Gateway(e) => e.user_message().unwrap_or(fallback).to_string(),
        _ => fallback.to_string(),
    }
}

/// Controller for a single provider screen
pub struct ProviderSession {
    store: Arc<ProviderStore>,
    models: Arc<ModelAssociationManager>,
    /// Persisted id; `None` until the first successful create
    id: Option<ProviderId>,
    /// Provider as last loaded from the gateway
    loaded: Option<Provider>,
    form: ProviderForm,
    enabled_models: Vec<ModelAssociation>,
    /// Why the last enabled-model load failed, if it did
    enabled_models_error: Option<String>,
    catalog: Vec<RemoteModel>,
    state: SessionState,
}

impl ProviderSession {
    /// Open a session for an existing provider, or a blank create session.
    ///
    /// With an id, the provider and its enabled models are fetched
    /// concurrently. A missing provider is an error; a failed model load
    /// leaves the model list empty and is kept in
    /// [`enabled_models_error`](Self::enabled_models_error).
    pub async fn open(
        store: Arc<ProviderStore>,
        models: Arc<ModelAssociationManager>,
        id: Option<ProviderId>,
    ) -> Result<Self> {
        let mut session = Self {
            store,
            models,
            id: None,
            loaded: None,
            form: ProviderForm::default(),
            enabled_models: Vec::new(),
            enabled_models_error: None,
            catalog: Vec::new(),
            state: SessionState::Loading,
        };

        let Some(id) = id else {
            session.state = SessionState::Ready;
            return Ok(session);
        };

        let (provider, associations) = tokio::join!(
            session.store.load_by_id(&id),
            session.models.load_by_provider_id(&id)
        );
        let provider = provider?.ok_or_else(|| Error::ProviderNotFound(id.to_string()))?;

        match associations {
            Ok(associations) => session.enabled_models = associations,
            Err(e) => {
                warn!(provider = %id, error = %e, "failed to load enabled models");
                session.enabled_models_error = Some(e.to_string());
            }
        }
        session.form = ProviderForm::from_provider(&provider);
        session.loaded = Some(provider);
        session.id = Some(id);
        session.state = SessionState::Ready;
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Persisted provider id, if any.
    pub fn id(&self) -> Option<&ProviderId> {
        self.id.as_ref()
    }

    /// Provider as last loaded from the gateway.
    pub fn provider(&self) -> Option<&Provider> {
        self.loaded.as_ref()
    }

    pub fn form(&self) -> &ProviderForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ProviderForm {
        &mut self.form
    }

    pub fn enabled_models(&self) -> &[ModelAssociation] {
        &self.enabled_models
    }

    /// Set when the enabled-model list could not be loaded; the list is
    /// then empty but not known to be empty.
    pub fn enabled_models_error(&self) -> Option<&str> {
        self.enabled_models_error.as_deref()
    }

    /// Upstream catalog from the last [`load_models`](Self::load_models).
    pub fn catalog(&self) -> &[RemoteModel] {
        &self.catalog
    }

    /// Built-in providers cannot be deleted and keep their name and type.
    pub fn is_built_in(&self) -> bool {
        self.loaded.as_ref().is_some_and(Provider::is_built_in)
    }

    fn is_closed(&self) -> bool {
        self.state == SessionState::NavigatedAway
    }

    /// Check that the form has credentials and the provider is persisted.
    fn require_connectable(&self) -> std::result::Result<ProviderId, ActionOutcome> {
        if !self.form.has_credentials() {
            return Err(ActionOutcome::error("API key and base URL are required"));
        }
        self.id
            .clone()
            .ok_or_else(|| ActionOutcome::error("save the provider before using it"))
    }

    /// Verify connectivity of the persisted provider.
    pub async fn test_connection(&mut self) -> ActionOutcome {
        if self.is_closed() {
            return ActionOutcome::default();
        }
        let id = match self.require_connectable() {
            Ok(id) => id,
            Err(outcome) => return outcome,
        };

        self.state = SessionState::Testing;
        let result = self.store.test_connection(&id).await;
        self.state = SessionState::Ready;

        match result {
            Ok(()) => ActionOutcome::success("connection test succeeded"),
            Err(e) => ActionOutcome::error(format!(
                "connection failed: {}",
                describe(&e, UNKNOWN_ERROR)
            )),
        }
    }

    /// Fetch the upstream catalog, then reload the enabled-model list.
    pub async fn load_models(&mut self) -> ActionOutcome {
        if self.is_closed() {
            return ActionOutcome::default();
        }
        let id = match self.require_connectable() {
            Ok(id) => id,
            Err(outcome) => return outcome,
        };

        let result = async {
            let catalog = self.models.refresh_catalog(&id).await?;
            let enabled = self.models.load_by_provider_id(&id).await?;
            Ok::<_, Error>((catalog, enabled))
        }
        .await;

        match result {
            Ok((catalog, enabled)) => {
                self.catalog = catalog;
                self.enabled_models = enabled;
                self.enabled_models_error = None;
                ActionOutcome::success("model list loaded")
            }
            Err(e) => {
                warn!(provider = %id, error = %e, "failed to load model list");
                ActionOutcome::error("failed to load model list")
            }
        }
    }

    /// Validate the form, then create or update the provider.
    ///
    /// A successful create binds the session to the new id and asks the
    /// caller to navigate to it.
    pub async fn submit(&mut self) -> ActionOutcome {
        if self.is_closed() {
            return ActionOutcome::default();
        }
        if let Err(e) = self.form.validate() {
            return ActionOutcome::error(e.to_string());
        }

        let mut draft = self.form.to_draft(self.id.clone());
        if let Some(loaded) = self.loaded.as_ref().filter(|p| p.is_built_in()) {
            draft.name = Some(loaded.name.clone());
            draft.kind = Some(loaded.kind.as_str().to_string());
            self.form.name = loaded.name.clone();
            self.form.kind = loaded.kind.as_str().to_string();
        }

        self.state = SessionState::Saving;
        let outcome = match self.id.clone() {
            Some(_) => match self.store.update(draft).await {
                Ok(id) => {
                    self.sync_loaded(&id).await;
                    ActionOutcome::success("changes saved")
                }
                Err(e) => ActionOutcome::error(format!(
                    "failed to save changes: {}",
                    describe(&e, "please try again")
                )),
            },
            None => match self.store.create(draft).await {
                Ok(id) => {
                    self.sync_loaded(&id).await;
                    self.id = Some(id.clone());
                    ActionOutcome::success("provider created")
                        .navigate(Navigation::ToProvider(id))
                }
                Err(e) => ActionOutcome::error(format!(
                    "failed to create provider: {}",
                    describe(&e, "please try again")
                )),
            },
        };
        self.state = SessionState::Ready;
        outcome
    }

    /// Delete the provider after confirmation.
    pub async fn delete(&mut self, confirm: &dyn Confirm) -> ActionOutcome {
        if self.is_closed() {
            return ActionOutcome::default();
        }
        let Some(id) = self.id.clone() else {
            return ActionOutcome::error(Error::Unsaved.to_string());
        };
        if self.is_built_in() {
            return ActionOutcome::error("built-in providers cannot be deleted");
        }
        if !confirm.confirm("Delete this provider? Its enabled models will be removed too.") {
            debug!(provider = %id, "delete cancelled");
            return ActionOutcome::default();
        }

        self.state = SessionState::Deleting;
        match self.store.delete(&id).await {
            Ok(()) => {
                self.state = SessionState::NavigatedAway;
                ActionOutcome::success("provider deleted").navigate(Navigation::ToProviderList)
            }
            Err(e) => {
                self.state = SessionState::Ready;
                ActionOutcome::error(format!(
                    "failed to delete provider: {}",
                    describe(&e, "please try again")
                ))
            }
        }
    }

    /// Remove one enabled model after confirmation, then reload the list.
    pub async fn remove_model(
        &mut self,
        association: &AssociationId,
        confirm: &dyn Confirm,
    ) -> ActionOutcome {
        if self.is_closed() {
            return ActionOutcome::default();
        }
        let Some(id) = self.id.clone() else {
            return ActionOutcome::error(Error::Unsaved.to_string());
        };
        if !confirm.confirm("Remove this model?") {
            return ActionOutcome::default();
        }

        if let Err(e) = self.models.delete_association(association).await {
            warn!(association = %association, error = %e, "failed to remove model");
            return ActionOutcome::error("failed to remove model");
        }
        match self.reload_models(&id).await {
            Ok(()) => ActionOutcome::success("model removed"),
            Err(e) => {
                warn!(provider = %id, error = %e, "model removed but reload failed");
                ActionOutcome::error("model removed, but the list could not be reloaded")
            }
        }
    }

    /// Enable an upstream model for this provider, then reload the list.
    pub async fn enable_model(&mut self, model_name: &str) -> ActionOutcome {
        if self.is_closed() {
            return ActionOutcome::default();
        }
        let Some(id) = self.id.clone() else {
            return ActionOutcome::error(Error::Unsaved.to_string());
        };
        let model_name = model_name.trim();
        if model_name.is_empty() {
            return ActionOutcome::error(Error::MissingField("model_name").to_string());
        }

        let created = match self.models.enable_model(&id, model_name).await {
            Ok(created) => created,
            Err(e) => {
                warn!(provider = %id, model = model_name, error = %e, "failed to enable model");
                return ActionOutcome::error(format!(
                    "failed to enable model: {}",
                    describe(&e, "please try again")
                ));
            }
        };
        if let Err(e) = self.reload_models(&id).await {
            warn!(provider = %id, error = %e, "failed to reload enabled models");
        }

        if created {
            ActionOutcome::success(format!("model enabled: {model_name}"))
        } else {
            ActionOutcome::success(format!("model already enabled: {model_name}"))
        }
    }

    async fn reload_models(&mut self, id: &ProviderId) -> Result<()> {
        self.enabled_models = self.models.load_by_provider_id(id).await?;
        self.enabled_models_error = None;
        Ok(())
    }

    /// Pick up the refreshed cache entry after a save.
    async fn sync_loaded(&mut self, id: &ProviderId) {
        if let Some(provider) = self.store.get_by_id(id).await {
            self.loaded = Some(provider);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ApiKey;
    use crate::gateway::{
        GatewayError, GatewayOp, InMemoryGateway, RemoteGateway, WireProviderDraft,
    };

    struct Fixture {
        gateway: Arc<InMemoryGateway>,
        store: Arc<ProviderStore>,
        models: Arc<ModelAssociationManager>,
    }

    impl Fixture {
        fn new() -> Self {
            let gateway = Arc::new(InMemoryGateway::new());
            Self {
                store: Arc::new(ProviderStore::new(gateway.clone())),
                models: Arc::new(ModelAssociationManager::new(gateway.clone())),
                gateway,
            }
        }

        async fn seed_acme(&self) -> ProviderId {
            self.gateway
                .create_provider(WireProviderDraft {
                    name: Some("Acme".to_string()),
                    api_key: Some("sk-acme".to_string()),
                    base_url: Some("https://api.acme.ai".to_string()),
                    logo: Some("custom".to_string()),
                    kind: Some("custom".to_string()),
                    ..Default::default()
                })
                .await
                .unwrap()
        }

        async fn open(&self, id: Option<ProviderId>) -> Result<ProviderSession> {
            ProviderSession::open(self.store.clone(), self.models.clone(), id).await
        }
    }

    fn yes(_: &str) -> bool {
        true
    }

    fn no(_: &str) -> bool {
        false
    }

    fn error_text(outcome: &ActionOutcome) -> &str {
        match &outcome.notice {
            Some(Notice::Error(msg)) => msg,
            other => panic!("expected error notice, got {other:?}"),
        }
    }

    // ==================== Open Tests ====================

    #[tokio::test]
    async fn open_without_id_starts_blank() {
        let fx = Fixture::new();
        let session = fx.open(None).await.unwrap();

        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.form().kind, "custom");
        assert!(session.id().is_none());
        assert!(fx.gateway.calls().await.is_empty());
    }

    #[tokio::test]
    async fn open_loads_provider_and_enabled_models() {
        let fx = Fixture::new();
        let id = fx.seed_acme().await;
        fx.gateway.enable_model(&id, "acme-large").await.unwrap();

        let session = fx.open(Some(id.clone())).await.unwrap();

        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.form().name, "Acme");
        assert_eq!(session.enabled_models().len(), 1);
        assert!(!session.is_built_in());
    }

    #[tokio::test]
    async fn open_missing_provider_fails() {
        let fx = Fixture::new();
        let result = fx.open(Some(ProviderId::new("p404"))).await;
        assert!(matches!(result, Err(Error::ProviderNotFound(id)) if id == "p404"));
    }

    #[tokio::test]
    async fn open_survives_model_load_failure() {
        let fx = Fixture::new();
        let id = fx.seed_acme().await;
        fx.gateway.enable_model(&id, "acme-large").await.unwrap();
        fx.gateway
            .fail_op(GatewayOp::ListEnabledModels, GatewayError::Status(502))
            .await;

        let session = fx.open(Some(id)).await.unwrap();
        assert_eq!(session.state(), SessionState::Ready);
        assert!(session.enabled_models().is_empty());
        assert!(session.enabled_models_error().is_some_and(|e| e.contains("502")));
    }

    #[tokio::test]
    async fn successful_reload_clears_model_load_error() {
        let fx = Fixture::new();
        let id = fx.seed_acme().await;
        fx.gateway
            .fail_op(GatewayOp::ListEnabledModels, GatewayError::Status(502))
            .await;
        let mut session = fx.open(Some(id)).await.unwrap();
        assert!(session.enabled_models_error().is_some());

        fx.gateway.clear_failure(GatewayOp::ListEnabledModels).await;
        session.enable_model("acme-large").await;

        assert!(session.enabled_models_error().is_none());
        assert_eq!(session.enabled_models().len(), 1);
    }

    // ==================== Connection Test Tests ====================

    #[tokio::test]
    async fn test_connection_requires_credentials() {
        let fx = Fixture::new();
        let id = fx.seed_acme().await;
        let mut session = fx.open(Some(id)).await.unwrap();
        session.form_mut().api_key = ApiKey::new("  ");
        fx.gateway.clear_calls().await;

        let outcome = session.test_connection().await;

        assert!(error_text(&outcome).contains("API key"));
        assert!(fx.gateway.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_connection_requires_base_url_even_with_key() {
        let fx = Fixture::new();
        let id = fx.seed_acme().await;
        let mut session = fx.open(Some(id)).await.unwrap();
        session.form_mut().api_key = ApiKey::new("sk-acme");
        session.form_mut().base_url = " ".to_string();
        fx.gateway.clear_calls().await;

        let outcome = session.test_connection().await;

        assert!(error_text(&outcome).contains("base URL"));
        assert!(fx.gateway.calls().await.is_empty());
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn test_connection_requires_saved_provider() {
        let fx = Fixture::new();
        let mut session = fx.open(None).await.unwrap();
        session.form_mut().api_key = ApiKey::new("sk-acme");
        session.form_mut().base_url = "https://api.acme.ai".to_string();

        let outcome = session.test_connection().await;

        assert!(error_text(&outcome).contains("save"));
        assert!(fx.gateway.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_connection_reports_remote_message() {
        let fx = Fixture::new();
        let id = fx.seed_acme().await;
        fx.gateway.fail_connection(id.as_str(), "invalid api key").await;
        let mut session = fx.open(Some(id)).await.unwrap();

        let outcome = session.test_connection().await;

        assert_eq!(error_text(&outcome), "connection failed: invalid api key");
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn test_connection_without_message_is_unknown() {
        let fx = Fixture::new();
        let id = fx.seed_acme().await;
        fx.gateway
            .fail_op(
                GatewayOp::TestConnection,
                GatewayError::Request("connection refused".to_string()),
            )
            .await;
        let mut session = fx.open(Some(id)).await.unwrap();

        let outcome = session.test_connection().await;
        assert_eq!(error_text(&outcome), "connection failed: unknown error");
    }

    #[tokio::test]
    async fn test_connection_success() {
        let fx = Fixture::new();
        let id = fx.seed_acme().await;
        let mut session = fx.open(Some(id)).await.unwrap();

        let outcome = session.test_connection().await;
        assert_eq!(
            outcome.notice,
            Some(Notice::Success("connection test succeeded".to_string()))
        );
    }

    // ==================== Model Tests ====================

    #[tokio::test]
    async fn load_models_fetches_catalog_and_reloads() {
        let fx = Fixture::new();
        let id = fx.seed_acme().await;
        fx.gateway
            .set_catalog(id.as_str(), vec![RemoteModel::new("acme-large")])
            .await;
        let mut session = fx.open(Some(id.clone())).await.unwrap();
        fx.gateway.enable_model(&id, "acme-large").await.unwrap();

        let outcome = session.load_models().await;

        assert!(!outcome.notice.unwrap().is_error());
        assert_eq!(session.catalog().len(), 1);
        assert_eq!(session.enabled_models().len(), 1);
    }

    #[tokio::test]
    async fn load_models_requires_base_url_even_with_key() {
        let fx = Fixture::new();
        let id = fx.seed_acme().await;
        let mut session = fx.open(Some(id)).await.unwrap();
        session.form_mut().api_key = ApiKey::new("sk-acme");
        session.form_mut().base_url = " ".to_string();
        fx.gateway.clear_calls().await;

        let outcome = session.load_models().await;

        assert!(error_text(&outcome).contains("base URL"));
        assert!(fx.gateway.calls().await.is_empty());
        assert!(session.catalog().is_empty());
    }

    #[tokio::test]
    async fn load_models_requires_api_key() {
        let fx = Fixture::new();
        let id = fx.seed_acme().await;
        let mut session = fx.open(Some(id)).await.unwrap();
        session.form_mut().api_key = ApiKey::new("");
        fx.gateway.clear_calls().await;

        let outcome = session.load_models().await;

        assert!(error_text(&outcome).contains("API key"));
        assert!(fx.gateway.calls().await.is_empty());
    }

    #[tokio::test]
    async fn load_models_failure_is_generic() {
        let fx = Fixture::new();
        let id = fx.seed_acme().await;
        fx.gateway
            .fail_op(GatewayOp::FetchModelCatalog, GatewayError::Status(500))
            .await;
        let mut session = fx.open(Some(id)).await.unwrap();

        let outcome = session.load_models().await;
        assert_eq!(error_text(&outcome), "failed to load model list");
        assert_eq!(fx.gateway.call_count(GatewayOp::ListEnabledModels).await, 1);
    }

    #[tokio::test]
    async fn enable_and_remove_model_reload_list() {
        let fx = Fixture::new();
        let id = fx.seed_acme().await;
        let mut session = fx.open(Some(id)).await.unwrap();

        let outcome = session.enable_model(" acme-large ").await;
        assert_eq!(
            outcome.notice,
            Some(Notice::Success("model enabled: acme-large".to_string()))
        );
        assert_eq!(session.enabled_models().len(), 1);

        let again = session.enable_model("acme-large").await;
        assert!(again.notice.unwrap().message().contains("already enabled"));

        let association = session.enabled_models()[0].id.clone();
        let declined = session.remove_model(&association, &no).await;
        assert!(declined.is_empty());
        assert_eq!(session.enabled_models().len(), 1);

        session.remove_model(&association, &yes).await;
        assert!(session.enabled_models().is_empty());
    }

    // ==================== Submit Tests ====================

    #[tokio::test]
    async fn submit_rejects_invalid_form_without_calls() {
        let fx = Fixture::new();
        let mut session = fx.open(None).await.unwrap();
        session.form_mut().name = "A".to_string();
        session.form_mut().base_url = "https://api.acme.ai".to_string();

        let outcome = session.submit().await;

        assert!(error_text(&outcome).contains("name"));
        assert!(fx.gateway.calls().await.is_empty());
    }

    #[tokio::test]
    async fn submit_create_navigates_to_new_provider() {
        let fx = Fixture::new();
        let mut session = fx.open(None).await.unwrap();
        let form = session.form_mut();
        form.name = " Acme ".to_string();
        form.api_key = ApiKey::new(" sk-1 ");
        form.base_url = "https://api.acme.ai".to_string();

        let outcome = session.submit().await;

        let id = ProviderId::new("p1");
        assert_eq!(outcome.navigation, Some(Navigation::ToProvider(id.clone())));
        assert_eq!(session.id(), Some(&id));
        assert_eq!(session.state(), SessionState::Ready);

        let cached = fx.store.get_by_id(&id).await.unwrap();
        assert_eq!(cached.name, "Acme");
        assert_eq!(cached.api_key, Some(ApiKey::new("sk-1")));
    }

    #[tokio::test]
    async fn submit_edit_updates_provider() {
        let fx = Fixture::new();
        let id = fx.seed_acme().await;
        let mut session = fx.open(Some(id.clone())).await.unwrap();
        session.form_mut().name = "Acme Cloud".to_string();

        let outcome = session.submit().await;

        assert_eq!(outcome.notice, Some(Notice::Success("changes saved".to_string())));
        assert!(outcome.navigation.is_none());
        assert_eq!(fx.store.get_by_id(&id).await.unwrap().name, "Acme Cloud");
        assert_eq!(session.provider().unwrap().name, "Acme Cloud");
    }

    #[tokio::test]
    async fn submit_keeps_built_in_name_and_kind() {
        let fx = Fixture::new();
        fx.gateway
            .seed_built_in("b1", "OpenAI", "https://api.openai.com/v1")
            .await;
        let mut session = fx.open(Some(ProviderId::new("b1"))).await.unwrap();
        assert!(session.is_built_in());

        let form = session.form_mut();
        form.name = "Renamed".to_string();
        form.kind = "custom".to_string();
        form.api_key = ApiKey::new("sk-openai");
        session.submit().await;

        let remote = &fx.gateway.remote_providers().await[0];
        assert_eq!(remote.name.as_deref(), Some("OpenAI"));
        assert_eq!(remote.kind.as_deref(), Some("built-in"));
        assert_eq!(remote.api_key.as_deref(), Some("sk-openai"));
    }

    // ==================== Delete Tests ====================

    #[tokio::test]
    async fn delete_built_in_is_rejected_without_calls() {
        let fx = Fixture::new();
        fx.gateway
            .seed_built_in("b1", "OpenAI", "https://api.openai.com/v1")
            .await;
        let mut session = fx.open(Some(ProviderId::new("b1"))).await.unwrap();
        fx.gateway.clear_calls().await;

        let outcome = session.delete(&yes).await;

        assert!(error_text(&outcome).contains("built-in"));
        assert!(fx.gateway.calls().await.is_empty());
    }

    #[tokio::test]
    async fn delete_unsaved_is_rejected() {
        let fx = Fixture::new();
        let mut session = fx.open(None).await.unwrap();
        let outcome = session.delete(&yes).await;
        assert!(outcome.notice.unwrap().is_error());
    }

    #[tokio::test]
    async fn declined_delete_is_noop() {
        let fx = Fixture::new();
        let id = fx.seed_acme().await;
        let mut session = fx.open(Some(id)).await.unwrap();
        fx.gateway.clear_calls().await;

        let outcome = session.delete(&no).await;

        assert!(outcome.is_empty());
        assert_eq!(session.state(), SessionState::Ready);
        assert!(fx.gateway.calls().await.is_empty());
    }

    #[tokio::test]
    async fn delete_navigates_away_and_closes_session() {
        let fx = Fixture::new();
        let id = fx.seed_acme().await;
        let mut session = fx.open(Some(id)).await.unwrap();

        let outcome = session.delete(&yes).await;

        assert_eq!(outcome.navigation, Some(Navigation::ToProviderList));
        assert_eq!(session.state(), SessionState::NavigatedAway);
        assert!(fx.gateway.remote_providers().await.is_empty());

        fx.gateway.clear_calls().await;
        assert!(session.submit().await.is_empty());
        assert!(session.test_connection().await.is_empty());
        assert!(fx.gateway.calls().await.is_empty());
    }

    #[tokio::test]
    async fn failed_delete_returns_to_ready() {
        let fx = Fixture::new();
        let id = fx.seed_acme().await;
        fx.gateway
            .fail_op(GatewayOp::DeleteProvider, GatewayError::Status(503))
            .await;
        let mut session = fx.open(Some(id)).await.unwrap();

        let outcome = session.delete(&yes).await;

        assert!(outcome.notice.unwrap().is_error());
        assert!(outcome.navigation.is_none());
        assert_eq!(session.state(), SessionState::Ready);
    }
}
