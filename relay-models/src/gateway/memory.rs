//! In-memory gateway for tests and offline use.
//!
//! `InMemoryGateway` keeps the remote state in process and applies the same
//! rules the remote service does: built-in providers cannot be deleted,
//! deleting a provider removes its associations, and a model can be enabled
//! only once per provider. Failures can be scripted per operation, and every
//! call is recorded so tests can assert which operations ran.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::wire::{WireAssociation, WireProvider, WireProviderDraft};
use super::{GatewayError, GatewayResult, RemoteGateway};
use crate::types::{BUILT_IN_KIND, CUSTOM_KIND};
use crate::{AssociationId, ProviderId, RemoteModel};

/// Error code used for rejected operations.
const REJECTED: i64 = 400;

/// Gateway operation, used for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    ListProviders,
    GetProvider,
    CreateProvider,
    UpdateProvider,
    DeleteProvider,
    TestConnection,
    FetchModelCatalog,
    ListEnabledModels,
    EnableModel,
    DeleteModelAssociation,
}

/// A recorded gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    ListProviders,
    GetProvider(String),
    CreateProvider(WireProviderDraft),
    UpdateProvider(WireProviderDraft),
    DeleteProvider(String),
    TestConnection(String),
    FetchModelCatalog(String),
    ListEnabledModels(String),
    EnableModel { provider_id: String, model_name: String },
    DeleteModelAssociation(String),
}

impl GatewayCall {
    /// The operation this call belongs to.
    pub fn op(&self) -> GatewayOp {
        match self {
            GatewayCall::ListProviders => GatewayOp::ListProviders,
            GatewayCall::GetProvider(_) => GatewayOp::GetProvider,
            GatewayCall::CreateProvider(_) => GatewayOp::CreateProvider,
            GatewayCall::UpdateProvider(_) => GatewayOp::UpdateProvider,
            GatewayCall::DeleteProvider(_) => GatewayOp::DeleteProvider,
            GatewayCall::TestConnection(_) => GatewayOp::TestConnection,
            GatewayCall::FetchModelCatalog(_) => GatewayOp::FetchModelCatalog,
            GatewayCall::ListEnabledModels(_) => GatewayOp::ListEnabledModels,
            GatewayCall::EnableModel { .. } => GatewayOp::EnableModel,
            GatewayCall::DeleteModelAssociation(_) => GatewayOp::DeleteModelAssociation,
        }
    }
}

#[derive(Debug, Default)]
struct RemoteState {
    providers: Vec<WireProvider>,
    associations: Vec<WireAssociation>,
    catalogs: HashMap<String, Vec<RemoteModel>>,
    /// Scripted connection-test failures, by provider id.
    connection_failures: HashMap<String, String>,
    failing: HashMap<GatewayOp, GatewayError>,
    calls: Vec<GatewayCall>,
    next_provider: u64,
    next_association: u64,
}

impl RemoteState {
    fn record(&mut self, call: GatewayCall) -> GatewayResult<()> {
        let op = call.op();
        debug!(?op, "in-memory gateway call");
        self.calls.push(call);
        match self.failing.get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn provider_index(&self, id: &str) -> Option<usize> {
        self.providers.iter().position(|p| p.id == id)
    }

    fn next_provider_id(&mut self) -> String {
        self.next_provider += 1;
        format!("p{}", self.next_provider)
    }

    fn next_association_id(&mut self) -> String {
        self.next_association += 1;
        format!("m{}", self.next_association)
    }
}

/// Apply the non-empty fields of `draft` onto `provider`.
fn apply_draft(provider: &mut WireProvider, draft: WireProviderDraft) {
    if let Some(name) = draft.name {
        provider.name = Some(name);
    }
    if let Some(api_key) = draft.api_key {
        provider.api_key = Some(api_key);
    }
    if let Some(base_url) = draft.base_url {
        provider.base_url = Some(base_url);
    }
    if let Some(logo) = draft.logo {
        provider.logo = Some(logo);
    }
    if let Some(kind) = draft.kind {
        provider.kind = Some(kind);
    }
    if let Some(enabled) = draft.enabled {
        provider.enabled = enabled;
    }
}

/// Blank logos are stored as the generic `custom` icon.
fn normalize_logo(logo: Option<String>) -> Option<String> {
    match logo {
        Some(logo) if !logo.trim().is_empty() => Some(logo),
        _ => Some(CUSTOM_KIND.to_string()),
    }
}

/// Gateway keeping remote state in memory.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    state: Mutex<RemoteState>,
}

impl InMemoryGateway {
    /// Create an empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a provider record as if it already existed remotely.
    pub async fn seed_provider(&self, provider: WireProvider) {
        self.state.lock().await.providers.push(provider);
    }

    /// Seed a built-in provider with the given id and name.
    pub async fn seed_built_in(&self, id: &str, name: &str, base_url: &str) {
        self.seed_provider(WireProvider {
            id: id.to_string(),
            name: Some(name.to_string()),
            logo: Some(name.to_string()),
            kind: Some(BUILT_IN_KIND.to_string()),
            api_key: Some(String::new()),
            base_url: Some(base_url.to_string()),
            enabled: true,
        })
        .await;
    }

    /// Set the upstream catalog returned for a provider.
    pub async fn set_catalog(&self, provider_id: &str, models: Vec<RemoteModel>) {
        self.state
            .lock()
            .await
            .catalogs
            .insert(provider_id.to_string(), models);
    }

    /// Make connection tests for `provider_id` fail with `message`.
    pub async fn fail_connection(&self, provider_id: &str, message: &str) {
        self.state
            .lock()
            .await
            .connection_failures
            .insert(provider_id.to_string(), message.to_string());
    }

    /// Make every call to `op` fail with `error` until cleared.
    pub async fn fail_op(&self, op: GatewayOp, error: GatewayError) {
        self.state.lock().await.failing.insert(op, error);
    }

    /// Stop injecting failures for `op`.
    pub async fn clear_failure(&self, op: GatewayOp) {
        self.state.lock().await.failing.remove(&op);
    }

    /// Snapshot of every call made so far, oldest first.
    pub async fn calls(&self) -> Vec<GatewayCall> {
        self.state.lock().await.calls.clone()
    }

    /// Number of calls made for one operation.
    pub async fn call_count(&self, op: GatewayOp) -> usize {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| c.op() == op)
            .count()
    }

    /// Forget the recorded calls.
    pub async fn clear_calls(&self) {
        self.state.lock().await.calls.clear();
    }

    /// Remote provider records, bypassing the call log.
    pub async fn remote_providers(&self) -> Vec<WireProvider> {
        self.state.lock().await.providers.clone()
    }

    /// Remote association records, bypassing the call log.
    pub async fn remote_associations(&self) -> Vec<WireAssociation> {
        self.state.lock().await.associations.clone()
    }
}

#[async_trait]
impl RemoteGateway for InMemoryGateway {
    async fn list_providers(&self) -> GatewayResult<Vec<WireProvider>> {
        let mut state = self.state.lock().await;
        state.record(GatewayCall::ListProviders)?;
        Ok(state.providers.clone())
    }

    async fn get_provider(&self, id: &ProviderId) -> GatewayResult<Option<WireProvider>> {
        let mut state = self.state.lock().await;
        state.record(GatewayCall::GetProvider(id.to_string()))?;
        Ok(state
            .provider_index(id.as_str())
            .map(|i| state.providers[i].clone()))
    }

    async fn create_provider(&self, draft: WireProviderDraft) -> GatewayResult<ProviderId> {
        let mut state = self.state.lock().await;
        state.record(GatewayCall::CreateProvider(draft.clone()))?;

        let mut draft = draft;
        draft.logo = normalize_logo(draft.logo);

        // A non-built-in provider with the same name is updated in place.
        let existing = state.providers.iter().position(|p| {
            p.name.is_some()
                && p.name == draft.name
                && p.kind.as_deref() != Some(BUILT_IN_KIND)
        });
        if let Some(index) = existing {
            let provider = &mut state.providers[index];
            apply_draft(provider, draft);
            return Ok(ProviderId::new(provider.id.clone()));
        }

        let id = state.next_provider_id();
        let mut provider = WireProvider {
            id: id.clone(),
            name: None,
            logo: None,
            kind: None,
            api_key: None,
            base_url: None,
            enabled: true,
        };
        apply_draft(&mut provider, draft);
        state.providers.push(provider);
        Ok(ProviderId::new(id))
    }

    async fn update_provider(&self, draft: WireProviderDraft) -> GatewayResult<ProviderId> {
        let mut state = self.state.lock().await;
        state.record(GatewayCall::UpdateProvider(draft.clone()))?;

        let Some(id) = draft.id.clone() else {
            return Err(GatewayError::Api {
                code: REJECTED,
                message: "provider id is required".to_string(),
            });
        };
        let index = state
            .provider_index(&id)
            .ok_or_else(|| GatewayError::NotFound(id.clone()))?;
        apply_draft(&mut state.providers[index], draft);
        Ok(ProviderId::new(id))
    }

    async fn delete_provider(&self, id: &ProviderId) -> GatewayResult<()> {
        let mut state = self.state.lock().await;
        state.record(GatewayCall::DeleteProvider(id.to_string()))?;

        let index = state
            .provider_index(id.as_str())
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))?;
        if state.providers[index].kind.as_deref() == Some(BUILT_IN_KIND) {
            return Err(GatewayError::Api {
                code: REJECTED,
                message: "built-in providers cannot be deleted".to_string(),
            });
        }

        state.providers.remove(index);
        state
            .associations
            .retain(|a| a.provider_id.as_deref() != Some(id.as_str()));
        Ok(())
    }

    async fn test_connection(&self, id: &ProviderId) -> GatewayResult<()> {
        let mut state = self.state.lock().await;
        state.record(GatewayCall::TestConnection(id.to_string()))?;

        let index = state
            .provider_index(id.as_str())
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))?;
        let has_key = state.providers[index]
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty());
        if !has_key {
            return Err(GatewayError::Api {
                code: REJECTED,
                message: "provider has no API key".to_string(),
            });
        }
        match state.connection_failures.get(id.as_str()) {
            Some(message) => Err(GatewayError::Api {
                code: REJECTED,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    async fn fetch_model_catalog(
        &self,
        provider_id: &ProviderId,
    ) -> GatewayResult<Vec<RemoteModel>> {
        let mut state = self.state.lock().await;
        state.record(GatewayCall::FetchModelCatalog(provider_id.to_string()))?;

        if state.provider_index(provider_id.as_str()).is_none() {
            return Err(GatewayError::NotFound(provider_id.to_string()));
        }
        Ok(state
            .catalogs
            .get(provider_id.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn list_enabled_models(
        &self,
        provider_id: &ProviderId,
    ) -> GatewayResult<Vec<WireAssociation>> {
        let mut state = self.state.lock().await;
        state.record(GatewayCall::ListEnabledModels(provider_id.to_string()))?;
        Ok(state
            .associations
            .iter()
            .filter(|a| a.provider_id.as_deref() == Some(provider_id.as_str()))
            .cloned()
            .collect())
    }

    async fn enable_model(
        &self,
        provider_id: &ProviderId,
        model_name: &str,
    ) -> GatewayResult<bool> {
        let mut state = self.state.lock().await;
        state.record(GatewayCall::EnableModel {
            provider_id: provider_id.to_string(),
            model_name: model_name.to_string(),
        })?;

        if state.provider_index(provider_id.as_str()).is_none() {
            return Err(GatewayError::NotFound(provider_id.to_string()));
        }
        let duplicate = state.associations.iter().any(|a| {
            a.provider_id.as_deref() == Some(provider_id.as_str()) && a.model_name == model_name
        });
        if duplicate {
            return Ok(false);
        }

        let id = state.next_association_id();
        state.associations.push(WireAssociation {
            id,
            provider_id: Some(provider_id.to_string()),
            model_name: model_name.to_string(),
        });
        Ok(true)
    }

    async fn delete_model_association(&self, id: &AssociationId) -> GatewayResult<()> {
        let mut state = self.state.lock().await;
        state.record(GatewayCall::DeleteModelAssociation(id.to_string()))?;

        let before = state.associations.len();
        state.associations.retain(|a| a.id != id.as_str());
        if state.associations.len() == before {
            return Err(GatewayError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
