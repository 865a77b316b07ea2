//! Enabled-model associations per provider.
//!
//! The manager never patches its cache after a mutation. Association state
//! is always re-derived from the gateway: callers reload with
//! [`ModelAssociationManager::load_by_provider_id`] after enabling or
//! deleting a model.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::gateway::RemoteGateway;
use crate::{AssociationId, ModelAssociation, ProviderId, RemoteModel, Result};

/// Per-provider cache of enabled models.
pub struct ModelAssociationManager {
    gateway: Arc<dyn RemoteGateway>,
    enabled: RwLock<HashMap<ProviderId, Vec<ModelAssociation>>>,
}

impl ModelAssociationManager {
    pub fn new(gateway: Arc<dyn RemoteGateway>) -> Self {
        Self {
            gateway,
            enabled: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch the enabled-model set for a provider and replace the cached copy.
    ///
    /// A provider without enabled models yields an empty vec.
    pub async fn load_by_provider_id(
        &self,
        provider_id: &ProviderId,
    ) -> Result<Vec<ModelAssociation>> {
        let records = self.gateway.list_enabled_models(provider_id).await?;
        let associations: Vec<ModelAssociation> = records
            .into_iter()
            .map(|r| r.into_association(provider_id))
            .collect();

        debug!(provider = %provider_id, count = associations.len(), "enabled models loaded");
        self.enabled
            .write()
            .await
            .insert(provider_id.clone(), associations.clone());
        Ok(associations)
    }

    /// Cached enabled models for a provider. No network call.
    pub async fn cached(&self, provider_id: &ProviderId) -> Vec<ModelAssociation> {
        self.enabled
            .read()
            .await
            .get(provider_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Ask the gateway for the provider's upstream catalog.
    ///
    /// Does not touch associations; follow up with
    /// [`load_by_provider_id`](Self::load_by_provider_id) to pick up any
    /// remote-side changes.
    pub async fn refresh_catalog(&self, provider_id: &ProviderId) -> Result<Vec<RemoteModel>> {
        let models = self.gateway.fetch_model_catalog(provider_id).await?;
        debug!(provider = %provider_id, count = models.len(), "model catalog fetched");
        Ok(models)
    }

    /// Enable an upstream model for a provider.
    ///
    /// Returns `false` when the model was already enabled.
    pub async fn enable_model(&self, provider_id: &ProviderId, model_name: &str) -> Result<bool> {
        let created = self.gateway.enable_model(provider_id, model_name).await?;
        if created {
            info!(provider = %provider_id, model = model_name, "model enabled");
        } else {
            debug!(provider = %provider_id, model = model_name, "model already enabled");
        }
        Ok(created)
    }

    /// Remove one association. The cache is not patched.
    pub async fn delete_association(&self, association_id: &AssociationId) -> Result<()> {
        self.gateway.delete_model_association(association_id).await?;
        info!(association = %association_id, "model association deleted");
        Ok(())
    }
}

/// Filter a catalog by whitespace-separated keywords.
///
/// Matching is case-insensitive and every keyword must occur in the model
/// id. A blank query matches everything.
pub fn filter_catalog<'a>(models: &'a [RemoteModel], query: &str) -> Vec<&'a RemoteModel> {
    let keywords: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    models
        .iter()
        .filter(|m| {
            let id = m.id.to_lowercase();
            keywords.iter().all(|kw| id.contains(kw.as_str()))
        })
        .collect()
}
