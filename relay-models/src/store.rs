//! Provider store: the canonical in-memory provider list.
//!
//! `ProviderStore` mediates every provider read and write against a
//! [`RemoteGateway`]. Mutations never patch the cache locally; each
//! successful create, update or delete is followed by a full [`refresh`],
//! so the cache always mirrors the remote list. The cache is only ever
//! replaced as a whole ([`refresh`] / [`replace`]), which keeps concurrent
//! refreshes safe: the last one to complete wins.
//!
//! [`refresh`]: ProviderStore::refresh
//! [`replace`]: ProviderStore::replace

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::gateway::{RemoteGateway, WireProviderDraft};
use crate::{Error, Provider, ProviderDraft, ProviderId, Result};

/// Owned cache of providers backed by a remote gateway.
pub struct ProviderStore {
    gateway: Arc<dyn RemoteGateway>,
    providers: RwLock<Vec<Provider>>,
}

impl ProviderStore {
    /// Create an empty store. Call [`refresh`](Self::refresh) to populate it.
    pub fn new(gateway: Arc<dyn RemoteGateway>) -> Self {
        Self {
            gateway,
            providers: RwLock::new(Vec::new()),
        }
    }

    /// Current cached providers, in remote order. No network call.
    pub async fn list(&self) -> Vec<Provider> {
        self.providers.read().await.clone()
    }

    /// Cached provider by id.
    pub async fn get_by_id(&self, id: &ProviderId) -> Option<Provider> {
        self.providers
            .read()
            .await
            .iter()
            .find(|p| &p.id == id)
            .cloned()
    }

    /// Replace the whole cache.
    pub async fn replace(&self, providers: Vec<Provider>) {
        *self.providers.write().await = providers;
    }

    /// Reload the full provider list from the gateway.
    ///
    /// On failure the cache is left untouched.
    pub async fn refresh(&self) -> Result<()> {
        let records = self.gateway.list_providers().await.map_err(|e| {
            warn!(error = %e, "failed to fetch provider list");
            Error::from(e)
        })?;
        let providers: Vec<Provider> = records.into_iter().map(Provider::from).collect();
        debug!(count = providers.len(), "provider cache refreshed");
        self.replace(providers).await;
        Ok(())
    }

    /// Fetch one provider straight from the gateway, bypassing the cache.
    ///
    /// Used to seed edit forms with authoritative values; every string field
    /// is trimmed. Returns `Ok(None)` when the provider does not exist.
    pub async fn load_by_id(&self, id: &ProviderId) -> Result<Option<Provider>> {
        let record = self.gateway.get_provider(id).await.map_err(|e| {
            warn!(provider = %id, error = %e, "failed to load provider");
            Error::from(e)
        })?;
        Ok(record.map(|r| Provider::from(r).trimmed()))
    }

    /// Create a provider and refresh the cache.
    ///
    /// Returns the id assigned by the gateway. A failed refresh after a
    /// successful create is logged but does not fail the call.
    pub async fn create(&self, draft: ProviderDraft) -> Result<ProviderId> {
        let draft = draft.sanitized();
        let mut payload = WireProviderDraft::from(&draft);
        payload.id = None;

        let id = self.gateway.create_provider(payload).await.map_err(|e| {
            warn!(error = %e, "failed to create provider");
            Error::from(e)
        })?;
        info!(provider = %id, "provider created");

        self.refresh_after_mutation().await;
        Ok(id)
    }

    /// Update an existing provider and refresh the cache.
    ///
    /// The draft must carry an id; otherwise the call is rejected without
    /// reaching the gateway.
    pub async fn update(&self, draft: ProviderDraft) -> Result<ProviderId> {
        if draft.id.is_none() {
            return Err(Error::MissingField("id"));
        }
        let draft = draft.sanitized();

        let id = self
            .gateway
            .update_provider(WireProviderDraft::from(&draft))
            .await
            .map_err(|e| {
                warn!(error = %e, "failed to update provider");
                Error::from(e)
            })?;
        info!(provider = %id, "provider updated");

        self.refresh_after_mutation().await;
        Ok(id)
    }

    /// Delete a provider and refresh the cache.
    ///
    /// Built-in providers are rejected before any gateway call. The remote
    /// side removes the provider's model associations.
    pub async fn delete(&self, id: &ProviderId) -> Result<()> {
        if let Some(provider) = self.get_by_id(id).await
            && provider.is_built_in()
        {
            debug!(provider = %id, "refusing to delete built-in provider");
            return Err(Error::BuiltInProtected(id.to_string()));
        }

        self.gateway.delete_provider(id).await.map_err(|e| {
            warn!(provider = %id, error = %e, "failed to delete provider");
            Error::from(e)
        })?;
        info!(provider = %id, "provider deleted");

        self.refresh_after_mutation().await;
        Ok(())
    }

    /// Ask the gateway to verify a persisted provider's connectivity.
    pub async fn test_connection(&self, id: &ProviderId) -> Result<()> {
        self.gateway.test_connection(id).await.map_err(|e| {
            warn!(provider = %id, error = %e, "connection test failed");
            Error::from(e)
        })?;
        info!(provider = %id, "connection test succeeded");
        Ok(())
    }

    async fn refresh_after_mutation(&self) {
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "provider cache may be stale after mutation");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayCall, GatewayError, GatewayOp, InMemoryGateway, WireProvider};
    use crate::{ApiKey, ProviderKind};

    fn create_test_store() -> (Arc<InMemoryGateway>, ProviderStore) {
        let gateway = Arc::new(InMemoryGateway::new());
        let store = ProviderStore::new(gateway.clone());
        (gateway, store)
    }

    fn acme() -> ProviderDraft {
        ProviderDraft {
            name: Some("Acme".to_string()),
            base_url: Some("https://api.acme.ai".to_string()),
            kind: Some("custom".to_string()),
            ..Default::default()
        }
    }

    // ==================== Refresh Tests ====================

    #[tokio::test]
    async fn list_is_empty_before_refresh() {
        let (gateway, store) = create_test_store();
        gateway
            .seed_built_in("ds", "DeepSeek", "https://api.deepseek.com")
            .await;

        assert!(store.list().await.is_empty());
        assert!(gateway.calls().await.is_empty());
    }

    #[tokio::test]
    async fn refresh_is_idempotent() {
        let (gateway, store) = create_test_store();
        gateway
            .seed_built_in("ds", "DeepSeek", "https://api.deepseek.com")
            .await;
        store.create(acme()).await.unwrap();

        store.refresh().await.unwrap();
        let first = store.list().await;
        store.refresh().await.unwrap();
        let second = store.list().await;

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].id.as_str(), "ds");
    }

    #[tokio::test]
    async fn refresh_failure_keeps_cache() {
        let (gateway, store) = create_test_store();
        store.create(acme()).await.unwrap();
        gateway
            .fail_op(
                GatewayOp::ListProviders,
                GatewayError::Request("connection refused".to_string()),
            )
            .await;

        assert!(store.refresh().await.is_err());
        assert_eq!(store.list().await.len(), 1);
    }

    #[tokio::test]
    async fn refresh_translates_wire_fields() {
        let (gateway, store) = create_test_store();
        gateway
            .seed_provider(WireProvider {
                id: "p9".to_string(),
                name: Some("Moonshot".to_string()),
                logo: Some("Moonshot".to_string()),
                kind: Some("custom".to_string()),
                api_key: Some("sk-moon".to_string()),
                base_url: Some("https://api.moonshot.cn/v1".to_string()),
                enabled: false,
            })
            .await;

        store.refresh().await.unwrap();
        let provider = store.get_by_id(&ProviderId::new("p9")).await.unwrap();

        assert_eq!(provider.api_key, Some(ApiKey::new("sk-moon")));
        assert_eq!(provider.base_url, "https://api.moonshot.cn/v1");
        assert!(!provider.enabled);
    }

    // ==================== Create / Update Tests ====================

    #[tokio::test]
    async fn create_refreshes_cache_with_new_provider() {
        let (_gateway, store) = create_test_store();

        let id = store.create(acme()).await.unwrap();

        assert_eq!(id.as_str(), "p1");
        let providers = store.list().await;
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].id, id);
        assert_eq!(providers[0].name, "Acme");
    }

    #[tokio::test]
    async fn create_sends_sanitized_payload() {
        let (gateway, store) = create_test_store();
        let draft = ProviderDraft {
            id: Some(ProviderId::new("ignored")),
            name: Some("  Acme  ".to_string()),
            api_key: Some(ApiKey::new(" sk-1 ")),
            base_url: Some(" https://api.acme.ai ".to_string()),
            logo: Some(" ".to_string()),
            kind: Some(" custom".to_string()),
            enabled: None,
        };

        store.create(draft).await.unwrap();

        let calls = gateway.calls().await;
        let GatewayCall::CreateProvider(payload) = &calls[0] else {
            panic!("expected a create call first, got {calls:?}");
        };
        assert!(payload.id.is_none());
        assert_eq!(payload.name.as_deref(), Some("Acme"));
        assert_eq!(payload.api_key.as_deref(), Some("sk-1"));
        assert_eq!(payload.base_url.as_deref(), Some("https://api.acme.ai"));
        assert_eq!(payload.logo.as_deref(), Some(""));
        assert_eq!(payload.kind.as_deref(), Some("custom"));
        assert!(payload.enabled.is_none());
    }

    #[tokio::test]
    async fn create_failure_is_reported_and_skips_refresh() {
        let (gateway, store) = create_test_store();
        gateway
            .fail_op(
                GatewayOp::CreateProvider,
                GatewayError::Api {
                    code: 500,
                    message: "database locked".to_string(),
                },
            )
            .await;

        let result = store.create(acme()).await;

        assert!(matches!(result, Err(Error::Gateway(_))));
        assert_eq!(gateway.call_count(GatewayOp::ListProviders).await, 0);
    }

    #[tokio::test]
    async fn create_succeeds_even_if_refresh_fails() {
        let (gateway, store) = create_test_store();
        gateway
            .fail_op(GatewayOp::ListProviders, GatewayError::Status(503))
            .await;

        let id = store.create(acme()).await.unwrap();

        assert_eq!(id.as_str(), "p1");
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn update_requires_id() {
        let (gateway, store) = create_test_store();

        let result = store.update(acme()).await;

        assert!(matches!(result, Err(Error::MissingField("id"))));
        assert!(gateway.calls().await.is_empty());
    }

    #[tokio::test]
    async fn update_trims_and_refreshes() {
        let (_gateway, store) = create_test_store();
        let id = store.create(acme()).await.unwrap();

        let draft = ProviderDraft {
            id: Some(id.clone()),
            name: Some(" Acme AI ".to_string()),
            ..Default::default()
        };
        store.update(draft).await.unwrap();

        let provider = store.get_by_id(&id).await.unwrap();
        assert_eq!(provider.name, "Acme AI");
        assert_eq!(provider.base_url, "https://api.acme.ai");
    }

    // ==================== Load Tests ====================

    #[tokio::test]
    async fn load_by_id_bypasses_cache_and_trims() {
        let (gateway, store) = create_test_store();
        gateway
            .seed_provider(WireProvider {
                id: "p5".to_string(),
                name: Some(" Zhipu ".to_string()),
                logo: Some(" Zhipu".to_string()),
                kind: Some("custom ".to_string()),
                api_key: Some(" key ".to_string()),
                base_url: Some(" https://open.bigmodel.cn/api/paas/v4 ".to_string()),
                enabled: true,
            })
            .await;

        let provider = store
            .load_by_id(&ProviderId::new("p5"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(provider.name, "Zhipu");
        assert_eq!(provider.api_key, Some(ApiKey::new("key")));
        assert_eq!(provider.base_url, "https://open.bigmodel.cn/api/paas/v4");
        assert_eq!(provider.kind, ProviderKind::Custom("custom".to_string()));
        assert!(store.list().await.is_empty(), "load must not touch the cache");
    }

    #[tokio::test]
    async fn load_by_id_returns_none_when_missing() {
        let (_gateway, store) = create_test_store();
        let loaded = store.load_by_id(&ProviderId::new("nope")).await.unwrap();
        assert!(loaded.is_none());
    }

    // ==================== Delete Tests ====================

    #[tokio::test]
    async fn delete_built_in_issues_no_gateway_call() {
        let (gateway, store) = create_test_store();
        gateway
            .seed_built_in("ds", "DeepSeek", "https://api.deepseek.com")
            .await;
        store.refresh().await.unwrap();
        gateway.clear_calls().await;

        let result = store.delete(&ProviderId::new("ds")).await;

        assert!(matches!(result, Err(Error::BuiltInProtected(_))));
        assert!(gateway.calls().await.is_empty());
        assert_eq!(store.list().await.len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_provider_and_refreshes() {
        let (_gateway, store) = create_test_store();
        let id = store.create(acme()).await.unwrap();

        store.delete(&id).await.unwrap();

        assert!(store.get_by_id(&id).await.is_none());
    }

    #[tokio::test]
    async fn delete_failure_is_reported() {
        let (_gateway, store) = create_test_store();
        let result = store.delete(&ProviderId::new("missing")).await;
        assert!(matches!(result, Err(Error::Gateway(GatewayError::NotFound(_)))));
    }
}
