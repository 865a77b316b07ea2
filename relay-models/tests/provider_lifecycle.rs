//! End-to-end provider lifecycle against the in-memory gateway
//!
//! These tests drive several sessions over one shared store:
//! - Creating a provider and reopening it by id
//! - Enabling, listing and removing models
//! - Deleting a provider cascades its models

use std::sync::Arc;

use relay_models::gateway::{GatewayOp, InMemoryGateway};
use relay_models::identity::{IconRegistry, IconStyle, LogoResolver, LogoSource};
use relay_models::session::{Navigation, Notice, ProviderSession, SessionState};
use relay_models::{ModelAssociationManager, ProviderId, ProviderStore, RemoteModel};

struct Harness {
    gateway: Arc<InMemoryGateway>,
    store: Arc<ProviderStore>,
    models: Arc<ModelAssociationManager>,
}

fn create_harness() -> Harness {
    let gateway = Arc::new(InMemoryGateway::new());
    Harness {
        store: Arc::new(ProviderStore::new(gateway.clone())),
        models: Arc::new(ModelAssociationManager::new(gateway.clone())),
        gateway,
    }
}

impl Harness {
    async fn open(&self, id: Option<ProviderId>) -> ProviderSession {
        ProviderSession::open(self.store.clone(), self.models.clone(), id)
            .await
            .unwrap()
    }

    async fn create_acme(&self) -> ProviderId {
        let mut session = self.open(None).await;
        let form = session.form_mut();
        form.name = " Acme ".to_string();
        form.api_key = " sk-1 ".into();
        form.base_url = "https://api.acme.ai".to_string();

        match session.submit().await.navigation {
            Some(Navigation::ToProvider(id)) => id,
            other => panic!("expected navigation to new provider, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn created_provider_is_cached_and_reopens() {
    let h = create_harness();
    let id = h.create_acme().await;

    assert_eq!(id, ProviderId::new("p1"));
    let cached = h.store.list().await;
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].name, "Acme");
    assert_eq!(cached[0].api_key.as_ref().unwrap().expose_secret(), "sk-1");
    assert_eq!(cached[0].logo.as_deref(), Some("custom"));

    let session = h.open(Some(id)).await;
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.form().name, "Acme");
    assert!(session.enabled_models().is_empty());
}

#[tokio::test]
async fn refresh_twice_yields_same_cache() {
    let h = create_harness();
    h.create_acme().await;
    h.gateway.seed_built_in("openai", "OpenAI", "https://api.openai.com/v1").await;

    h.store.refresh().await.unwrap();
    let first = h.store.list().await;
    h.store.refresh().await.unwrap();
    assert_eq!(h.store.list().await, first);
    assert_eq!(first.len(), 2);
}

#[tokio::test]
async fn model_flow_keeps_cache_in_step_with_remote() {
    let h = create_harness();
    let id = h.create_acme().await;
    h.gateway
        .set_catalog(
            id.as_str(),
            vec![RemoteModel::new("acme-large"), RemoteModel::new("acme-small")],
        )
        .await;

    let mut session = h.open(Some(id.clone())).await;
    session.load_models().await;
    assert_eq!(session.catalog().len(), 2);

    session.enable_model("acme-large").await;
    session.enable_model("acme-small").await;
    assert_eq!(session.enabled_models().len(), 2);
    assert_eq!(h.models.cached(&id).await.len(), 2);

    let target = session.enabled_models()[0].id.clone();
    let outcome = session.remove_model(&target, &|_: &str| true).await;
    assert_eq!(outcome.notice, Some(Notice::Success("model removed".to_string())));

    let remaining: Vec<String> = h
        .gateway
        .remote_associations()
        .await
        .into_iter()
        .map(|a| a.model_name)
        .collect();
    assert_eq!(remaining, vec!["acme-small"]);
    assert_eq!(session.enabled_models().len(), 1);
}

#[tokio::test]
async fn delete_cascades_models_and_updates_other_sessions_store() {
    let h = create_harness();
    let id = h.create_acme().await;
    let mut editor = h.open(Some(id.clone())).await;
    editor.enable_model("acme-large").await;

    let mut other = h.open(Some(id.clone())).await;
    assert_eq!(other.enabled_models().len(), 1);

    let outcome = other.delete(&|_: &str| true).await;
    assert_eq!(outcome.navigation, Some(Navigation::ToProviderList));
    assert!(h.store.list().await.is_empty());
    assert!(h.gateway.remote_associations().await.is_empty());

    // The first screen is stale; saving now fails remotely and says so.
    let saved = editor.submit().await;
    assert!(saved.notice.unwrap().is_error());
    assert_eq!(editor.state(), SessionState::Ready);
}

#[tokio::test]
async fn built_in_provider_survives_every_edit() {
    let h = create_harness();
    h.gateway.seed_built_in("openai", "OpenAI", "https://api.openai.com/v1").await;
    h.store.refresh().await.unwrap();

    let mut session = h.open(Some(ProviderId::new("openai"))).await;
    session.form_mut().name = "Not OpenAI".to_string();
    session.submit().await;

    h.gateway.clear_calls().await;
    let outcome = session.delete(&|_: &str| true).await;
    assert!(outcome.notice.unwrap().is_error());
    assert_eq!(h.gateway.call_count(GatewayOp::DeleteProvider).await, 0);

    let cached = h.store.get_by_id(&ProviderId::new("openai")).await.unwrap();
    assert_eq!(cached.name, "OpenAI");
    assert!(cached.is_built_in());
}

#[tokio::test]
async fn logos_resolve_for_stored_providers() {
    let h = create_harness();
    h.create_acme().await;
    h.gateway.seed_built_in("openai", "OpenAI", "https://api.openai.com/v1").await;
    h.store.refresh().await.unwrap();

    let registry = IconRegistry::builtin();
    let sources: Vec<LogoSource> = h
        .store
        .list()
        .await
        .iter()
        .map(|p| LogoResolver::for_provider(p).resolve(&registry, IconStyle::Text))
        .collect();

    assert_eq!(
        sources[0],
        LogoSource::Image("https://api.acme.ai/favicon.ico".to_string())
    );
    assert!(matches!(&sources[1], LogoSource::Icon(icon) if icon.name == "OpenAI"));
}
