//! HTTP gateway backed by `reqwest`.
//!
//! Every response body is wrapped in an envelope:
//!
//! ```text
//! { "code": 0, "msg": "success", "data": ... }
//! ```
//!
//! A non-zero `code` is an application error and becomes
//! [`GatewayError::Api`] carrying `msg`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use super::wire::{WireAssociation, WireProvider, WireProviderDraft, de_id};
use super::{GatewayError, GatewayResult, RemoteGateway};
use crate::{AssociationId, ProviderId, RemoteModel};

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Response envelope used by every endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    msg: String,
    data: Option<T>,
}

impl<T> Envelope<T> {
    fn into_result(self) -> GatewayResult<Option<T>> {
        if self.code != 0 {
            return Err(GatewayError::Api {
                code: self.code,
                message: self.msg,
            });
        }
        Ok(self.data)
    }
}

/// `data` payload of the create/update endpoints.
#[derive(Debug, Deserialize)]
struct IdData(#[serde(deserialize_with = "de_id")] String);

/// Catalog payload: either `{ "models": [...] }` or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogData {
    Bare(Vec<CatalogItem>),
    Wrapped { models: Vec<CatalogItem> },
}

/// Catalog entries may be plain model names or full descriptors.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogItem {
    Name(String),
    Model(RemoteModel),
}

impl From<CatalogItem> for RemoteModel {
    fn from(item: CatalogItem) -> Self {
        match item {
            CatalogItem::Name(id) => RemoteModel::new(id),
            CatalogItem::Model(model) => model,
        }
    }
}

impl CatalogData {
    fn into_models(self) -> Vec<RemoteModel> {
        let items = match self {
            CatalogData::Bare(models) => models,
            CatalogData::Wrapped { models } => models,
        };
        items.into_iter().map(RemoteModel::from).collect()
    }
}

/// Decode an envelope body into its `data` payload.
fn decode_envelope<T: DeserializeOwned>(body: &[u8]) -> GatewayResult<Option<T>> {
    let envelope: Envelope<T> =
        serde_json::from_slice(body).map_err(|e| GatewayError::Decode(e.to_string()))?;
    envelope.into_result()
}

/// Gateway talking to the provider/model JSON API over HTTP.
pub struct HttpGateway {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpGateway {
    /// Create a gateway for the API rooted at `base_url`, using the default timeout.
    pub fn new(base_url: &str) -> GatewayResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a gateway with a custom request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> GatewayResult<Self> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| GatewayError::Request(format!("invalid gateway URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::Request(format!(
                "gateway URL cannot be used as a base: {base_url}"
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Request(e.to_string()))?;
        Ok(Self { base_url, client })
    }

    /// Get the API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL by appending path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> GatewayResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::Request(format!("invalid gateway URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<Value>,
    ) -> GatewayResult<Option<T>> {
        let url = self.endpoint(segments)?;
        debug!(%method, %url, "gateway request");

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound(segments.join("/")));
        }
        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;
        decode_envelope(&body)
    }

    fn to_body<T: serde::Serialize>(value: &T) -> GatewayResult<Value> {
        serde_json::to_value(value).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

/// Treat an explicit `data: false` as "nothing was there to act on".
fn ensure_acknowledged(data: Option<Value>, what: &str) -> GatewayResult<()> {
    match data {
        Some(Value::Bool(false)) => Err(GatewayError::NotFound(what.to_string())),
        _ => Ok(()),
    }
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn list_providers(&self) -> GatewayResult<Vec<WireProvider>> {
        let data: Option<Vec<WireProvider>> =
            self.call(Method::GET, &["get_all_providers"], None).await?;
        Ok(data.unwrap_or_default())
    }

    async fn get_provider(&self, id: &ProviderId) -> GatewayResult<Option<WireProvider>> {
        match self
            .call(Method::GET, &["get_provider_by_id", id.as_str()], None)
            .await
        {
            Err(GatewayError::NotFound(_)) => Ok(None),
            other => other,
        }
    }

    async fn create_provider(&self, draft: WireProviderDraft) -> GatewayResult<ProviderId> {
        let body = Self::to_body(&draft)?;
        let data: Option<IdData> = self.call(Method::POST, &["add_provider"], Some(body)).await?;
        data.map(|IdData(id)| ProviderId::new(id))
            .ok_or_else(|| GatewayError::Decode("create response carried no id".to_string()))
    }

    async fn update_provider(&self, draft: WireProviderDraft) -> GatewayResult<ProviderId> {
        let body = Self::to_body(&draft)?;
        let data: Option<IdData> = self
            .call(Method::POST, &["update_provider"], Some(body))
            .await?;
        match (data, draft.id) {
            (Some(IdData(id)), _) => Ok(ProviderId::new(id)),
            (None, Some(id)) => Ok(ProviderId::new(id)),
            (None, None) => Err(GatewayError::Decode("update response carried no id".to_string())),
        }
    }

    async fn delete_provider(&self, id: &ProviderId) -> GatewayResult<()> {
        let data: Option<Value> = self
            .call(Method::DELETE, &["delete_provider", id.as_str()], None)
            .await?;
        ensure_acknowledged(data, id.as_str())
    }

    async fn test_connection(&self, id: &ProviderId) -> GatewayResult<()> {
        let data: Option<Value> = self
            .call(
                Method::POST,
                &["connect_test"],
                Some(json!({ "id": id.as_str() })),
            )
            .await?;
        match data {
            Some(Value::Bool(false)) => Err(GatewayError::Api {
                code: -1,
                message: String::new(),
            }),
            _ => Ok(()),
        }
    }

    async fn fetch_model_catalog(
        &self,
        provider_id: &ProviderId,
    ) -> GatewayResult<Vec<RemoteModel>> {
        let data: Option<CatalogData> = self
            .call(Method::GET, &["model_list", provider_id.as_str()], None)
            .await?;
        Ok(data.map(CatalogData::into_models).unwrap_or_default())
    }

    async fn list_enabled_models(
        &self,
        provider_id: &ProviderId,
    ) -> GatewayResult<Vec<WireAssociation>> {
        let data: Option<Vec<WireAssociation>> = self
            .call(Method::GET, &["model_enable", provider_id.as_str()], None)
            .await?;
        Ok(data.unwrap_or_default())
    }

    async fn enable_model(
        &self,
        provider_id: &ProviderId,
        model_name: &str,
    ) -> GatewayResult<bool> {
        let body = json!({
            "provider_id": provider_id.as_str(),
            "model_name": model_name,
        });
        let data: Option<bool> = self.call(Method::POST, &["models"], Some(body)).await?;
        Ok(data.unwrap_or(true))
    }

    async fn delete_model_association(&self, id: &AssociationId) -> GatewayResult<()> {
        let data: Option<Value> = self
            .call(Method::DELETE, &["delete_model", id.as_str()], None)
            .await?;
        ensure_acknowledged(data, id.as_str())
    }
}
