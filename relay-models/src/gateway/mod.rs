//! Remote gateway trait and implementations.
//!
//! The [`RemoteGateway`] trait is the boundary to the remote source of truth
//! for providers and their enabled models. Everything above it (stores,
//! session controller) only ever sees wire records from [`wire`] and
//! [`GatewayError`]s.
//!
//! Two implementations ship with the crate:
//!
//! - [`HttpGateway`] - talks to the JSON API over HTTP
//! - [`InMemoryGateway`] - keeps remote state in memory, with failure
//!   injection and a call log for tests
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use relay_models::gateway::{HttpGateway, RemoteGateway};
//! use relay_models::store::ProviderStore;
//!
//! let gateway: Arc<dyn RemoteGateway> = Arc::new(HttpGateway::new("http://127.0.0.1:8483/api")?);
//! let store = ProviderStore::new(gateway);
//! store.refresh().await?;
//! ```

mod http;
mod memory;
pub mod wire;

use async_trait::async_trait;
use thiserror::Error;

pub use http::HttpGateway;
pub use memory::{GatewayCall, GatewayOp, InMemoryGateway};
pub use wire::{WireAssociation, WireProvider, WireProviderDraft};

use crate::{AssociationId, ProviderId, RemoteModel};

/// Result type for gateway calls.
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Errors reported by a [`RemoteGateway`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Transport-level failure (connection refused, timeout, ...).
    #[error("request failed: {0}")]
    Request(String),

    /// Non-success HTTP status.
    #[error("unexpected status {0}")]
    Status(u16),

    /// The remote side rejected the call with an application error.
    #[error("remote error {code}: {message}")]
    Api { code: i64, message: String },

    /// The addressed record does not exist remotely.
    #[error("not found: {0}")]
    NotFound(String),

    /// Response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Message suitable for showing to a user, when the remote side sent one.
    ///
    /// Only application errors carry a remote message; transport and decode
    /// failures return `None` so callers can fall back to a generic text.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            GatewayError::Api { message, .. } if !message.trim().is_empty() => {
                Some(message.trim())
            }
            _ => None,
        }
    }
}

/// Async boundary to the remote provider/model service.
///
/// Implementations perform the actual I/O. They are expected to enforce
/// remote-side invariants (association uniqueness, cascading deletes) that
/// the local caches do not re-validate.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// List every provider, in remote order.
    async fn list_providers(&self) -> GatewayResult<Vec<WireProvider>>;

    /// Fetch one provider; `Ok(None)` when it does not exist.
    async fn get_provider(&self, id: &ProviderId) -> GatewayResult<Option<WireProvider>>;

    /// Create a provider and return its new id.
    async fn create_provider(&self, draft: WireProviderDraft) -> GatewayResult<ProviderId>;

    /// Update an existing provider; `draft.id` must be set.
    async fn update_provider(&self, draft: WireProviderDraft) -> GatewayResult<ProviderId>;

    /// Delete a provider and, remotely, all of its associations.
    async fn delete_provider(&self, id: &ProviderId) -> GatewayResult<()>;

    /// Verify the stored credentials reach the provider.
    async fn test_connection(&self, id: &ProviderId) -> GatewayResult<()>;

    /// Fetch the provider's upstream model catalog.
    async fn fetch_model_catalog(&self, provider_id: &ProviderId)
    -> GatewayResult<Vec<RemoteModel>>;

    /// List the models currently enabled for a provider.
    async fn list_enabled_models(
        &self,
        provider_id: &ProviderId,
    ) -> GatewayResult<Vec<WireAssociation>>;

    /// Enable an upstream model; returns `false` if it was already enabled.
    async fn enable_model(&self, provider_id: &ProviderId, model_name: &str)
    -> GatewayResult<bool>;

    /// Remove a single enabled-model association.
    async fn delete_model_association(&self, id: &AssociationId) -> GatewayResult<()>;
}
