//! Wire-schema records exchanged with the remote gateway.
//!
//! Field names follow the remote schema (`api_key`, `base_url`, `type`).
//! Translation to and from the domain types happens here and nowhere else.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    ApiKey, AssociationId, ModelAssociation, Provider, ProviderDraft, ProviderId, ProviderKind,
};

/// Provider record as returned by the remote side.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireProvider {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default, deserialize_with = "de_flag")]
    pub enabled: bool,
}

impl fmt::Debug for WireProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WireProvider")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("logo", &self.logo)
            .field("kind", &self.kind)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl From<WireProvider> for Provider {
    fn from(wire: WireProvider) -> Self {
        Self {
            id: ProviderId::new(wire.id),
            name: wire.name.unwrap_or_default(),
            api_key: wire.api_key.map(ApiKey::new),
            base_url: wire.base_url.unwrap_or_default(),
            logo: wire.logo,
            kind: wire.kind.map(ProviderKind::from).unwrap_or_default(),
            enabled: wire.enabled,
        }
    }
}

/// Provider payload sent on create (no id) and update (with id).
///
/// Absent fields are omitted from the serialized body.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireProviderDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl fmt::Debug for WireProviderDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WireProviderDraft")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("logo", &self.logo)
            .field("kind", &self.kind)
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl From<&ProviderDraft> for WireProviderDraft {
    fn from(draft: &ProviderDraft) -> Self {
        Self {
            id: draft.id.as_ref().map(|id| id.as_str().to_string()),
            name: draft.name.clone(),
            api_key: draft
                .api_key
                .as_ref()
                .map(|key| key.expose_secret().to_string()),
            base_url: draft.base_url.clone(),
            logo: draft.logo.clone(),
            kind: draft.kind.clone(),
            enabled: draft.enabled,
        }
    }
}

/// Enabled-model association record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireAssociation {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub provider_id: Option<String>,
    pub model_name: String,
}

impl WireAssociation {
    /// Convert to a domain association, filling in the provider it was listed under
    /// when the record omits it.
    pub fn into_association(self, listed_under: &ProviderId) -> ModelAssociation {
        ModelAssociation {
            id: AssociationId::new(self.id),
            provider_id: self
                .provider_id
                .map(ProviderId::new)
                .unwrap_or_else(|| listed_under.clone()),
            model_name: self.model_name,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Text(String),
    Number(i64),
}

impl From<IdRepr> for String {
    fn from(id: IdRepr) -> Self {
        match id {
            IdRepr::Text(s) => s,
            IdRepr::Number(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagRepr {
    Bool(bool),
    Number(i64),
}

/// Accept ids encoded either as strings or integers.
pub(crate) fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    IdRepr::deserialize(deserializer).map(String::from)
}

fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<IdRepr>::deserialize(deserializer)?.map(String::from))
}

/// Accept `true`/`false`, `0`/`1` or `null` (treated as disabled).
fn de_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<FlagRepr>::deserialize(deserializer)? {
        Some(FlagRepr::Bool(b)) => b,
        Some(FlagRepr::Number(n)) => n != 0,
        None => false,
    })
}
