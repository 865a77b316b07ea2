//! Core types for provider and model management.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Provider type value reserved for system-seeded providers.
pub const BUILT_IN_KIND: &str = "built-in";

/// Provider type assigned to user-created providers by default.
pub const CUSTOM_KIND: &str = "custom";

/// Opaque provider identifier assigned by the remote side.
///
/// # Examples
///
/// ```
/// use relay_models::ProviderId;
///
/// let id = ProviderId::new("p1");
/// assert_eq!(id.as_str(), "p1");
/// assert_eq!(id.to_string(), "p1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    /// Create a provider ID from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProviderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identifier of an enabled-model association record.
///
/// Distinct from the upstream model's catalog id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssociationId(String);

impl AssociationId {
    /// Create an association ID from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssociationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssociationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Classification of a provider.
///
/// `BuiltIn` providers are seeded by the system: they cannot be deleted and
/// their name and type are locked. Every other value is user-defined.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    BuiltIn,
    Custom(String),
}

impl ProviderKind {
    /// Get the wire representation of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            ProviderKind::BuiltIn => BUILT_IN_KIND,
            ProviderKind::Custom(kind) => kind,
        }
    }

    pub fn is_built_in(&self) -> bool {
        matches!(self, ProviderKind::BuiltIn)
    }
}

impl Default for ProviderKind {
    fn default() -> Self {
        ProviderKind::Custom(CUSTOM_KIND.to_string())
    }
}

impl From<&str> for ProviderKind {
    fn from(s: &str) -> Self {
        if s == BUILT_IN_KIND {
            ProviderKind::BuiltIn
        } else {
            ProviderKind::Custom(s.to_string())
        }
    }
}

impl From<String> for ProviderKind {
    fn from(s: String) -> Self {
        if s == BUILT_IN_KIND {
            ProviderKind::BuiltIn
        } else {
            ProviderKind::Custom(s)
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provider API key that prevents accidental logging.
///
/// The key is wrapped in `SecretString`, so `Debug` never prints it and the
/// memory is zeroized on drop. Blank keys are allowed for providers that do
/// not need authentication.
#[derive(Clone)]
pub struct ApiKey(SecretString);

impl ApiKey {
    /// Create a new API key from a string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(SecretString::from(key.into()))
    }

    /// Expose the secret key value.
    ///
    /// Use sparingly - only when actually sending to the gateway.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }

    /// Whether the key is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.expose_secret().trim().is_empty()
    }

    /// Copy of this key with surrounding whitespace removed.
    pub fn trimmed(&self) -> Self {
        Self::new(self.expose_secret().trim())
    }

    /// Masked rendering safe for display.
    ///
    /// Keeps the first and last four characters of keys at least eight
    /// characters long; shorter keys are fully masked.
    ///
    /// ```
    /// use relay_models::ApiKey;
    ///
    /// assert_eq!(ApiKey::new("sk-abcdef123456").masked(), "sk-a*******3456");
    /// assert_eq!(ApiKey::new("short").masked(), "*****");
    /// ```
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.expose_secret().chars().collect();
        if chars.len() < 8 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}{}{tail}", "*".repeat(chars.len() - 8))
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey([REDACTED])")
    }
}

impl PartialEq for ApiKey {
    fn eq(&self, other: &Self) -> bool {
        self.expose_secret() == other.expose_secret()
    }
}

impl Eq for ApiKey {}

impl From<String> for ApiKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ApiKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A configured external API endpoint plus its credentials and metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    pub id: ProviderId,
    pub name: String,
    pub api_key: Option<ApiKey>,
    pub base_url: String,
    /// Registry icon name or image URL.
    pub logo: Option<String>,
    pub kind: ProviderKind,
    pub enabled: bool,
}

impl Provider {
    pub fn is_built_in(&self) -> bool {
        self.kind.is_built_in()
    }

    /// Copy of this provider with every string field trimmed.
    pub fn trimmed(&self) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.trim().to_string(),
            api_key: self.api_key.as_ref().map(ApiKey::trimmed),
            base_url: self.base_url.trim().to_string(),
            logo: self.logo.as_ref().map(|l| l.trim().to_string()),
            kind: ProviderKind::from(self.kind.as_str().trim()),
            enabled: self.enabled,
        }
    }
}

/// User input for creating or updating a provider.
///
/// Every field is optional so that partial updates can be expressed; absent
/// fields are sent as-is and left for the remote side to interpret.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderDraft {
    pub id: Option<ProviderId>,
    pub name: Option<String>,
    pub api_key: Option<ApiKey>,
    pub base_url: Option<String>,
    pub logo: Option<String>,
    pub kind: Option<String>,
    pub enabled: Option<bool>,
}

impl ProviderDraft {
    /// Trim `name`, `api_key`, `base_url`, `logo` and `kind`.
    ///
    /// Empty strings stay empty strings; absent fields stay absent.
    pub fn sanitized(self) -> Self {
        Self {
            id: self.id,
            name: self.name.map(|s| s.trim().to_string()),
            api_key: self.api_key.as_ref().map(ApiKey::trimmed),
            base_url: self.base_url.map(|s| s.trim().to_string()),
            logo: self.logo.map(|s| s.trim().to_string()),
            kind: self.kind.map(|s| s.trim().to_string()),
            enabled: self.enabled,
        }
    }
}

impl From<&Provider> for ProviderDraft {
    fn from(provider: &Provider) -> Self {
        Self {
            id: Some(provider.id.clone()),
            name: Some(provider.name.clone()),
            api_key: provider.api_key.clone(),
            base_url: Some(provider.base_url.clone()),
            logo: provider.logo.clone(),
            kind: Some(provider.kind.as_str().to_string()),
            enabled: Some(provider.enabled),
        }
    }
}

/// One upstream model enabled for local use under a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelAssociation {
    pub id: AssociationId,
    pub provider_id: ProviderId,
    pub model_name: String,
}

/// Model descriptor from a provider's upstream catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteModel {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owned_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
}

impl RemoteModel {
    /// Create a catalog entry with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            owned_by: None,
            object: None,
            created: None,
        }
    }
}
