//! Editable provider form and its validation rules.

use url::Url;

use crate::types::CUSTOM_KIND;
use crate::{ApiKey, Error, Provider, ProviderDraft, ProviderId, Result};

/// Minimum provider name length, counted in characters after trimming.
pub const MIN_NAME_LEN: usize = 2;

/// Field values bound to a provider edit screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderForm {
    pub name: String,
    pub api_key: ApiKey,
    pub base_url: String,
    /// Registry icon name or image URL.
    pub logo: String,
    pub kind: String,
}

impl Default for ProviderForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            api_key: ApiKey::new(""),
            base_url: String::new(),
            logo: String::new(),
            kind: CUSTOM_KIND.to_string(),
        }
    }
}

impl ProviderForm {
    /// Form pre-filled from a persisted provider.
    pub fn from_provider(provider: &Provider) -> Self {
        Self {
            name: provider.name.clone(),
            api_key: provider.api_key.clone().unwrap_or_else(|| ApiKey::new("")),
            base_url: provider.base_url.clone(),
            logo: provider.logo.clone().unwrap_or_default(),
            kind: provider.kind.as_str().to_string(),
        }
    }

    /// Check the name and base URL.
    ///
    /// ```
    /// use relay_models::session::ProviderForm;
    ///
    /// let mut form = ProviderForm::default();
    /// form.name = "Acme".into();
    /// form.base_url = "https://api.acme.ai/v1".into();
    /// assert!(form.validate().is_ok());
    ///
    /// form.base_url = "api.acme.ai".into();
    /// assert!(form.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().chars().count() < MIN_NAME_LEN {
            return Err(Error::InvalidField {
                field: "name",
                reason: format!("must be at least {MIN_NAME_LEN} characters"),
            });
        }
        Url::parse(self.base_url.trim()).map_err(|e| Error::InvalidField {
            field: "base_url",
            reason: format!("must be an absolute URL ({e})"),
        })?;
        Ok(())
    }

    /// Both an API key and a base URL have been filled in.
    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_blank() && !self.base_url.trim().is_empty()
    }

    /// Draft carrying every form field. `enabled` is left to the remote side.
    pub fn to_draft(&self, id: Option<ProviderId>) -> ProviderDraft {
        ProviderDraft {
            id,
            name: Some(self.name.clone()),
            api_key: Some(self.api_key.clone()),
            base_url: Some(self.base_url.clone()),
            logo: Some(self.logo.clone()),
            kind: Some(self.kind.clone()),
            enabled: None,
        }
    }
}
