//! Error types for provider and model management.

use thiserror::Error;

use crate::gateway::GatewayError;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during provider and model operations.
///
/// Validation and policy variants are produced before any gateway call is
/// attempted; [`Error::Gateway`] wraps failures reported by the remote side.
#[derive(Debug, Error)]
pub enum Error {
    /// Provider does not exist remotely.
    #[error("provider not found: {0}")]
    ProviderNotFound(String),

    /// Built-in providers can never be deleted.
    #[error("built-in provider cannot be deleted: {0}")]
    BuiltInProtected(String),

    /// Operation needs a provider that has been persisted at least once.
    #[error("provider has not been saved yet")]
    Unsaved,

    /// Required field is absent or blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Field is present but malformed.
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Remote gateway call failed.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

impl Error {
    /// Whether this error was raised locally, before reaching the gateway.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Error::BuiltInProtected(_)
                | Error::Unsaved
                | Error::MissingField(_)
                | Error::InvalidField { .. }
        )
    }
}
