// Error types for the resolver

use thiserror::Error;

/// Errors produced while resolving a share URL
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Source URL is not a well-formed URL
    #[error("invalid source URL: {0}")]
    InvalidUrl(String),

    /// Transport-level failure (connect error, timeout) talking to a provider
    #[error("request to {provider} failed: {source}")]
    Network {
        provider: String,
        #[source]
        source: reqwest::Error,
    },

    /// Provider answered with a non-2xx status
    #[error("{provider} returned HTTP {status}")]
    ProviderStatus { provider: String, status: u16 },

    /// Every consulted provider was exhausted without a usable link
    #[error("no provider produced a usable download link")]
    NoLink,

    /// Caller requested a provider that is not in the registry
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    /// Caller requested a provider that is administratively disabled
    #[error("provider is disabled: {0}")]
    ProviderDisabled(String),

    /// Record id not present in the store
    #[error("media record not found: {0}")]
    RecordNotFound(String),

    /// Failed to construct the shared HTTP client
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl ResolveError {
    /// Whether the caller picked a provider the registry cannot serve
    pub fn is_invalid_selection(&self) -> bool {
        matches!(self, Self::UnknownProvider(_) | Self::ProviderDisabled(_))
    }
}
