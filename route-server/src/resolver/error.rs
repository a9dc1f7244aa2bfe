//! Address resolver error types.

use crate::domain::PlanningError;

/// Errors from a place-search / directions provider.
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Provider returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the provider
    #[error("rate limited by places provider")]
    RateLimited,

    /// Invalid API key or unauthorized
    #[error("unauthorized (invalid API key)")]
    Unauthorized,

    /// Provider not configured or not reachable
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl From<ResolverError> for PlanningError {
    fn from(err: ResolverError) -> Self {
        PlanningError::ProviderUnavailable(err.to_string())
    }
}
