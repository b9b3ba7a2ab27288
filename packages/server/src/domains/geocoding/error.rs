use thiserror::Error;

/// Failures inside the geocoding pipeline. None of these reach callers of
/// `Geocoder::geocode`; they decide between retrying, moving to the next
/// provider, and falling back to a name match.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeocodeError {
    /// Transport failure, timeout, or a 5xx/429 response. Retryable.
    #[error("Network error from {provider}: {message}")]
    Network { provider: String, message: String },

    /// The provider answered but could not resolve the query. Not retried.
    #[error("{provider} rejected the query: {message}")]
    ProviderRejected { provider: String, message: String },

    #[error("All geocoding providers exhausted")]
    AllProvidersExhausted,

    #[error("Circuit breaker is open")]
    CircuitOpen,

    /// Providers and cache are unavailable or the deadline passed.
    #[error("Geocoding degraded: {0}")]
    Degraded(String),
}

impl GeocodeError {
    pub fn network(provider: &str, message: impl Into<String>) -> Self {
        GeocodeError::Network {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    pub fn rejected(provider: &str, message: impl Into<String>) -> Self {
        GeocodeError::ProviderRejected {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, GeocodeError::Network { .. })
    }
}
