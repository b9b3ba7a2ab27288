//! External geocoding providers.

pub mod census;
pub mod nominatim;

use std::sync::Arc;

use reqwest::StatusCode;
use serde::Serialize;

use crate::common::LatLon;
use crate::domains::geocoding::error::GeocodeError;
use crate::kernel::BaseGeocodeProvider;

pub use census::CensusProvider;
pub use nominatim::NominatimProvider;

/// A provider's answer for one query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProviderMatch {
    pub location: LatLon,
    /// 0 to 1
    pub confidence: f64,
}

impl ProviderMatch {
    pub fn new(latitude: f64, longitude: f64, confidence: f64) -> Self {
        Self {
            location: LatLon::new(latitude, longitude),
            confidence,
        }
    }

    /// Reject answers a provider should never have produced.
    pub(crate) fn checked(self, provider: &str) -> Result<Self, GeocodeError> {
        if !self.location.is_finite() || !self.location.in_bounds() {
            return Err(GeocodeError::rejected(
                provider,
                format!(
                    "coordinates out of range: ({}, {})",
                    self.location.latitude, self.location.longitude
                ),
            ));
        }
        let confidence = if self.confidence.is_finite() {
            self.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Ok(Self { confidence, ..self })
    }
}

/// Map an HTTP status to the retry class. Rate limiting and server errors
/// are retryable, other client errors are not.
pub(crate) fn check_status(provider: &str, status: StatusCode) -> Result<(), GeocodeError> {
    if status.is_success() {
        Ok(())
    } else if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        Err(GeocodeError::network(provider, format!("HTTP {}", status)))
    } else {
        Err(GeocodeError::rejected(provider, format!("HTTP {}", status)))
    }
}

/// Settings shared by the HTTP providers.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub names: Vec<String>,
    pub nominatim_url: String,
    pub census_url: String,
    pub user_agent: String,
}

/// Build the provider chain in the configured order. Unknown names are an error.
pub fn build_providers(settings: &ProviderSettings) -> anyhow::Result<Vec<Arc<dyn BaseGeocodeProvider>>> {
    let client = reqwest::Client::builder()
        .user_agent(settings.user_agent.clone())
        .build()?;

    settings
        .names
        .iter()
        .map(|name| -> anyhow::Result<Arc<dyn BaseGeocodeProvider>> {
            match name.trim().to_ascii_lowercase().as_str() {
                nominatim::PROVIDER_NAME => Ok(Arc::new(NominatimProvider::new(
                    client.clone(),
                    settings.nominatim_url.clone(),
                ))),
                census::PROVIDER_NAME => Ok(Arc::new(CensusProvider::new(
                    client.clone(),
                    settings.census_url.clone(),
                ))),
                other => Err(anyhow::anyhow!("Unknown geocoding provider: {}", other)),
            }
        })
        .collect()
}
