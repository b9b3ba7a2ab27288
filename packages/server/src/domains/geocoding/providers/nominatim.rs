use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{check_status, ProviderMatch};
use crate::domains::geocoding::error::GeocodeError;
use crate::kernel::BaseGeocodeProvider;

pub const PROVIDER_NAME: &str = "nominatim";
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// Confidence used when a result carries no `importance`.
const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Nominatim search result
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    importance: Option<f64>,
}

/// OpenStreetMap Nominatim search API.
pub struct NominatimProvider {
    client: Client,
    base_url: String,
}

impl NominatimProvider {
    /// `client` should carry an identifying User-Agent (Nominatim usage policy).
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url,
            urlencoding::encode(query)
        )
    }
}

fn parse_places(places: &[NominatimPlace]) -> Result<ProviderMatch, GeocodeError> {
    let place = places
        .first()
        .ok_or_else(|| GeocodeError::rejected(PROVIDER_NAME, "no results"))?;

    let lat: f64 = place
        .lat
        .parse()
        .map_err(|e| GeocodeError::network(PROVIDER_NAME, format!("invalid latitude in response: {}", e)))?;
    let lon: f64 = place
        .lon
        .parse()
        .map_err(|e| GeocodeError::network(PROVIDER_NAME, format!("invalid longitude in response: {}", e)))?;

    debug!(display_name = %place.display_name, lat, lon, "Nominatim match");

    ProviderMatch::new(lat, lon, place.importance.unwrap_or(DEFAULT_CONFIDENCE)).checked(PROVIDER_NAME)
}

#[async_trait]
impl BaseGeocodeProvider for NominatimProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    #[instrument(skip(self))]
    async fn resolve(&self, query: &str) -> Result<ProviderMatch, GeocodeError> {
        let response = self
            .client
            .get(self.search_url(query))
            .send()
            .await
            .map_err(|e| GeocodeError::network(PROVIDER_NAME, format!("request failed: {}", e)))?;

        check_status(PROVIDER_NAME, response.status())?;

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| GeocodeError::network(PROVIDER_NAME, format!("failed to parse response: {}", e)))?;

        parse_places(&places)
    }
}
