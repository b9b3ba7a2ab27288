use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{check_status, ProviderMatch};
use crate::domains::geocoding::error::GeocodeError;
use crate::kernel::BaseGeocodeProvider;

pub const PROVIDER_NAME: &str = "census";
pub const DEFAULT_CENSUS_URL: &str = "https://geocoding.geo.census.gov";

/// The Census geocoder only returns address-level matches.
const MATCH_CONFIDENCE: f64 = 0.9;

#[derive(Debug, Deserialize)]
struct CensusResponse {
    result: CensusResult,
}

#[derive(Debug, Deserialize)]
struct CensusResult {
    #[serde(rename = "addressMatches", default)]
    address_matches: Vec<AddressMatch>,
}

#[derive(Debug, Deserialize)]
struct AddressMatch {
    #[serde(rename = "matchedAddress", default)]
    matched_address: String,
    coordinates: CensusCoordinates,
}

#[derive(Debug, Deserialize)]
struct CensusCoordinates {
    x: f64,
    y: f64,
}

/// U.S. Census Bureau one-line address geocoder.
pub struct CensusProvider {
    client: Client,
    base_url: String,
}

impl CensusProvider {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn lookup_url(&self, query: &str) -> String {
        format!(
            "{}/geocoder/locations/onelineaddress?address={}&benchmark=Public_AR_Current&format=json",
            self.base_url,
            urlencoding::encode(query)
        )
    }
}

fn parse_response(body: CensusResponse) -> Result<ProviderMatch, GeocodeError> {
    let best = body
        .result
        .address_matches
        .into_iter()
        .next()
        .ok_or_else(|| GeocodeError::rejected(PROVIDER_NAME, "no address matches"))?;

    debug!(matched = %best.matched_address, "Census match");

    ProviderMatch::new(best.coordinates.y, best.coordinates.x, MATCH_CONFIDENCE).checked(PROVIDER_NAME)
}

#[async_trait]
impl BaseGeocodeProvider for CensusProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    #[instrument(skip(self))]
    async fn resolve(&self, query: &str) -> Result<ProviderMatch, GeocodeError> {
        let response = self
            .client
            .get(self.lookup_url(query))
            .send()
            .await
            .map_err(|e| GeocodeError::network(PROVIDER_NAME, format!("request failed: {}", e)))?;

        check_status(PROVIDER_NAME, response.status())?;

        let body: CensusResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::network(PROVIDER_NAME, format!("failed to parse response: {}", e)))?;

        parse_response(body)
    }
}
