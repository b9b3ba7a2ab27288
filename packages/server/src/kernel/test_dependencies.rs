// TestDependencies - mock implementations for testing
//
// Provides a scriptable geocode provider, a cache that always fails, and a
// builder that wires in-memory stores into ServerDeps.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{BaseGeocodeProvider, BaseGeocodingCache, ServerDeps};
use crate::domains::coverage::stores::{InMemoryCoverageAreaStore, InMemoryResourceCoverageStore};
use crate::domains::geocoding::error::GeocodeError;
use crate::domains::geocoding::models::{CacheStats, GeocodingCacheEntry};
use crate::domains::geocoding::providers::ProviderMatch;
use crate::domains::geocoding::{CircuitBreakerConfig, Geocoder, GeocoderConfig, InMemoryGeocodingCache};
use crate::domains::search::InMemoryResourceLocator;

type Scripted = std::result::Result<ProviderMatch, GeocodeError>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// =============================================================================
// Mock Geocode Provider
// =============================================================================

/// Provider returning queued responses first, then a fixed default.
pub struct MockGeocodeProvider {
    name: String,
    default: Scripted,
    responses: Arc<Mutex<VecDeque<Scripted>>>,
    calls: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl MockGeocodeProvider {
    fn with_default(name: &str, default: Scripted) -> Self {
        Self {
            name: name.to_string(),
            default,
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    pub fn succeeding(name: &str, latitude: f64, longitude: f64, confidence: f64) -> Self {
        Self::with_default(name, Ok(ProviderMatch::new(latitude, longitude, confidence)))
    }

    /// Every call is a retryable network failure
    pub fn failing(name: &str) -> Self {
        Self::with_default(name, Err(GeocodeError::network(name, "connection refused")))
    }

    /// Every call is answered with "no match"
    pub fn rejecting(name: &str) -> Self {
        Self::with_default(name, Err(GeocodeError::rejected(name, "no results")))
    }

    /// Queue a response ahead of the default
    pub fn with_response(self, response: Scripted) -> Self {
        self.push_response(response);
        self
    }

    pub fn push_response(&self, response: Scripted) {
        lock(&self.responses).push_back(response);
    }

    /// Sleep before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queries received, in order
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

#[async_trait]
impl BaseGeocodeProvider for MockGeocodeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn resolve(&self, query: &str) -> Scripted {
        lock(&self.calls).push(query.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let queued = lock(&self.responses).pop_front();
        queued.unwrap_or_else(|| self.default.clone())
    }
}

// =============================================================================
// Failing Geocoding Cache
// =============================================================================

/// Cache whose every operation errors, standing in for an unreachable store.
pub struct FailingGeocodingCache;

#[async_trait]
impl BaseGeocodingCache for FailingGeocodingCache {
    async fn get_fresh(&self, _normalized_query: &str, _now: DateTime<Utc>) -> Result<Option<GeocodingCacheEntry>> {
        bail!("cache unavailable")
    }

    async fn put(&self, _entry: GeocodingCacheEntry) -> Result<()> {
        bail!("cache unavailable")
    }

    async fn purge_expired(&self, _now: DateTime<Utc>) -> Result<u64> {
        bail!("cache unavailable")
    }

    async fn stats(&self, _now: DateTime<Utc>) -> Result<CacheStats> {
        bail!("cache unavailable")
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

#[derive(Clone)]
pub struct TestDependencies {
    pub areas: Arc<InMemoryCoverageAreaStore>,
    pub coverages: Arc<InMemoryResourceCoverageStore>,
    pub locator: Arc<InMemoryResourceLocator>,
    pub cache: Arc<InMemoryGeocodingCache>,
    pub provider: Arc<MockGeocodeProvider>,
    pub geocoder_config: GeocoderConfig,
    pub breaker_config: CircuitBreakerConfig,
}

impl TestDependencies {
    /// Empty stores and a provider that never finds anything
    pub fn new() -> Self {
        Self::with_provider(MockGeocodeProvider::rejecting("mock"))
    }

    pub fn with_provider(provider: MockGeocodeProvider) -> Self {
        Self {
            areas: Arc::new(InMemoryCoverageAreaStore::new()),
            coverages: Arc::new(InMemoryResourceCoverageStore::new()),
            locator: Arc::new(InMemoryResourceLocator::new()),
            cache: Arc::new(InMemoryGeocodingCache::new()),
            provider: Arc::new(provider),
            geocoder_config: GeocoderConfig::default(),
            breaker_config: CircuitBreakerConfig::default(),
        }
    }

    /// Override geocoder tuning (attempts, backoff, deadlines)
    pub fn geocoder_config(mut self, config: GeocoderConfig) -> Self {
        self.geocoder_config = config;
        self
    }

    /// Build ServerDeps over the shared in-memory stores. Each call gets a
    /// fresh circuit breaker; stores and cache are shared.
    pub fn deps(&self) -> ServerDeps {
        let provider: Arc<dyn BaseGeocodeProvider> = self.provider.clone();
        let geocoder = Geocoder::new(
            vec![provider],
            self.cache.clone(),
            self.areas.clone(),
            self.geocoder_config.clone(),
            self.breaker_config.clone(),
        );
        ServerDeps::new(
            None,
            Arc::new(geocoder),
            self.areas.clone(),
            self.coverages.clone(),
            self.locator.clone(),
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
