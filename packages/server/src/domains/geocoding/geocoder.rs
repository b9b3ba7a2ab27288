//! Free-text location resolution with caching, retry, a circuit breaker and a
//! name-match fallback.
//!
//! `geocode` never fails. When providers are unavailable the result is either
//! a coverage area whose name matches the query or `Resolution::Unresolvable`,
//! both flagged `approximate`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::common::utils::normalize_query;
use crate::common::{CoverageAreaId, LatLon};
use crate::domains::coverage::models::{sort_by_name_match, CoverageKind, NameMatch};
use crate::domains::geocoding::circuit_breaker::{BreakerSnapshot, CircuitBreaker, CircuitBreakerConfig, CircuitState};
use crate::domains::geocoding::error::GeocodeError;
use crate::domains::geocoding::models::{CacheStats, GeocodingCacheEntry};
use crate::domains::geocoding::providers::ProviderMatch;
use crate::kernel::{BaseCoverageAreaStore, BaseGeocodeProvider, BaseGeocodingCache};

#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Attempts per provider, including the first (default: 3).
    pub max_attempts: u32,
    /// Sleep before the second attempt; doubles after each failure (default: 1s).
    pub initial_backoff: Duration,
    /// Budget for the whole provider phase of one `geocode` call (default: 10s).
    pub request_deadline: Duration,
    /// Budget for a single provider call (default: 5s).
    pub provider_timeout: Duration,
    /// Confidence given to an exact name match; substring matches get less (default: 0.4).
    pub fallback_confidence: f64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            request_deadline: Duration::from_secs(10),
            provider_timeout: Duration::from_secs(5),
            fallback_confidence: 0.4,
        }
    }
}

/// What a query resolved to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Resolution {
    Coordinates {
        latitude: f64,
        longitude: f64,
    },
    /// Providers were unavailable and a coverage area name matched instead.
    CoverageArea {
        id: CoverageAreaId,
        name: String,
        kind: CoverageKind,
    },
    Unresolvable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodeResult {
    pub query: String,
    pub normalized_query: String,
    pub resolution: Resolution,
    pub confidence: f64,
    pub provider: Option<String>,
    pub cached: bool,
    pub approximate: bool,
}

impl GeocodeResult {
    pub fn location(&self) -> Option<LatLon> {
        match self.resolution {
            Resolution::Coordinates { latitude, longitude } => Some(LatLon::new(latitude, longitude)),
            _ => None,
        }
    }

    pub fn coverage_area_id(&self) -> Option<CoverageAreaId> {
        match self.resolution {
            Resolution::CoverageArea { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn is_unresolvable(&self) -> bool {
        matches!(self.resolution, Resolution::Unresolvable)
    }

    fn unresolvable(query: &str, normalized_query: String) -> Self {
        Self {
            query: query.to_string(),
            normalized_query,
            resolution: Resolution::Unresolvable,
            confidence: 0.0,
            provider: None,
            cached: false,
            approximate: true,
        }
    }
}

pub struct Geocoder {
    providers: Vec<Arc<dyn BaseGeocodeProvider>>,
    cache: Arc<dyn BaseGeocodingCache>,
    areas: Arc<dyn BaseCoverageAreaStore>,
    breaker: CircuitBreaker,
    config: GeocoderConfig,
}

impl Geocoder {
    pub fn new(
        providers: Vec<Arc<dyn BaseGeocodeProvider>>,
        cache: Arc<dyn BaseGeocodingCache>,
        areas: Arc<dyn BaseCoverageAreaStore>,
        config: GeocoderConfig,
        breaker_config: CircuitBreakerConfig,
    ) -> Self {
        Self {
            providers,
            cache,
            areas,
            breaker: CircuitBreaker::new(breaker_config),
            config,
        }
    }

    pub fn config(&self) -> &GeocoderConfig {
        &self.config
    }

    pub fn breaker_snapshot(&self) -> BreakerSnapshot {
        self.breaker.snapshot()
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    pub async fn cache_stats(&self) -> anyhow::Result<CacheStats> {
        self.cache.stats(Utc::now()).await
    }

    pub async fn purge_expired(&self) -> anyhow::Result<u64> {
        let removed = self.cache.purge_expired(Utc::now()).await?;
        info!(removed, "Purged expired geocoding cache entries");
        Ok(removed)
    }

    pub async fn geocode(&self, query: &str) -> GeocodeResult {
        self.geocode_with_deadline(query, self.config.request_deadline).await
    }

    /// Like `geocode`, with a caller-imposed budget for the provider phase.
    /// Remaining retries are abandoned once it passes.
    pub async fn geocode_with_deadline(&self, query: &str, deadline: Duration) -> GeocodeResult {
        let normalized = normalize_query(query);
        if normalized.is_empty() {
            return GeocodeResult::unresolvable(query, normalized);
        }

        match self.cache.get_fresh(&normalized, Utc::now()).await {
            Ok(Some(entry)) => {
                debug!(query = %normalized, hits = entry.hit_count, "Geocoding cache hit");
                return GeocodeResult {
                    query: query.to_string(),
                    normalized_query: normalized,
                    resolution: Resolution::Coordinates {
                        latitude: entry.latitude,
                        longitude: entry.longitude,
                    },
                    confidence: entry.confidence,
                    provider: Some(entry.provider),
                    cached: true,
                    approximate: false,
                };
            }
            Ok(None) => debug!(query = %normalized, "Geocoding cache miss"),
            Err(e) => warn!(error = %e, query = %normalized, "Geocoding cache lookup failed, treating as miss"),
        }

        let provider_query = query.split_whitespace().collect::<Vec<_>>().join(" ");
        let deadline_at = Instant::now() + deadline;
        let outcome = match tokio::time::timeout_at(deadline_at, self.resolve_with_providers(&provider_query)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(GeocodeError::Degraded("request deadline exceeded".to_string())),
        };

        match outcome {
            Ok((provider, found)) => {
                let entry = GeocodingCacheEntry::new(
                    normalized.clone(),
                    found.location,
                    found.confidence,
                    provider.clone(),
                    Utc::now(),
                );
                if let Err(e) = self.cache.put(entry).await {
                    warn!(error = %e, query = %normalized, "Failed to write geocoding cache entry");
                }
                GeocodeResult {
                    query: query.to_string(),
                    normalized_query: normalized,
                    resolution: Resolution::Coordinates {
                        latitude: found.location.latitude,
                        longitude: found.location.longitude,
                    },
                    confidence: found.confidence,
                    provider: Some(provider),
                    cached: false,
                    approximate: false,
                }
            }
            Err(reason) => {
                warn!(query = %normalized, reason = %reason, "Geocoding providers unavailable, using name fallback");
                self.fallback(query, normalized).await
            }
        }
    }

    /// Try each provider in order. Returns the provider name with its match.
    async fn resolve_with_providers(&self, query: &str) -> Result<(String, ProviderMatch), GeocodeError> {
        for provider in &self.providers {
            match self.call_with_retry(provider.as_ref(), query).await {
                Ok(found) => return Ok((provider.name().to_string(), found)),
                Err(GeocodeError::CircuitOpen) => return Err(GeocodeError::CircuitOpen),
                Err(e) => {
                    debug!(provider = provider.name(), error = %e, "Provider gave no result, trying next");
                }
            }
        }
        Err(GeocodeError::AllProvidersExhausted)
    }

    async fn call_with_retry(&self, provider: &dyn BaseGeocodeProvider, query: &str) -> Result<ProviderMatch, GeocodeError> {
        let attempts = self.config.max_attempts.max(1);
        let mut backoff = self.config.initial_backoff;

        for attempt in 1..=attempts {
            let permit = self.breaker.try_acquire().ok_or(GeocodeError::CircuitOpen)?;

            let result = match tokio::time::timeout(self.config.provider_timeout, provider.resolve(query)).await {
                Ok(result) => result,
                Err(_) => Err(GeocodeError::network(provider.name(), "timed out")),
            };

            let error = match result {
                Ok(found) => {
                    permit.record_success();
                    return Ok(found);
                }
                // Reachable provider, just no answer: no retry, no breaker penalty.
                Err(e @ GeocodeError::ProviderRejected { .. }) => {
                    permit.record_success();
                    return Err(e);
                }
                Err(e) => {
                    permit.record_failure();
                    if !e.is_retryable() {
                        return Err(e);
                    }
                    e
                }
            };

            if self.breaker.state() == CircuitState::Open {
                return Err(GeocodeError::CircuitOpen);
            }
            if attempt == attempts {
                return Err(error);
            }

            warn!(
                provider = provider.name(),
                attempt,
                backoff_ms = backoff.as_millis() as u64,
                error = %error,
                "Geocoding attempt failed, retrying"
            );
            tokio::time::sleep(backoff).await;
            backoff = backoff.saturating_mul(2);
        }

        Err(GeocodeError::AllProvidersExhausted)
    }

    async fn fallback(&self, query: &str, normalized: String) -> GeocodeResult {
        let areas = match self.areas.find_by_name_text(&normalized).await {
            Ok(areas) => areas,
            Err(e) => {
                warn!(error = %e, "Coverage area name lookup failed during geocoding fallback");
                Vec::new()
            }
        };

        let mut ranked: Vec<_> = areas
            .into_iter()
            .filter_map(|area| area.name_match(&normalized).map(|m| (m, area)))
            .collect();
        sort_by_name_match(&mut ranked);

        match ranked.into_iter().next() {
            Some((name_match, area)) => {
                let confidence = match name_match {
                    NameMatch::Exact => self.config.fallback_confidence,
                    _ => self.config.fallback_confidence * 0.75,
                };
                info!(query = %normalized, area = %area.name, kind = %area.kind, "Geocoding fell back to coverage area name");
                GeocodeResult {
                    query: query.to_string(),
                    normalized_query: normalized,
                    resolution: Resolution::CoverageArea {
                        id: area.id,
                        name: area.name.clone(),
                        kind: area.kind,
                    },
                    confidence,
                    provider: None,
                    cached: false,
                    approximate: true,
                }
            }
            None => {
                info!(query = %normalized, "Query is unresolvable");
                GeocodeResult::unresolvable(query, normalized)
            }
        }
    }
}
