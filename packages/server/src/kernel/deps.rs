//! Server dependencies for activities (using traits for testability)
//!
//! Every store sits behind a `Base*` trait so the same activities run against
//! Postgres in production and in-memory stores in tests or local runs.

use std::sync::Arc;

use anyhow::Result;
use sqlx::PgPool;

use crate::config::Config;
use crate::domains::coverage::matcher::SpatialMatcher;
use crate::domains::coverage::stores::{
    InMemoryCoverageAreaStore, InMemoryResourceCoverageStore, PgCoverageAreaStore, PgResourceCoverageStore,
};
use crate::domains::geocoding::providers::build_providers;
use crate::domains::geocoding::{Geocoder, InMemoryGeocodingCache, PgGeocodingCache};
use crate::domains::search::{InMemoryResourceLocator, PgResourceLocator};
use crate::kernel::{BaseCoverageAreaStore, BaseGeocodingCache, BaseResourceCoverageStore, BaseResourceLocator};

/// Server dependencies accessible to activities
#[derive(Clone)]
pub struct ServerDeps {
    /// Present when running against Postgres
    pub db_pool: Option<PgPool>,
    pub geocoder: Arc<Geocoder>,
    pub coverage_areas: Arc<dyn BaseCoverageAreaStore>,
    pub resource_coverages: Arc<dyn BaseResourceCoverageStore>,
    pub resource_locator: Arc<dyn BaseResourceLocator>,
    pub matcher: SpatialMatcher,
}

impl ServerDeps {
    pub fn new(
        db_pool: Option<PgPool>,
        geocoder: Arc<Geocoder>,
        coverage_areas: Arc<dyn BaseCoverageAreaStore>,
        resource_coverages: Arc<dyn BaseResourceCoverageStore>,
        resource_locator: Arc<dyn BaseResourceLocator>,
    ) -> Self {
        let matcher = SpatialMatcher::new(coverage_areas.clone(), resource_coverages.clone());
        Self {
            db_pool,
            geocoder,
            coverage_areas,
            resource_coverages,
            resource_locator,
            matcher,
        }
    }

    /// Wire Postgres-backed stores and the configured provider chain.
    pub fn postgres(pool: PgPool, config: &Config) -> Result<Self> {
        let coverage_areas: Arc<dyn BaseCoverageAreaStore> = Arc::new(PgCoverageAreaStore::new(pool.clone()));
        let cache: Arc<dyn BaseGeocodingCache> = Arc::new(PgGeocodingCache::new(pool.clone()));
        let geocoder = Self::geocoder(config, cache, coverage_areas.clone())?;

        Ok(Self::new(
            Some(pool.clone()),
            geocoder,
            coverage_areas,
            Arc::new(PgResourceCoverageStore::new(pool.clone())),
            Arc::new(PgResourceLocator::new(pool)),
        ))
    }

    /// Process-local stores. Nothing survives a restart.
    pub fn in_memory(config: &Config) -> Result<Self> {
        let coverage_areas: Arc<dyn BaseCoverageAreaStore> = Arc::new(InMemoryCoverageAreaStore::new());
        let cache: Arc<dyn BaseGeocodingCache> = Arc::new(InMemoryGeocodingCache::new());
        let geocoder = Self::geocoder(config, cache, coverage_areas.clone())?;

        Ok(Self::new(
            None,
            geocoder,
            coverage_areas,
            Arc::new(InMemoryResourceCoverageStore::new()),
            Arc::new(InMemoryResourceLocator::new()),
        ))
    }

    fn geocoder(
        config: &Config,
        cache: Arc<dyn BaseGeocodingCache>,
        coverage_areas: Arc<dyn BaseCoverageAreaStore>,
    ) -> Result<Arc<Geocoder>> {
        let providers = build_providers(&config.providers)?;
        Ok(Arc::new(Geocoder::new(
            providers,
            cache,
            coverage_areas,
            config.geocoder.clone(),
            config.circuit_breaker.clone(),
        )))
    }
}
