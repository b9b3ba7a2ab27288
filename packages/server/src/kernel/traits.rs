// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (geocoding fallback, matching, ranking) lives in domain
// functions that use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseGeocodeProvider)

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::common::{CoverageAreaId, LatLon, ResourceId};
use crate::domains::coverage::error::CoverageError;
use crate::domains::coverage::models::{CoverageArea, CoverageAreaUpdate, CoverageKind, ResourceCoverage};
use crate::domains::geocoding::error::GeocodeError;
use crate::domains::geocoding::models::{CacheStats, GeocodingCacheEntry};
use crate::domains::geocoding::providers::ProviderMatch;

// =============================================================================
// Geocode Provider Trait (Infrastructure - external resolvers)
// =============================================================================

#[async_trait]
pub trait BaseGeocodeProvider: Send + Sync {
    /// Short identifier recorded on cache entries and results
    fn name(&self) -> &str;

    /// Resolve free-form address text to a point.
    ///
    /// Return `GeocodeError::Network` for failures worth retrying and
    /// `GeocodeError::ProviderRejected` when the provider answered but had no
    /// usable match.
    async fn resolve(&self, query: &str) -> std::result::Result<ProviderMatch, GeocodeError>;
}

// =============================================================================
// Geocoding Cache Trait (Infrastructure - key/value with expiry)
// =============================================================================

#[async_trait]
pub trait BaseGeocodingCache: Send + Sync {
    /// Return the unexpired entry for a normalized query, counting the hit
    async fn get_fresh(&self, normalized_query: &str, now: DateTime<Utc>) -> Result<Option<GeocodingCacheEntry>>;

    /// Insert or overwrite an entry
    async fn put(&self, entry: GeocodingCacheEntry) -> Result<()>;

    /// Remove expired entries, returning how many were removed
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64>;

    async fn stats(&self, now: DateTime<Utc>) -> Result<CacheStats>;
}

// =============================================================================
// Coverage Area Store Trait (Infrastructure - spatial store)
// =============================================================================

#[async_trait]
pub trait BaseCoverageAreaStore: Send + Sync {
    async fn insert(&self, area: CoverageArea) -> std::result::Result<Arc<CoverageArea>, CoverageError>;

    /// Apply `update` to the current stored value and swap the result in.
    /// Concurrent updates to one area are serialized; readers see the old or
    /// the new value, never a mix.
    async fn update(
        &self,
        id: CoverageAreaId,
        update: CoverageAreaUpdate,
        now: DateTime<Utc>,
    ) -> std::result::Result<Arc<CoverageArea>, CoverageError>;

    async fn get(&self, id: CoverageAreaId) -> std::result::Result<Option<Arc<CoverageArea>>, CoverageError>;

    /// Filter by kind and case-insensitive name substring, ordered by name
    async fn search(
        &self,
        kind: Option<CoverageKind>,
        name_substring: Option<&str>,
    ) -> std::result::Result<Vec<Arc<CoverageArea>>, CoverageError>;

    /// Every area whose geometry contains the point (boundary inclusive)
    async fn find_containing(&self, point: LatLon) -> std::result::Result<Vec<Arc<CoverageArea>>, CoverageError>;

    /// Areas whose name equals, contains, or is contained in the normalized query
    async fn find_by_name_text(&self, normalized_query: &str) -> std::result::Result<Vec<Arc<CoverageArea>>, CoverageError>;

    /// Verify the backing store is reachable
    async fn health_check(&self) -> std::result::Result<(), CoverageError> {
        Ok(())
    }
}

// =============================================================================
// Resource Coverage Store Trait (Infrastructure - association table)
// =============================================================================

#[async_trait]
pub trait BaseResourceCoverageStore: Send + Sync {
    /// Create the link, or update notes on the existing link for the pair
    async fn attach(&self, link: ResourceCoverage) -> Result<ResourceCoverage>;

    /// Returns true if a link was removed
    async fn detach(&self, resource_id: ResourceId, coverage_area_id: CoverageAreaId) -> Result<bool>;

    async fn for_areas(&self, area_ids: &[CoverageAreaId]) -> Result<Vec<ResourceCoverage>>;

    async fn for_resource(&self, resource_id: ResourceId) -> Result<Vec<ResourceCoverage>>;
}

// =============================================================================
// Resource Locator Trait (Infrastructure - resource coordinates)
// =============================================================================

#[async_trait]
pub trait BaseResourceLocator: Send + Sync {
    /// Known locations for the given resources. Resources without a location
    /// are absent from the map.
    async fn locate(&self, resource_ids: &[ResourceId]) -> Result<HashMap<ResourceId, LatLon>>;

    /// Record or move a resource's location
    async fn set_location(&self, resource_id: ResourceId, location: LatLon) -> Result<()>;
}
