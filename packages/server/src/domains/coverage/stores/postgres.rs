//! Postgres-backed stores. Geometry is kept as GeoJSON (JSONB) with indexed
//! bounding-box columns; SQL narrows candidates by bbox and the exact
//! point-in-polygon test runs here.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::utils::normalize_query;
use crate::common::{CoverageAreaId, LatLon, ResourceId};
use crate::domains::coverage::error::CoverageError;
use crate::domains::coverage::models::{CoverageArea, CoverageAreaUpdate, CoverageKind, ResourceCoverage};
use crate::kernel::{BaseCoverageAreaStore, BaseResourceCoverageStore};

#[derive(Debug, Clone)]
pub struct PgCoverageAreaStore {
    pool: PgPool,
}

impl PgCoverageAreaStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseCoverageAreaStore for PgCoverageAreaStore {
    async fn insert(&self, area: CoverageArea) -> Result<Arc<CoverageArea>, CoverageError> {
        area.insert(&self.pool).await.map(Arc::new)
    }

    async fn update(
        &self,
        id: CoverageAreaId,
        update: CoverageAreaUpdate,
        now: DateTime<Utc>,
    ) -> Result<Arc<CoverageArea>, CoverageError> {
        CoverageArea::update_by_id(id, update, now, &self.pool).await.map(Arc::new)
    }

    async fn get(&self, id: CoverageAreaId) -> Result<Option<Arc<CoverageArea>>, CoverageError> {
        Ok(CoverageArea::find_by_id(id, &self.pool).await?.map(Arc::new))
    }

    async fn search(
        &self,
        kind: Option<CoverageKind>,
        name_substring: Option<&str>,
    ) -> Result<Vec<Arc<CoverageArea>>, CoverageError> {
        let areas = CoverageArea::search(kind, name_substring, &self.pool).await?;
        Ok(areas.into_iter().map(Arc::new).collect())
    }

    async fn find_containing(&self, point: LatLon) -> Result<Vec<Arc<CoverageArea>>, CoverageError> {
        let candidates = CoverageArea::find_bbox_candidates(point, &self.pool).await?;
        Ok(candidates
            .into_iter()
            .filter(|a| a.contains(point))
            .map(Arc::new)
            .collect())
    }

    async fn find_by_name_text(&self, normalized_query: &str) -> Result<Vec<Arc<CoverageArea>>, CoverageError> {
        let query = normalize_query(normalized_query);
        let candidates = CoverageArea::find_by_name_text(&query, &self.pool).await?;
        // Postgres and Rust lowercase a few scripts differently; keep the Rust verdict.
        Ok(candidates
            .into_iter()
            .filter(|a| a.name_match(&query).is_some())
            .map(Arc::new)
            .collect())
    }

    async fn health_check(&self) -> Result<(), CoverageError> {
        CoverageArea::ping(&self.pool).await
    }
}

#[derive(Debug, Clone)]
pub struct PgResourceCoverageStore {
    pool: PgPool,
}

impl PgResourceCoverageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseResourceCoverageStore for PgResourceCoverageStore {
    async fn attach(&self, link: ResourceCoverage) -> Result<ResourceCoverage> {
        link.upsert(&self.pool).await
    }

    async fn detach(&self, resource_id: ResourceId, coverage_area_id: CoverageAreaId) -> Result<bool> {
        ResourceCoverage::delete(resource_id, coverage_area_id, &self.pool).await
    }

    async fn for_areas(&self, area_ids: &[CoverageAreaId]) -> Result<Vec<ResourceCoverage>> {
        ResourceCoverage::find_for_areas(area_ids, &self.pool).await
    }

    async fn for_resource(&self, resource_id: ResourceId) -> Result<Vec<ResourceCoverage>> {
        ResourceCoverage::find_for_resource(resource_id, &self.pool).await
    }
}
