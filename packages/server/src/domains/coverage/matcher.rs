//! Point lookups against stored coverage areas.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::common::{CoverageAreaId, LatLon, ResourceId};
use crate::domains::coverage::error::{CoverageError, ValidationError};
use crate::domains::coverage::models::{CoverageArea, CoverageKind};
use crate::kernel::{BaseCoverageAreaStore, BaseResourceCoverageStore};

/// One resource served through one coverage area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageMatch {
    pub resource_id: ResourceId,
    pub coverage_area_id: CoverageAreaId,
    pub kind: CoverageKind,
    pub specificity_weight: u8,
    #[serde(skip)]
    pub bbox_area: f64,
}

impl CoverageMatch {
    fn new(resource_id: ResourceId, area: &CoverageArea) -> Self {
        Self {
            resource_id,
            coverage_area_id: area.id,
            kind: area.kind,
            specificity_weight: area.specificity_weight(),
            bbox_area: area.bbox_area(),
        }
    }
}

/// `best` has one entry per resource (its most specific association);
/// `all` keeps every resource/area pair.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LocationMatches {
    pub best: Vec<CoverageMatch>,
    pub all: Vec<CoverageMatch>,
}

/// Most specific first: higher weight, then smaller bbox, then area id.
pub fn compare_specificity(
    l_weight: u8,
    l_bbox: f64,
    l_id: CoverageAreaId,
    r_weight: u8,
    r_bbox: f64,
    r_id: CoverageAreaId,
) -> Ordering {
    r_weight
        .cmp(&l_weight)
        .then_with(|| l_bbox.total_cmp(&r_bbox))
        .then_with(|| l_id.cmp(&r_id))
}

fn compare_areas(l: &CoverageArea, r: &CoverageArea) -> Ordering {
    compare_specificity(
        l.specificity_weight(),
        l.bbox_area(),
        l.id,
        r.specificity_weight(),
        r.bbox_area(),
        r.id,
    )
}

fn compare_matches(l: &CoverageMatch, r: &CoverageMatch) -> Ordering {
    compare_specificity(
        l.specificity_weight,
        l.bbox_area,
        l.coverage_area_id,
        r.specificity_weight,
        r.bbox_area,
        r.coverage_area_id,
    )
}

/// Reject non-finite query points; clamp latitude and wrap longitude otherwise.
pub fn query_point(point: LatLon) -> Result<LatLon, ValidationError> {
    if !point.is_finite() {
        return Err(ValidationError::NonFiniteCoordinate);
    }
    Ok(point.normalized())
}

#[derive(Clone)]
pub struct SpatialMatcher {
    areas: Arc<dyn BaseCoverageAreaStore>,
    coverages: Arc<dyn BaseResourceCoverageStore>,
}

impl SpatialMatcher {
    pub fn new(areas: Arc<dyn BaseCoverageAreaStore>, coverages: Arc<dyn BaseResourceCoverageStore>) -> Self {
        Self { areas, coverages }
    }

    /// Every area containing the point, most specific first.
    pub async fn find_coverage_areas(&self, point: LatLon) -> Result<Vec<Arc<CoverageArea>>, CoverageError> {
        let point = query_point(point)?;
        let mut areas = self.areas.find_containing(point).await?;
        areas.sort_by(|l, r| compare_areas(l, r));
        debug!(
            latitude = point.latitude,
            longitude = point.longitude,
            matched = areas.len(),
            "Coverage areas containing point"
        );
        Ok(areas)
    }

    pub async fn find_resources_by_location(&self, point: LatLon) -> Result<LocationMatches, CoverageError> {
        let areas = self.find_coverage_areas(point).await?;
        self.resources_for_areas(&areas).await
    }

    /// Join areas to their resources and keep the most specific association
    /// per resource.
    pub async fn resources_for_areas(&self, areas: &[Arc<CoverageArea>]) -> Result<LocationMatches, CoverageError> {
        if areas.is_empty() {
            return Ok(LocationMatches::default());
        }

        let by_id: HashMap<CoverageAreaId, &CoverageArea> = areas.iter().map(|a| (a.id, a.as_ref())).collect();
        let ids: Vec<CoverageAreaId> = by_id.keys().copied().collect();
        let links = self.coverages.for_areas(&ids).await?;

        let mut all: Vec<CoverageMatch> = links
            .iter()
            .filter_map(|link| {
                by_id
                    .get(&link.coverage_area_id)
                    .map(|area| CoverageMatch::new(link.resource_id, area))
            })
            .collect();
        all.sort_by(|l, r| l.resource_id.cmp(&r.resource_id).then_with(|| compare_matches(l, r)));
        all.dedup_by(|l, r| l.resource_id == r.resource_id && l.coverage_area_id == r.coverage_area_id);

        let mut best: Vec<CoverageMatch> = Vec::new();
        for m in &all {
            match best.last() {
                Some(prev) if prev.resource_id == m.resource_id => {}
                _ => best.push(m.clone()),
            }
        }

        Ok(LocationMatches { best, all })
    }
}
