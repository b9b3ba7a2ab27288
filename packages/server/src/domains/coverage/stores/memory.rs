//! Process-local stores used by tests and when no database is configured.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::common::utils::normalize_query;
use crate::common::{CoverageAreaId, LatLon, ResourceId};
use crate::domains::coverage::error::CoverageError;
use crate::domains::coverage::models::{CoverageArea, CoverageAreaUpdate, CoverageKind, ResourceCoverage};
use crate::kernel::{BaseCoverageAreaStore, BaseResourceCoverageStore};

#[derive(Debug, Default)]
pub struct InMemoryCoverageAreaStore {
    areas: RwLock<HashMap<CoverageAreaId, Arc<CoverageArea>>>,
}

impl InMemoryCoverageAreaStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseCoverageAreaStore for InMemoryCoverageAreaStore {
    async fn insert(&self, area: CoverageArea) -> Result<Arc<CoverageArea>, CoverageError> {
        let area = Arc::new(area);
        self.areas.write().await.insert(area.id, area.clone());
        Ok(area)
    }

    async fn update(
        &self,
        id: CoverageAreaId,
        update: CoverageAreaUpdate,
        now: DateTime<Utc>,
    ) -> Result<Arc<CoverageArea>, CoverageError> {
        // Held across read and write so concurrent updates apply in turn.
        let mut areas = self.areas.write().await;
        let slot = areas.get_mut(&id).ok_or(CoverageError::NotFound(id))?;
        let next = Arc::new(slot.apply_update(update, now)?);
        *slot = next.clone();
        Ok(next)
    }

    async fn get(&self, id: CoverageAreaId) -> Result<Option<Arc<CoverageArea>>, CoverageError> {
        Ok(self.areas.read().await.get(&id).cloned())
    }

    async fn search(
        &self,
        kind: Option<CoverageKind>,
        name_substring: Option<&str>,
    ) -> Result<Vec<Arc<CoverageArea>>, CoverageError> {
        let needle = name_substring
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut found: Vec<_> = self
            .areas
            .read()
            .await
            .values()
            .filter(|a| kind.map_or(true, |k| a.kind == k))
            .filter(|a| {
                needle
                    .as_deref()
                    .map_or(true, |n| a.name.to_lowercase().contains(n))
            })
            .cloned()
            .collect();
        found.sort_by(|l, r| l.name.cmp(&r.name).then_with(|| l.id.cmp(&r.id)));
        Ok(found)
    }

    async fn find_containing(&self, point: LatLon) -> Result<Vec<Arc<CoverageArea>>, CoverageError> {
        Ok(self
            .areas
            .read()
            .await
            .values()
            .filter(|a| a.contains(point))
            .cloned()
            .collect())
    }

    async fn find_by_name_text(&self, normalized_query: &str) -> Result<Vec<Arc<CoverageArea>>, CoverageError> {
        let query = normalize_query(normalized_query);
        Ok(self
            .areas
            .read()
            .await
            .values()
            .filter(|a| a.name_match(&query).is_some())
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryResourceCoverageStore {
    links: RwLock<Vec<ResourceCoverage>>,
}

impl InMemoryResourceCoverageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseResourceCoverageStore for InMemoryResourceCoverageStore {
    async fn attach(&self, link: ResourceCoverage) -> Result<ResourceCoverage> {
        let mut links = self.links.write().await;
        let existing = links
            .iter_mut()
            .find(|l| l.resource_id == link.resource_id && l.coverage_area_id == link.coverage_area_id);

        match existing {
            Some(current) => {
                if link.notes.is_some() {
                    current.notes = link.notes;
                }
                Ok(current.clone())
            }
            None => {
                links.push(link.clone());
                Ok(link)
            }
        }
    }

    async fn detach(&self, resource_id: ResourceId, coverage_area_id: CoverageAreaId) -> Result<bool> {
        let mut links = self.links.write().await;
        let before = links.len();
        links.retain(|l| !(l.resource_id == resource_id && l.coverage_area_id == coverage_area_id));
        Ok(links.len() != before)
    }

    async fn for_areas(&self, area_ids: &[CoverageAreaId]) -> Result<Vec<ResourceCoverage>> {
        Ok(self
            .links
            .read()
            .await
            .iter()
            .filter(|l| area_ids.contains(&l.coverage_area_id))
            .cloned()
            .collect())
    }

    async fn for_resource(&self, resource_id: ResourceId) -> Result<Vec<ResourceCoverage>> {
        Ok(self
            .links
            .read()
            .await
            .iter()
            .filter(|l| l.resource_id == resource_id)
            .cloned()
            .collect())
    }
}
