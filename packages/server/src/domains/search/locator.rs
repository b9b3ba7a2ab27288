use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::common::{LatLon, ResourceId};
use crate::domains::search::models::ResourceLocation;
use crate::kernel::BaseResourceLocator;

#[derive(Debug, Default)]
pub struct InMemoryResourceLocator {
    locations: RwLock<HashMap<ResourceId, LatLon>>,
}

impl InMemoryResourceLocator {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseResourceLocator for InMemoryResourceLocator {
    async fn locate(&self, resource_ids: &[ResourceId]) -> Result<HashMap<ResourceId, LatLon>> {
        let locations = self.locations.read().await;
        Ok(resource_ids
            .iter()
            .filter_map(|id| locations.get(id).map(|loc| (*id, *loc)))
            .collect())
    }

    async fn set_location(&self, resource_id: ResourceId, location: LatLon) -> Result<()> {
        self.locations.write().await.insert(resource_id, location);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PgResourceLocator {
    pool: PgPool,
}

impl PgResourceLocator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseResourceLocator for PgResourceLocator {
    async fn locate(&self, resource_ids: &[ResourceId]) -> Result<HashMap<ResourceId, LatLon>> {
        let rows = ResourceLocation::find_for_resources(resource_ids, &self.pool).await?;
        Ok(rows.into_iter().map(|r| (r.resource_id, r.location())).collect())
    }

    async fn set_location(&self, resource_id: ResourceId, location: LatLon) -> Result<()> {
        ResourceLocation::upsert(resource_id, location, &self.pool).await?;
        Ok(())
    }
}
