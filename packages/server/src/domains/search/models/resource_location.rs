use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{LatLon, ResourceId};

/// Physical location of a resource, used for proximity ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ResourceLocation {
    pub resource_id: ResourceId,
    pub latitude: f64,
    pub longitude: f64,
    pub updated_at: DateTime<Utc>,
}

impl ResourceLocation {
    pub fn location(&self) -> LatLon {
        LatLon::new(self.latitude, self.longitude)
    }

    pub async fn find_for_resources(resource_ids: &[ResourceId], pool: &PgPool) -> Result<Vec<Self>> {
        if resource_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Self>("SELECT * FROM resource_locations WHERE resource_id = ANY($1)")
            .bind(resource_ids)
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn upsert(resource_id: ResourceId, location: LatLon, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO resource_locations (resource_id, latitude, longitude, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (resource_id) DO UPDATE
            SET latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(resource_id)
        .bind(location.latitude)
        .bind(location.longitude)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
