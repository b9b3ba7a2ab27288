use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{CoverageAreaId, ResourceCoverageId, ResourceId};

/// Links a resource to a coverage area it serves. A resource with no links is
/// excluded from location-based search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ResourceCoverage {
    pub id: ResourceCoverageId,
    pub resource_id: ResourceId,
    pub coverage_area_id: CoverageAreaId,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ResourceCoverage {
    pub fn new(
        resource_id: ResourceId,
        coverage_area_id: CoverageAreaId,
        notes: Option<String>,
        created_by: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ResourceCoverageId::new(),
            resource_id,
            coverage_area_id,
            notes,
            created_by,
            created_at: now,
        }
    }
}

// =============================================================================
// SQL Queries
// =============================================================================

impl ResourceCoverage {
    /// Link a resource to an area. Idempotent per pair (ON CONFLICT DO UPDATE).
    pub async fn upsert(&self, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO resource_coverages (id, resource_id, coverage_area_id, notes, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (resource_id, coverage_area_id) DO UPDATE
            SET notes = COALESCE(EXCLUDED.notes, resource_coverages.notes)
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(self.resource_id)
        .bind(self.coverage_area_id)
        .bind(&self.notes)
        .bind(&self.created_by)
        .bind(self.created_at)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Returns true if a link was removed.
    pub async fn delete(
        resource_id: ResourceId,
        coverage_area_id: CoverageAreaId,
        pool: &PgPool,
    ) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM resource_coverages WHERE resource_id = $1 AND coverage_area_id = $2",
        )
        .bind(resource_id)
        .bind(coverage_area_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn find_for_areas(area_ids: &[CoverageAreaId], pool: &PgPool) -> Result<Vec<Self>> {
        if area_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Self>(
            "SELECT * FROM resource_coverages WHERE coverage_area_id = ANY($1) ORDER BY created_at ASC",
        )
        .bind(area_ids)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_for_resource(resource_id: ResourceId, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM resource_coverages WHERE resource_id = $1 ORDER BY created_at ASC",
        )
        .bind(resource_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
