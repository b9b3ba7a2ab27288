use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::LatLon;

/// A resolved query cached by normalized text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct GeocodingCacheEntry {
    pub normalized_query: String,
    pub latitude: f64,
    pub longitude: f64,
    pub confidence: f64,
    pub provider: String,
    pub hit_count: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Cache lifetime for a result of the given confidence.
pub fn ttl_for_confidence(confidence: f64) -> Duration {
    if confidence >= 0.8 {
        Duration::days(30)
    } else if confidence >= 0.5 {
        Duration::days(7)
    } else {
        Duration::days(1)
    }
}

impl GeocodingCacheEntry {
    pub fn new(
        normalized_query: impl Into<String>,
        location: LatLon,
        confidence: f64,
        provider: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            normalized_query: normalized_query.into(),
            latitude: location.latitude,
            longitude: location.longitude,
            confidence,
            provider: provider.into(),
            hit_count: 0,
            created_at: now,
            expires_at: now + ttl_for_confidence(confidence),
        }
    }

    pub fn location(&self) -> LatLon {
        LatLon::new(self.latitude, self.longitude)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Aggregate counters for cache monitoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub entries: u64,
    pub expired: u64,
    pub total_hits: u64,
}

// =============================================================================
// SQL Queries
// =============================================================================

impl GeocodingCacheEntry {
    /// Fetch an unexpired entry and count the hit in one statement.
    pub async fn hit(normalized_query: &str, now: DateTime<Utc>, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE geocoding_cache
            SET hit_count = hit_count + 1
            WHERE normalized_query = $1 AND expires_at > $2
            RETURNING *
            "#,
        )
        .bind(normalized_query)
        .bind(now)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Insert or overwrite the entry for this query, resetting its hit count.
    pub async fn upsert(&self, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO geocoding_cache
                (normalized_query, latitude, longitude, confidence, provider, hit_count, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (normalized_query) DO UPDATE
            SET latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                confidence = EXCLUDED.confidence,
                provider = EXCLUDED.provider,
                hit_count = EXCLUDED.hit_count,
                created_at = EXCLUDED.created_at,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(&self.normalized_query)
        .bind(self.latitude)
        .bind(self.longitude)
        .bind(self.confidence)
        .bind(&self.provider)
        .bind(self.hit_count)
        .bind(self.created_at)
        .bind(self.expires_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn delete_expired(now: DateTime<Utc>, pool: &PgPool) -> Result<u64> {
        let result = sqlx::query("DELETE FROM geocoding_cache WHERE expires_at <= $1")
            .bind(now)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn stats(now: DateTime<Utc>, pool: &PgPool) -> Result<CacheStats> {
        let (entries, expired, total_hits): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE expires_at <= $1),
                   COALESCE(SUM(hit_count), 0)::BIGINT
            FROM geocoding_cache
            "#,
        )
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(CacheStats {
            entries: entries.max(0) as u64,
            expired: expired.max(0) as u64,
            total_hits: total_hits.max(0) as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_tiers() {
        assert_eq!(ttl_for_confidence(0.95), Duration::days(30));
        assert_eq!(ttl_for_confidence(0.8), Duration::days(30));
        assert_eq!(ttl_for_confidence(0.79), Duration::days(7));
        assert_eq!(ttl_for_confidence(0.5), Duration::days(7));
        assert_eq!(ttl_for_confidence(0.49), Duration::days(1));
    }

    #[test]
    fn entry_expiry_follows_confidence() {
        let now = Utc::now();
        let entry = GeocodingCacheEntry::new("london, ky", LatLon::new(37.1283, -84.0836), 0.9, "nominatim", now);
        assert_eq!(entry.expires_at, now + Duration::days(30));
        assert!(!entry.is_expired(now + Duration::days(29)));
        assert!(entry.is_expired(now + Duration::days(30)));
    }

    #[test]
    fn confidence_is_clamped() {
        let now = Utc::now();
        let entry = GeocodingCacheEntry::new("x", LatLon::new(0.0, 0.0), 1.7, "p", now);
        assert_eq!(entry.confidence, 1.0);
        let entry = GeocodingCacheEntry::new("x", LatLon::new(0.0, 0.0), f64::NAN, "p", now);
        assert_eq!(entry.confidence, 0.0);
        assert_eq!(entry.expires_at, now + Duration::days(1));
    }
}
