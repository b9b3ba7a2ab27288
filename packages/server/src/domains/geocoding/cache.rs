use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::sync::Mutex;

use crate::domains::geocoding::models::{CacheStats, GeocodingCacheEntry};
use crate::kernel::BaseGeocodingCache;

/// Process-local cache keyed by normalized query.
#[derive(Debug, Default)]
pub struct InMemoryGeocodingCache {
    entries: Mutex<HashMap<String, GeocodingCacheEntry>>,
}

impl InMemoryGeocodingCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseGeocodingCache for InMemoryGeocodingCache {
    async fn get_fresh(&self, normalized_query: &str, now: DateTime<Utc>) -> Result<Option<GeocodingCacheEntry>> {
        let mut entries = self.entries.lock().await;
        match entries.get_mut(normalized_query) {
            Some(entry) if !entry.is_expired(now) => {
                entry.hit_count += 1;
                Ok(Some(entry.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn put(&self, entry: GeocodingCacheEntry) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(entry.normalized_query.clone(), entry);
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        Ok((before - entries.len()) as u64)
    }

    async fn stats(&self, now: DateTime<Utc>) -> Result<CacheStats> {
        let entries = self.entries.lock().await;
        Ok(CacheStats {
            entries: entries.len() as u64,
            expired: entries.values().filter(|e| e.is_expired(now)).count() as u64,
            total_hits: entries.values().map(|e| e.hit_count.max(0) as u64).sum(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct PgGeocodingCache {
    pool: PgPool,
}

impl PgGeocodingCache {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseGeocodingCache for PgGeocodingCache {
    async fn get_fresh(&self, normalized_query: &str, now: DateTime<Utc>) -> Result<Option<GeocodingCacheEntry>> {
        GeocodingCacheEntry::hit(normalized_query, now, &self.pool).await
    }

    async fn put(&self, entry: GeocodingCacheEntry) -> Result<()> {
        entry.upsert(&self.pool).await
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        GeocodingCacheEntry::delete_expired(now, &self.pool).await
    }

    async fn stats(&self, now: DateTime<Utc>) -> Result<CacheStats> {
        GeocodingCacheEntry::stats(now, &self.pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::LatLon;
    use chrono::Duration;

    fn entry(query: &str, confidence: f64, now: DateTime<Utc>) -> GeocodingCacheEntry {
        GeocodingCacheEntry::new(query, LatLon::new(37.1283, -84.0836), confidence, "mock", now)
    }

    #[tokio::test]
    async fn hit_increments_count() {
        let cache = InMemoryGeocodingCache::new();
        let now = Utc::now();
        cache.put(entry("london, ky", 0.9, now)).await.unwrap();

        let first = cache.get_fresh("london, ky", now).await.unwrap().unwrap();
        let second = cache.get_fresh("london, ky", now).await.unwrap().unwrap();
        assert_eq!(first.hit_count, 1);
        assert_eq!(second.hit_count, 2);
        assert!(cache.get_fresh("corbin, ky", now).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn parallel_hits_are_all_counted() {
        const CALLERS: usize = 64;
        let cache = std::sync::Arc::new(InMemoryGeocodingCache::new());
        let now = Utc::now();
        cache.put(entry("london, ky", 0.9, now)).await.unwrap();

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..CALLERS {
            let cache = cache.clone();
            tasks.spawn(async move { cache.get_fresh("london, ky", now).await.unwrap().unwrap().hit_count });
        }
        let mut seen = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            seen.push(joined.unwrap());
        }

        // every caller observed a distinct count
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), CALLERS);
        assert_eq!(cache.stats(now).await.unwrap().total_hits, CALLERS as u64);
    }

    #[tokio::test]
    async fn expired_entry_is_a_miss_and_can_be_overwritten() {
        let cache = InMemoryGeocodingCache::new();
        let now = Utc::now();
        cache.put(entry("london, ky", 0.3, now)).await.unwrap();

        let later = now + Duration::days(2);
        assert!(cache.get_fresh("london, ky", later).await.unwrap().is_none());

        cache.put(entry("london, ky", 0.9, later)).await.unwrap();
        let fresh = cache.get_fresh("london, ky", later).await.unwrap().unwrap();
        assert_eq!(fresh.confidence, 0.9);
        assert_eq!(fresh.hit_count, 1);
    }

    #[tokio::test]
    async fn purge_and_stats() {
        let cache = InMemoryGeocodingCache::new();
        let now = Utc::now();
        cache.put(entry("a", 0.3, now)).await.unwrap();
        cache.put(entry("b", 0.9, now)).await.unwrap();
        cache.get_fresh("b", now).await.unwrap();

        let later = now + Duration::days(3);
        let stats = cache.stats(later).await.unwrap();
        assert_eq!(
            stats,
            CacheStats {
                entries: 2,
                expired: 1,
                total_hits: 1
            }
        );

        assert_eq!(cache.purge_expired(later).await.unwrap(), 1);
        assert_eq!(cache.stats(later).await.unwrap().entries, 1);
    }
}
