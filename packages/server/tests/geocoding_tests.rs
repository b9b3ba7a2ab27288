//! Geocoder behaviour under load, expiry and outage.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinSet;

use crate::common::*;
use coverage_core::domains::geocoding::{CircuitState, GeocodingCacheEntry, GeocoderConfig};
use coverage_core::kernel::test_dependencies::{MockGeocodeProvider, TestDependencies};
use coverage_core::kernel::BaseGeocodingCache;

fn single_attempt() -> GeocoderConfig {
    GeocoderConfig {
        max_attempts: 1,
        ..GeocoderConfig::default()
    }
}

#[tokio::test]
async fn expiry_follows_confidence() {
    let test = TestDependencies::new();
    let cache = &test.cache;
    let two_days_ago = Utc::now() - chrono::Duration::days(2);

    cache
        .put(GeocodingCacheEntry::new("low", LONDON_KY, 0.3, "mock", two_days_ago))
        .await
        .unwrap();
    cache
        .put(GeocodingCacheEntry::new("medium", LONDON_KY, 0.6, "mock", two_days_ago))
        .await
        .unwrap();
    cache
        .put(GeocodingCacheEntry::new("high", LONDON_KY, 0.95, "mock", two_days_ago))
        .await
        .unwrap();

    let now = Utc::now();
    assert!(cache.get_fresh("low", now).await.unwrap().is_none());
    assert!(cache.get_fresh("medium", now).await.unwrap().is_some());
    let high = cache.get_fresh("high", now).await.unwrap().unwrap();
    assert_eq!(high.hit_count, 1);
    assert_eq!(cache.get_fresh("high", now).await.unwrap().unwrap().hit_count, 2);

    let geocoder = test.deps().geocoder;
    let stats = geocoder.cache_stats().await.unwrap();
    assert_eq!(stats.entries, 3);
    assert_eq!(stats.expired, 1);
    assert_eq!(stats.total_hits, 3);

    assert_eq!(geocoder.purge_expired().await.unwrap(), 1);
    assert_eq!(geocoder.cache_stats().await.unwrap().entries, 2);
}

#[tokio::test]
async fn expired_entry_is_refreshed_from_provider() {
    let test = TestDependencies::with_provider(MockGeocodeProvider::succeeding("mock", 37.0, -84.0, 0.9));
    let stale = GeocodingCacheEntry::new("london, ky", LONDON_KY, 0.2, "old", Utc::now() - chrono::Duration::days(3));
    test.cache.put(stale).await.unwrap();

    let result = test.deps().geocoder.geocode("London, KY").await;
    assert!(!result.cached);
    assert_eq!(result.provider.as_deref(), Some("mock"));
    assert_eq!(test.provider.call_count(), 1);

    let fresh = test.cache.get_fresh("london, ky", Utc::now()).await.unwrap().unwrap();
    assert_eq!(fresh.provider, "mock");
    assert_eq!(fresh.hit_count, 1);
}

#[tokio::test(start_paused = true)]
async fn half_open_admits_one_trial_among_concurrent_callers() {
    let test = TestDependencies::with_provider(
        MockGeocodeProvider::failing("mock").with_delay(Duration::from_secs(1)),
    )
    .geocoder_config(single_attempt());
    let geocoder = test.deps().geocoder;

    for i in 0..5 {
        assert!(geocoder.geocode(&format!("outage {}", i)).await.approximate);
    }
    assert_eq!(geocoder.breaker_snapshot().state, CircuitState::Open);
    assert!(geocoder.breaker_snapshot().opened_at.is_some());
    assert_eq!(test.provider.call_count(), 5);

    tokio::time::advance(Duration::from_secs(61)).await;

    let mut callers = JoinSet::new();
    for i in 0..10 {
        let geocoder = Arc::clone(&geocoder);
        callers.spawn(async move { geocoder.geocode(&format!("after cooldown {}", i)).await });
    }
    while let Some(result) = callers.join_next().await {
        assert!(result.unwrap().approximate);
    }

    assert_eq!(test.provider.call_count(), 6);
    assert_eq!(geocoder.breaker_snapshot().state, CircuitState::Open);
}

#[tokio::test(start_paused = true)]
async fn outage_never_surfaces_as_error() {
    let test = TestDependencies::with_provider(MockGeocodeProvider::failing("mock"));
    let deps = test.deps();
    create_area(&deps, radius_input("London", LONDON_KY, 5.0)).await;

    for query in ["London", "", "   ", "somewhere in London", "Paris"] {
        let result = deps.geocoder.geocode(query).await;
        assert!(result.approximate, "query {:?}", query);
        assert!(result.confidence <= 0.4);
    }

    let london = deps.geocoder.geocode("london").await;
    assert!(london.coverage_area_id().is_some());
}
