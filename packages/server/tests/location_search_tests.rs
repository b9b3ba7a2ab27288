//! End-to-end location search over in-memory stores.
//!
//! Areas: Kentucky (STATE), Laurel County (COUNTY), Corbin (CITY), a 10 mile
//! RADIUS around London and one around Louisville.

mod common;

use std::time::Duration;

use crate::common::*;
use coverage_core::common::{utils::destination_point, ResourceId};
use coverage_core::domains::coverage::models::CoverageKind;
use coverage_core::domains::geocoding::{GeocoderConfig, Resolution};
use coverage_core::domains::search::{find_resources_by_location, LocationQuery};
use coverage_core::kernel::test_dependencies::{MockGeocodeProvider, TestDependencies};
use coverage_core::kernel::ServerDeps;
use test_context::test_context;

struct Seeded {
    statewide: ResourceId,
    county_pantry: ResourceId,
    corbin_clinic: ResourceId,
    london_shelter: ResourceId,
    london_and_state: ResourceId,
    louisville_only: ResourceId,
    unattached: ResourceId,
}

async fn seed(deps: &ServerDeps) -> Seeded {
    let kentucky = create_area(deps, polygon_input(CoverageKind::State, "Kentucky", kentucky())).await;
    let laurel = create_area(deps, polygon_input(CoverageKind::County, "Laurel County", laurel_county())).await;
    let corbin = create_area(
        deps,
        polygon_input(CoverageKind::City, "Corbin", rectangle(-84.15, 36.90, -84.05, 37.0)),
    )
    .await;
    let london = create_area(deps, radius_input("London 10mi", LONDON_KY, 10.0)).await;
    let louisville = create_area(deps, radius_input("Louisville 10mi", LOUISVILLE_KY, 10.0)).await;

    let seeded = Seeded {
        statewide: resource_serving(deps, &[&kentucky]).await,
        county_pantry: resource_serving(deps, &[&laurel]).await,
        corbin_clinic: resource_serving(deps, &[&corbin]).await,
        london_shelter: resource_serving(deps, &[&london]).await,
        london_and_state: resource_serving(deps, &[&kentucky, &london]).await,
        louisville_only: resource_serving(deps, &[&louisville]).await,
        unattached: ResourceId::new(),
    };

    let locator = &deps.resource_locator;
    locator
        .set_location(seeded.london_shelter, destination_point(LONDON_KY, 90.0, 2.0))
        .await
        .unwrap();
    locator
        .set_location(seeded.london_and_state, destination_point(LONDON_KY, 270.0, 5.0))
        .await
        .unwrap();
    locator.set_location(seeded.unattached, LONDON_KY).await.unwrap();

    seeded
}

fn ids(outcome: &coverage_core::domains::search::SearchOutcome) -> Vec<ResourceId> {
    outcome.results.iter().map(|r| r.resource_id).collect()
}

#[test_context(TestHarness)]
#[tokio::test]
async fn coordinates_rank_by_specificity_then_distance(ctx: &mut TestHarness) {
    let s = seed(&ctx.deps).await;

    let outcome = find_resources_by_location(LocationQuery::Coordinates(LONDON_KY), None, &ctx.deps)
        .await
        .unwrap();

    assert!(!outcome.approximate);
    assert!(outcome.geocode.is_none());
    assert_eq!(
        ids(&outcome),
        vec![s.london_shelter, s.london_and_state, s.county_pantry, s.statewide]
    );

    // One entry per resource, carried by its most specific area
    let multi = &outcome.results[1];
    assert_eq!(multi.kind, CoverageKind::Radius);
    assert!((multi.distance_miles.unwrap() - 5.0).abs() < 0.05);

    let found = ids(&outcome);
    assert!(!found.contains(&s.unattached));
    assert!(!found.contains(&s.louisville_only));
    assert!(!found.contains(&s.corbin_clinic));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn corbin_is_outside_london_radius(ctx: &mut TestHarness) {
    let s = seed(&ctx.deps).await;

    let outcome = find_resources_by_location(LocationQuery::Coordinates(CORBIN_KY), None, &ctx.deps)
        .await
        .unwrap();

    // Within the STATE tier the resource with a known location comes first
    assert_eq!(ids(&outcome), vec![s.corbin_clinic, s.county_pantry, s.london_and_state, s.statewide]);
    assert_eq!(outcome.results[2].kind, CoverageKind::State);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn radius_filter_drops_far_known_locations_only(ctx: &mut TestHarness) {
    let s = seed(&ctx.deps).await;

    let outcome = find_resources_by_location(LocationQuery::Coordinates(LONDON_KY), Some(3.0), &ctx.deps)
        .await
        .unwrap();

    assert_eq!(ids(&outcome), vec![s.london_shelter, s.county_pantry, s.statewide]);
}

#[tokio::test]
async fn text_query_is_geocoded_then_matched() {
    let ctx = TestHarness::with_provider(MockGeocodeProvider::succeeding(
        "mock",
        LONDON_KY.latitude,
        LONDON_KY.longitude,
        0.9,
    ));
    let s = seed(&ctx.deps).await;

    let outcome = find_resources_by_location(LocationQuery::Text("London, KY".into()), None, &ctx.deps)
        .await
        .unwrap();

    assert!(!outcome.approximate);
    assert_eq!(outcome.query_point, Some(LONDON_KY));
    assert_eq!(outcome.results[0].resource_id, s.london_shelter);

    let again = find_resources_by_location(LocationQuery::Text("london,   ky".into()), None, &ctx.deps)
        .await
        .unwrap();
    assert!(again.geocode.as_ref().unwrap().cached);
    assert_eq!(ctx.test.provider.call_count(), 1);
    assert_eq!(ids(&again), ids(&outcome));
}

fn failing_provider_harness() -> TestHarness {
    TestHarness::new(
        TestDependencies::with_provider(MockGeocodeProvider::failing("mock")).geocoder_config(GeocoderConfig {
            max_attempts: 1,
            initial_backoff: Duration::from_millis(1),
            ..GeocoderConfig::default()
        }),
    )
}

#[tokio::test]
async fn provider_outage_falls_back_to_area_name() {
    let ctx = failing_provider_harness();
    let s = seed(&ctx.deps).await;

    let outcome = find_resources_by_location(LocationQuery::Text("Laurel County".into()), None, &ctx.deps)
        .await
        .unwrap();

    assert!(outcome.approximate);
    assert_eq!(outcome.query_point, None);
    let geocode = outcome.geocode.as_ref().unwrap();
    assert!(matches!(geocode.resolution, Resolution::CoverageArea { ref name, .. } if name == "Laurel County"));
    assert!(geocode.confidence <= 0.4);

    assert!(outcome.results.iter().all(|r| r.distance_miles.is_none()));
    let found = ids(&outcome);
    assert_eq!(found.len(), 3);
    for expected in [s.county_pantry, s.statewide, s.london_and_state] {
        assert!(found.contains(&expected));
    }
    // The London radius sits inside the county and does not serve all of it
    assert!(!found.contains(&s.london_shelter));
    assert!(!found.contains(&s.corbin_clinic));
    assert_eq!(outcome.results[0].resource_id, s.county_pantry);
    assert!(outcome.results[1..].iter().all(|r| r.kind == CoverageKind::State));
}

#[tokio::test]
async fn unresolvable_query_returns_empty_approximate_result() {
    let ctx = failing_provider_harness();
    seed(&ctx.deps).await;

    let outcome = find_resources_by_location(LocationQuery::Text("Atlantis".into()), None, &ctx.deps)
        .await
        .unwrap();

    assert!(outcome.approximate);
    assert!(outcome.results.is_empty());
    assert!(outcome.geocode.unwrap().is_unresolvable());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn out_of_range_longitude_is_wrapped(ctx: &mut TestHarness) {
    let s = seed(&ctx.deps).await;

    let wrapped = coverage_core::common::LatLon::new(LONDON_KY.latitude, LONDON_KY.longitude + 360.0);
    let outcome = find_resources_by_location(LocationQuery::Coordinates(wrapped), None, &ctx.deps)
        .await
        .unwrap();
    assert_eq!(outcome.results[0].resource_id, s.london_shelter);
}
