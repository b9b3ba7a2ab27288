//! Location search: resolve the query, match coverage areas, rank resources.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::common::{CoverageAreaId, LatLon};
use crate::domains::coverage::error::{CoverageError, ValidationError};
use crate::domains::coverage::matcher::{query_point, LocationMatches};
use crate::domains::coverage::models::CoverageArea;
use crate::domains::geocoding::GeocodeResult;
use crate::domains::ranking::{rank_candidates, RankCandidate, RankedResource};
use crate::kernel::ServerDeps;

/// Where to search from.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    /// Free text, geocoded first
    Text(String),
    /// Explicit point; geocoding is skipped
    Coordinates(LatLon),
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    /// Point used for matching and distances, when one was resolved
    pub query_point: Option<LatLon>,
    pub geocode: Option<GeocodeResult>,
    /// True when results come from a name-match fallback or the query was unresolvable
    pub approximate: bool,
    pub results: Vec<RankedResource>,
}

fn validate_radius(radius_miles: Option<f64>) -> Result<(), ValidationError> {
    match radius_miles {
        Some(miles) if !miles.is_finite() || miles <= 0.0 => Err(ValidationError::RadiusOutOfRange {
            miles,
            min: 0.0,
            max: f64::MAX,
        }),
        _ => Ok(()),
    }
}

/// Find resources serving a location, most specific and closest first.
///
/// `radius_miles` drops candidates whose known location is further away;
/// candidates without a known location are kept.
pub async fn find_resources_by_location(
    query: LocationQuery,
    radius_miles: Option<f64>,
    deps: &ServerDeps,
) -> Result<SearchOutcome, CoverageError> {
    validate_radius(radius_miles)?;

    let (mut outcome, point) = match query {
        LocationQuery::Coordinates(point) => {
            let point = query_point(point)?;
            let results = search_at_point(point, deps).await?;
            (
                SearchOutcome {
                    query_point: Some(point),
                    geocode: None,
                    approximate: false,
                    results,
                },
                Some(point),
            )
        }
        LocationQuery::Text(text) => {
            let geocode = deps.geocoder.geocode(&text).await;
            if let Some(point) = geocode.location() {
                let results = search_at_point(point, deps).await?;
                (
                    SearchOutcome {
                        query_point: Some(point),
                        approximate: geocode.approximate,
                        geocode: Some(geocode),
                        results,
                    },
                    Some(point),
                )
            } else if let Some(area_id) = geocode.coverage_area_id() {
                let results = search_from_area(area_id, deps).await?;
                (
                    SearchOutcome {
                        query_point: None,
                        geocode: Some(geocode),
                        approximate: true,
                        results,
                    },
                    None,
                )
            } else {
                info!(query = %text, "Location query unresolvable, returning no results");
                (
                    SearchOutcome {
                        query_point: None,
                        geocode: Some(geocode),
                        approximate: true,
                        results: Vec::new(),
                    },
                    None,
                )
            }
        }
    };

    if let Some(radius) = radius_miles {
        let before = outcome.results.len();
        outcome
            .results
            .retain(|r| r.distance_miles.map_or(true, |d| d <= radius));
        debug!(radius, before, after = outcome.results.len(), has_point = point.is_some(), "Applied radius filter");
    }

    Ok(outcome)
}

async fn search_at_point(point: LatLon, deps: &ServerDeps) -> Result<Vec<RankedResource>, CoverageError> {
    let matches = deps.matcher.find_resources_by_location(point).await?;
    rank_matches(matches, Some(point), deps).await
}

/// Fallback path: resources on the matched area plus every area covering
/// the whole of it. Smaller areas that only overlap part of the match are
/// left out. No distances are computed.
async fn search_from_area(area_id: CoverageAreaId, deps: &ServerDeps) -> Result<Vec<RankedResource>, CoverageError> {
    let Some(area) = deps.coverage_areas.get(area_id).await? else {
        return Ok(Vec::new());
    };

    // Anything covering the area also contains its representative point.
    let mut areas: Vec<Arc<CoverageArea>> = deps
        .matcher
        .find_coverage_areas(area.representative_point())
        .await?
        .into_iter()
        .filter(|candidate| candidate.id == area.id || candidate.covers(&area))
        .collect();
    if !areas.iter().any(|a| a.id == area.id) {
        areas.push(area);
    }
    debug!(area_id = %area_id, areas = areas.len(), "Approximate search over covering areas");

    let matches = deps.matcher.resources_for_areas(&areas).await?;
    rank_matches(matches, None, deps).await
}

async fn rank_matches(
    matches: LocationMatches,
    point: Option<LatLon>,
    deps: &ServerDeps,
) -> Result<Vec<RankedResource>, CoverageError> {
    if matches.best.is_empty() {
        return Ok(Vec::new());
    }

    let locations = if point.is_some() {
        let ids: Vec<_> = matches.best.iter().map(|m| m.resource_id).collect();
        deps.resource_locator.locate(&ids).await?
    } else {
        Default::default()
    };

    let candidates = matches
        .best
        .into_iter()
        .map(|m| RankCandidate {
            resource_id: m.resource_id,
            coverage_area_id: m.coverage_area_id,
            kind: m.kind,
            location: locations.get(&m.resource_id).copied(),
        })
        .collect();

    Ok(rank_candidates(candidates, point))
}
