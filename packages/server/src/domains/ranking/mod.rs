//! Orders matched resources by coverage specificity, then proximity.
//!
//! Sort key, in order:
//! 1. specificity weight, descending (RADIUS 4, CITY/POLYGON 3, COUNTY 2, STATE 1)
//! 2. haversine distance to the query point, ascending; unknown distances last
//! 3. resource id, ascending

use std::cmp::Ordering;

use serde::Serialize;

use crate::common::utils::haversine_miles;
use crate::common::{CoverageAreaId, LatLon, ResourceId};
use crate::domains::coverage::models::CoverageKind;

/// Ranking input: one resource with the kind of its most specific matching area.
#[derive(Debug, Clone, PartialEq)]
pub struct RankCandidate {
    pub resource_id: ResourceId,
    pub coverage_area_id: CoverageAreaId,
    pub kind: CoverageKind,
    pub location: Option<LatLon>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResource {
    pub resource_id: ResourceId,
    pub coverage_area_id: CoverageAreaId,
    pub kind: CoverageKind,
    pub distance_miles: Option<f64>,
    pub specificity_weight: u8,
}

fn distance(query_point: Option<LatLon>, location: Option<LatLon>) -> Option<f64> {
    let (from, to) = (query_point?, location?);
    if !from.is_finite() || !to.is_finite() {
        return None;
    }
    let d = haversine_miles(from, to);
    d.is_finite().then_some(d)
}

fn compare(l: &RankedResource, r: &RankedResource) -> Ordering {
    r.specificity_weight
        .cmp(&l.specificity_weight)
        .then_with(|| match (l.distance_miles, r.distance_miles) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| l.resource_id.cmp(&r.resource_id))
}

/// Score and sort candidates. Without a query point every distance is unknown.
pub fn rank_candidates(candidates: Vec<RankCandidate>, query_point: Option<LatLon>) -> Vec<RankedResource> {
    let mut ranked: Vec<RankedResource> = candidates
        .into_iter()
        .map(|c| RankedResource {
            resource_id: c.resource_id,
            coverage_area_id: c.coverage_area_id,
            kind: c.kind,
            distance_miles: distance(query_point, c.location),
            specificity_weight: c.kind.specificity_weight(),
        })
        .collect();
    ranked.sort_by(compare);
    ranked
}

pub fn rank(candidates: Vec<RankCandidate>, query_point: Option<LatLon>) -> Vec<ResourceId> {
    rank_candidates(candidates, query_point)
        .into_iter()
        .map(|r| r.resource_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::utils::destination_point;
    use uuid::Uuid;

    const QUERY: LatLon = LatLon {
        latitude: 37.1283,
        longitude: -84.0836,
    };

    fn rid(n: u128) -> ResourceId {
        ResourceId::from_uuid(Uuid::from_u128(n))
    }

    fn candidate(id: ResourceId, kind: CoverageKind, location: Option<LatLon>) -> RankCandidate {
        RankCandidate {
            resource_id: id,
            coverage_area_id: CoverageAreaId::new(),
            kind,
            location,
        }
    }

    #[test]
    fn radius_nearby_beats_state_unknown() {
        let a = rid(2);
        let b = rid(1);
        let order = rank(
            vec![
                candidate(b, CoverageKind::State, None),
                candidate(a, CoverageKind::Radius, Some(destination_point(QUERY, 0.0, 2.0))),
            ],
            Some(QUERY),
        );
        assert_eq!(order, vec![a, b]);
    }

    #[test]
    fn within_tier_known_distance_first_then_id() {
        let near = rid(9);
        let far = rid(8);
        let unknown_low = rid(1);
        let unknown_high = rid(5);
        let ranked = rank_candidates(
            vec![
                candidate(unknown_high, CoverageKind::County, None),
                candidate(far, CoverageKind::County, Some(destination_point(QUERY, 90.0, 30.0))),
                candidate(unknown_low, CoverageKind::County, None),
                candidate(near, CoverageKind::County, Some(destination_point(QUERY, 90.0, 3.0))),
            ],
            Some(QUERY),
        );
        let order: Vec<_> = ranked.iter().map(|r| r.resource_id).collect();
        assert_eq!(order, vec![near, far, unknown_low, unknown_high]);
        assert!((ranked[0].distance_miles.unwrap() - 3.0).abs() < 0.01);
        assert_eq!(ranked[0].specificity_weight, 2);
    }

    #[test]
    fn specificity_outranks_distance() {
        let city_far = rid(1);
        let county_near = rid(2);
        let order = rank(
            vec![
                candidate(county_near, CoverageKind::County, Some(QUERY)),
                candidate(city_far, CoverageKind::City, Some(destination_point(QUERY, 180.0, 40.0))),
            ],
            Some(QUERY),
        );
        assert_eq!(order, vec![city_far, county_near]);
    }

    #[test]
    fn no_query_point_orders_by_tier_then_id() {
        let ranked = rank_candidates(
            vec![
                candidate(rid(3), CoverageKind::State, Some(QUERY)),
                candidate(rid(2), CoverageKind::Radius, Some(QUERY)),
                candidate(rid(1), CoverageKind::State, Some(QUERY)),
            ],
            None,
        );
        assert!(ranked.iter().all(|r| r.distance_miles.is_none()));
        let order: Vec<_> = ranked.iter().map(|r| r.resource_id).collect();
        assert_eq!(order, vec![rid(2), rid(1), rid(3)]);
    }

    #[test]
    fn out_of_range_coordinates_are_normalized() {
        let wrapped = LatLon::new(37.1283, -84.0836 + 360.0);
        let ranked = rank_candidates(
            vec![candidate(rid(1), CoverageKind::Radius, Some(wrapped))],
            Some(QUERY),
        );
        assert!(ranked[0].distance_miles.unwrap() < 1e-6);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(rank(Vec::new(), Some(QUERY)).is_empty());
    }
}
