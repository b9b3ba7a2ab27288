//! Geometry validation performed before any coverage area write.

use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{BoundingRect, Coord, CoordsIter, Intersects, Line, LineString, MultiPolygon, Polygon, Rect};

use crate::domains::coverage::error::ValidationError;

/// Upper bound on vertices per area. Keeps containment queries cheap.
pub const MAX_VERTICES: usize = 50_000;

/// Reject geometry that is empty, out of bounds, too complex, or
/// self-intersecting. Touching rings count as an intersection.
pub fn validate_multipolygon(geom: &MultiPolygon<f64>) -> Result<(), ValidationError> {
    if geom.0.is_empty() {
        return Err(ValidationError::EmptyGeometry);
    }

    let count = geom.coords_count();
    if count > MAX_VERTICES {
        return Err(ValidationError::TooManyVertices {
            count,
            max: MAX_VERTICES,
        });
    }

    for (index, polygon) in geom.0.iter().enumerate() {
        validate_rings(index, polygon)?;
        for coord in polygon.coords_iter() {
            validate_coord(coord)?;
        }
        if polygon_self_intersects(polygon) {
            return Err(ValidationError::SelfIntersection { polygon: index });
        }
    }

    Ok(())
}

fn validate_rings(index: usize, polygon: &Polygon<f64>) -> Result<(), ValidationError> {
    let rings = std::iter::once(polygon.exterior()).chain(polygon.interiors().iter());
    for (ring, line) in rings.enumerate() {
        let positions = line.0.len();
        if positions < 4 {
            return Err(ValidationError::RingTooShort {
                polygon: index,
                ring,
                positions,
            });
        }
    }
    Ok(())
}

pub(crate) fn validate_coord(coord: Coord<f64>) -> Result<(), ValidationError> {
    if !coord.x.is_finite() || !coord.y.is_finite() {
        return Err(ValidationError::NonFiniteCoordinate);
    }
    if !(-90.0..=90.0).contains(&coord.y) || !(-180.0..=180.0).contains(&coord.x) {
        return Err(ValidationError::CoordinateOutOfBounds {
            latitude: coord.y,
            longitude: coord.x,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    ring: usize,
    index: usize,
    ring_segments: usize,
    line: Line<f64>,
    bounds: Rect<f64>,
}

impl Segment {
    fn new(ring: usize, index: usize, ring_segments: usize, line: Line<f64>) -> Self {
        Self {
            ring,
            index,
            ring_segments,
            line,
            bounds: line.bounding_rect(),
        }
    }

    fn is_neighbour(&self, other: &Segment) -> bool {
        if self.ring != other.ring {
            return false;
        }
        let n = self.ring_segments;
        (self.index + 1) % n == other.index || (other.index + 1) % n == self.index
    }
}

fn ring_segments(ring: usize, line: &LineString<f64>) -> Vec<Segment> {
    let n = line.0.len().saturating_sub(1);
    line.lines()
        .enumerate()
        .map(|(i, l)| Segment::new(ring, i, n, l))
        .collect()
}

/// Sweep over segments sorted by min x, testing only pairs whose bounds
/// overlap.
pub(crate) fn polygon_self_intersects(polygon: &Polygon<f64>) -> bool {
    let mut segments = ring_segments(0, polygon.exterior());
    for (i, hole) in polygon.interiors().iter().enumerate() {
        segments.extend(ring_segments(i + 1, hole));
    }
    segments.sort_by(|l, r| l.bounds.min().x.total_cmp(&r.bounds.min().x));

    for i in 0..segments.len() {
        let s = &segments[i];
        for t in &segments[i + 1..] {
            if t.bounds.min().x > s.bounds.max().x {
                break;
            }
            if t.bounds.min().y > s.bounds.max().y || t.bounds.max().y < s.bounds.min().y {
                continue;
            }
            if s.is_neighbour(t) {
                if folds_back(s, t) {
                    return true;
                }
            } else if s.line.intersects(&t.line) {
                return true;
            }
        }
    }
    false
}

/// Consecutive segments share a vertex; they are only invalid when they
/// overlap along a line (a spike or a zero-area ring).
fn folds_back(first: &Segment, second: &Segment) -> bool {
    matches!(
        line_intersection(first.line, second.line),
        Some(LineIntersection::Collinear { .. })
    )
}
