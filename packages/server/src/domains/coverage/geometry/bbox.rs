use geo::{BoundingRect, MultiPolygon};
use serde::{Deserialize, Serialize};

use crate::common::LatLon;

/// Axis-aligned extent of a geometry in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    pub fn of(geom: &MultiPolygon<f64>) -> Option<Self> {
        geom.bounding_rect().map(|rect| Self {
            north: rect.max().y,
            south: rect.min().y,
            east: rect.max().x,
            west: rect.min().x,
        })
    }

    /// Planar area in square degrees. Only meaningful for comparing extents.
    pub fn area(&self) -> f64 {
        (self.north - self.south) * (self.east - self.west)
    }

    pub fn contains(&self, point: LatLon) -> bool {
        point.latitude >= self.south
            && point.latitude <= self.north
            && point.longitude >= self.west
            && point.longitude <= self.east
    }

    pub fn contains_bbox(&self, other: &BoundingBox) -> bool {
        other.south >= self.south && other.north <= self.north && other.west >= self.west && other.east <= self.east
    }

    pub fn center(&self) -> LatLon {
        LatLon::new(
            (self.north + self.south) / 2.0,
            (self.east + self.west) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn bbox_spans_all_parts() {
        let geom = MultiPolygon::new(vec![
            polygon![(x: -1.0, y: 0.0), (x: 0.0, y: 0.0), (x: 0.0, y: 1.0)],
            polygon![(x: 3.0, y: -2.0), (x: 4.0, y: -2.0), (x: 4.0, y: -1.0)],
        ]);
        let bbox = BoundingBox::of(&geom).unwrap();
        assert_eq!(
            bbox,
            BoundingBox {
                north: 1.0,
                south: -2.0,
                east: 4.0,
                west: -1.0
            }
        );
        assert_eq!(bbox.area(), 15.0);
        assert!(bbox.contains(LatLon::new(-0.5, 2.0)));
        assert!(!bbox.contains(LatLon::new(1.5, 2.0)));

        let inner = BoundingBox {
            north: 0.5,
            south: -1.0,
            east: 4.0,
            west: 0.0,
        };
        assert!(bbox.contains_bbox(&inner));
        assert!(bbox.contains_bbox(&bbox));
        assert!(!inner.contains_bbox(&bbox));
    }

    #[test]
    fn empty_geometry_has_no_bbox() {
        assert!(BoundingBox::of(&MultiPolygon::<f64>::new(vec![])).is_none());
    }
}
