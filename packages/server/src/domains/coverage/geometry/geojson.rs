//! GeoJSON (RFC 7946) conversion for polygon geometry.
//!
//! Accepts `Polygon`, `MultiPolygon`, or a `Feature` wrapping either. Output is
//! a `Polygon` when there is a single part, otherwise a `MultiPolygon`.

use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{json, Value};

use crate::domains::coverage::error::ValidationError;

pub fn parse_geometry(value: &Value) -> Result<MultiPolygon<f64>, ValidationError> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("missing \"type\""))?;

    match kind {
        "Feature" => {
            let geometry = value
                .get("geometry")
                .ok_or_else(|| invalid("Feature has no geometry"))?;
            parse_geometry(geometry)
        }
        "Polygon" => {
            let rings = coordinates(value)?;
            Ok(MultiPolygon::new(vec![parse_polygon(0, rings)?]))
        }
        "MultiPolygon" => {
            let parts = coordinates(value)?
                .as_array()
                .ok_or_else(|| invalid("MultiPolygon coordinates must be an array"))?;
            if parts.is_empty() {
                return Err(ValidationError::EmptyGeometry);
            }
            let polygons = parts
                .iter()
                .enumerate()
                .map(|(i, rings)| parse_polygon(i, rings))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(MultiPolygon::new(polygons))
        }
        other => Err(invalid(&format!(
            "unsupported geometry type \"{}\" (expected Polygon or MultiPolygon)",
            other
        ))),
    }
}

pub fn to_geojson(geom: &MultiPolygon<f64>) -> Value {
    match geom.0.as_slice() {
        [single] => json!({
            "type": "Polygon",
            "coordinates": polygon_coordinates(single),
        }),
        parts => json!({
            "type": "MultiPolygon",
            "coordinates": parts.iter().map(polygon_coordinates).collect::<Vec<_>>(),
        }),
    }
}

fn polygon_coordinates(polygon: &Polygon<f64>) -> Vec<Vec<[f64; 2]>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors().iter())
        .map(|ring| ring.0.iter().map(|c| [c.x, c.y]).collect())
        .collect()
}

fn invalid(message: &str) -> ValidationError {
    ValidationError::InvalidGeoJson(message.to_string())
}

fn coordinates(value: &Value) -> Result<&Value, ValidationError> {
    value
        .get("coordinates")
        .ok_or_else(|| invalid("missing \"coordinates\""))
}

fn parse_polygon(index: usize, rings: &Value) -> Result<Polygon<f64>, ValidationError> {
    let rings = rings
        .as_array()
        .ok_or_else(|| invalid("polygon must be an array of rings"))?;
    if rings.is_empty() {
        return Err(ValidationError::EmptyGeometry);
    }

    let mut parsed = Vec::with_capacity(rings.len());
    for (ring_index, ring) in rings.iter().enumerate() {
        let coords = parse_ring(ring)?;
        if coords.len() < 4 {
            return Err(ValidationError::RingTooShort {
                polygon: index,
                ring: ring_index,
                positions: coords.len(),
            });
        }
        parsed.push(LineString::from(coords));
    }

    let exterior = parsed.remove(0);
    Ok(Polygon::new(exterior, parsed))
}

/// Parse a ring, dropping repeated consecutive positions and closing it if
/// the last position differs from the first.
fn parse_ring(ring: &Value) -> Result<Vec<Coord<f64>>, ValidationError> {
    let positions = ring
        .as_array()
        .ok_or_else(|| invalid("ring must be an array of positions"))?;

    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(positions.len() + 1);
    for position in positions {
        let coord = parse_position(position)?;
        if coords.last() != Some(&coord) {
            coords.push(coord);
        }
    }

    if let (Some(first), Some(last)) = (coords.first().copied(), coords.last().copied()) {
        if first != last {
            coords.push(first);
        }
    }
    Ok(coords)
}

fn parse_position(position: &Value) -> Result<Coord<f64>, ValidationError> {
    let parts = position
        .as_array()
        .ok_or_else(|| invalid("position must be an array"))?;
    let lon = parts.first().and_then(Value::as_f64);
    let lat = parts.get(1).and_then(Value::as_f64);
    match (lon, lat) {
        (Some(x), Some(y)) => Ok(Coord { x, y }),
        _ => Err(invalid("position must start with two numbers [lon, lat]")),
    }
}

/// `#[serde(with = "...")]` adapter storing geometry as GeoJSON.
pub mod serde_geometry {
    use geo::MultiPolygon;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(geom: &MultiPolygon<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        super::to_geojson(geom).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<MultiPolygon<f64>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        super::parse_geometry(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polygon_is_parsed_and_closed() {
        let value = json!({
            "type": "Polygon",
            "coordinates": [[[-84.2, 37.0], [-84.0, 37.0], [-84.0, 37.2], [-84.2, 37.2]]]
        });
        let geom = parse_geometry(&value).unwrap();
        let ring = &geom.0[0].exterior().0;
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], ring[4]);
        assert_eq!(ring[1], Coord { x: -84.0, y: 37.0 });
    }

    #[test]
    fn feature_wrapper_is_unwrapped() {
        let value = json!({
            "type": "Feature",
            "properties": {"name": "Laurel County"},
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": [
                    [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
                    [[[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 5.0]]]
                ]
            }
        });
        let geom = parse_geometry(&value).unwrap();
        assert_eq!(geom.0.len(), 2);
    }

    #[test]
    fn duplicate_positions_do_not_count_towards_ring_length() {
        let value = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [0.0, 0.0], [1.0, 0.0], [1.0, 0.0], [0.0, 0.0]]]
        });
        assert!(matches!(
            parse_geometry(&value),
            Err(ValidationError::RingTooShort { positions: 3, .. })
        ));
    }

    #[test]
    fn point_geometry_is_rejected() {
        let value = json!({"type": "Point", "coordinates": [0.0, 0.0]});
        assert!(matches!(
            parse_geometry(&value),
            Err(ValidationError::InvalidGeoJson(_))
        ));
    }

    #[test]
    fn non_numeric_position_is_rejected() {
        let value = json!({
            "type": "Polygon",
            "coordinates": [[["a", 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
        });
        assert!(matches!(
            parse_geometry(&value),
            Err(ValidationError::InvalidGeoJson(_))
        ));
    }

    #[test]
    fn single_part_serializes_as_polygon() {
        let value = json!({
            "type": "MultiPolygon",
            "coordinates": [[[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]]
        });
        let geom = parse_geometry(&value).unwrap();
        let out = to_geojson(&geom);
        assert_eq!(out["type"], "Polygon");
        assert_eq!(out["coordinates"][0][1], json!([1.0, 0.0]));
    }
}
