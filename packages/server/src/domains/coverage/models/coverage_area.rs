use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use geo::{Coord, CoordsIter, MultiPolygon};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::{PgConnection, PgPool};
use typed_builder::TypedBuilder;

use crate::common::utils::{meters_to_miles, normalize_query};
use crate::common::{CoverageAreaId, LatLon};
use crate::domains::coverage::error::{CoverageError, ValidationError};
use crate::domains::coverage::geometry::{
    self, geodesic_buffer, multipolygon_contains, parse_geometry, radius_meters_from_miles,
    serde_geometry, validate_multipolygon, BoundingBox,
};

/// Kind of region a coverage area describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "coverage_kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoverageKind {
    State,
    County,
    City,
    Polygon,
    Radius,
}

impl CoverageKind {
    /// Higher is more specific. Custom polygons rank with cities.
    pub fn specificity_weight(&self) -> u8 {
        match self {
            CoverageKind::Radius => 4,
            CoverageKind::City | CoverageKind::Polygon => 3,
            CoverageKind::County => 2,
            CoverageKind::State => 1,
        }
    }
}

impl std::fmt::Display for CoverageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoverageKind::State => write!(f, "STATE"),
            CoverageKind::County => write!(f, "COUNTY"),
            CoverageKind::City => write!(f, "CITY"),
            CoverageKind::Polygon => write!(f, "POLYGON"),
            CoverageKind::Radius => write!(f, "RADIUS"),
        }
    }
}

impl std::str::FromStr for CoverageKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STATE" => Ok(CoverageKind::State),
            "COUNTY" => Ok(CoverageKind::County),
            "CITY" => Ok(CoverageKind::City),
            "POLYGON" => Ok(CoverageKind::Polygon),
            "RADIUS" => Ok(CoverageKind::Radius),
            _ => Err(anyhow::anyhow!("Invalid coverage kind: {}", s)),
        }
    }
}

/// Geometry as supplied by a caller. RADIUS areas take a center and radius,
/// every other kind takes GeoJSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeometryInput {
    CenterRadius { center: LatLon, radius_miles: f64 },
    GeoJson(JsonValue),
}

/// Geometry after validation, with the derived fields filled in.
#[derive(Debug, Clone)]
struct ResolvedGeometry {
    geom: MultiPolygon<f64>,
    bbox: BoundingBox,
    center: Option<LatLon>,
    radius_meters: Option<f64>,
}

impl GeometryInput {
    fn resolve(&self, kind: CoverageKind) -> Result<ResolvedGeometry, ValidationError> {
        let (geom, center, radius_meters) = match (kind, self) {
            (CoverageKind::Radius, GeometryInput::CenterRadius { center, radius_miles }) => {
                let meters = radius_meters_from_miles(*radius_miles)?;
                let polygon = geodesic_buffer(*center, meters)?;
                (MultiPolygon::new(vec![polygon]), Some(*center), Some(meters))
            }
            (CoverageKind::Radius, GeometryInput::GeoJson(_)) => {
                return Err(ValidationError::GeometryKindMismatch {
                    kind,
                    expected: "a center and radius_miles",
                })
            }
            (_, GeometryInput::CenterRadius { .. }) => {
                return Err(ValidationError::GeometryKindMismatch {
                    kind,
                    expected: "GeoJSON Polygon or MultiPolygon geometry",
                })
            }
            (_, GeometryInput::GeoJson(value)) => (parse_geometry(value)?, None, None),
        };

        validate_multipolygon(&geom)?;
        let bbox = BoundingBox::of(&geom).ok_or(ValidationError::EmptyGeometry)?;

        Ok(ResolvedGeometry {
            geom,
            bbox,
            center,
            radius_meters,
        })
    }
}

/// A named region used to decide whether a resource serves a location.
///
/// For RADIUS areas `geom` is derived from `center` and `radius_meters` and is
/// only ever replaced as a whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageArea {
    pub id: CoverageAreaId,
    pub kind: CoverageKind,
    pub name: String,
    #[serde(with = "serde_geometry")]
    pub geom: MultiPolygon<f64>,
    pub center: Option<LatLon>,
    pub radius_meters: Option<f64>,
    pub bbox: BoundingBox,
    pub ext_ids: BTreeMap<String, String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a coverage area
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
pub struct NewCoverageArea {
    pub kind: CoverageKind,
    #[builder(setter(into))]
    pub name: String,
    pub geometry: GeometryInput,
    #[serde(default)]
    #[builder(default)]
    pub ext_ids: BTreeMap<String, String>,
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    pub created_by: Option<String>,
}

/// Partial update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TypedBuilder)]
pub struct CoverageAreaUpdate {
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    pub name: Option<String>,
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub geometry: Option<GeometryInput>,
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub ext_ids: Option<BTreeMap<String, String>>,
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    pub updated_by: Option<String>,
}

/// How a coverage area name relates to a free-text query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NameMatch {
    Exact,
    NameInQuery,
    QueryInName,
}

/// Shortest text allowed to take part in a substring match.
const MIN_SUBSTRING_LEN: usize = 3;

fn validated_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankName);
    }
    Ok(trimmed.to_string())
}

impl CoverageArea {
    /// Validate input and derive geometry for a new area.
    pub fn build(input: NewCoverageArea, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let name = validated_name(&input.name)?;
        let resolved = input.geometry.resolve(input.kind)?;

        Ok(Self {
            id: CoverageAreaId::new(),
            kind: input.kind,
            name,
            geom: resolved.geom,
            center: resolved.center,
            radius_meters: resolved.radius_meters,
            bbox: resolved.bbox,
            ext_ids: input.ext_ids,
            created_by: input.created_by.clone(),
            updated_by: input.created_by,
            created_at: now,
            updated_at: now,
        })
    }

    /// Produce the updated area. The receiver is left untouched so stores can
    /// swap the whole value in one step.
    pub fn apply_update(&self, update: CoverageAreaUpdate, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let mut next = self.clone();

        if let Some(name) = update.name {
            next.name = validated_name(&name)?;
        }
        if let Some(geometry) = update.geometry {
            let resolved = geometry.resolve(self.kind)?;
            next.geom = resolved.geom;
            next.bbox = resolved.bbox;
            next.center = resolved.center;
            next.radius_meters = resolved.radius_meters;
        }
        if let Some(ext_ids) = update.ext_ids {
            next.ext_ids = ext_ids;
        }
        next.updated_by = update.updated_by.or(next.updated_by);
        next.updated_at = now;

        Ok(next)
    }

    /// Boundary-inclusive containment.
    pub fn contains(&self, point: LatLon) -> bool {
        self.bbox.contains(point) && multipolygon_contains(&self.geom, point)
    }

    /// True when every vertex of `other` lies in this area. Used to find the
    /// areas that serve all of a matched area, not just part of it.
    pub fn covers(&self, other: &CoverageArea) -> bool {
        self.bbox.contains_bbox(&other.bbox)
            && other
                .geom
                .coords_iter()
                .all(|c| multipolygon_contains(&self.geom, LatLon::new(c.y, c.x)))
    }

    pub fn specificity_weight(&self) -> u8 {
        self.kind.specificity_weight()
    }

    pub fn bbox_area(&self) -> f64 {
        self.bbox.area()
    }

    pub fn radius_miles(&self) -> Option<f64> {
        self.radius_meters.map(meters_to_miles)
    }

    pub fn vertex_count(&self) -> usize {
        self.geom.coords_count()
    }

    /// A point inside the area: the center for RADIUS areas, otherwise the
    /// bbox center when it is contained, otherwise the first vertex.
    pub fn representative_point(&self) -> LatLon {
        if let Some(center) = self.center {
            return center;
        }
        let mid = self.bbox.center();
        if self.contains(mid) {
            return mid;
        }
        self.geom
            .0
            .first()
            .and_then(|p| p.exterior().0.first())
            .map(|c: &Coord<f64>| LatLon::new(c.y, c.x))
            .unwrap_or(mid)
    }

    /// Compare this area's name against an already-normalized query.
    pub fn name_match(&self, normalized_query: &str) -> Option<NameMatch> {
        if normalized_query.is_empty() {
            return None;
        }
        let name = normalize_query(&self.name);
        if name == normalized_query {
            Some(NameMatch::Exact)
        } else if name.chars().count() >= MIN_SUBSTRING_LEN && normalized_query.contains(&name) {
            Some(NameMatch::NameInQuery)
        } else if normalized_query.chars().count() >= MIN_SUBSTRING_LEN && name.contains(normalized_query) {
            Some(NameMatch::QueryInName)
        } else {
            None
        }
    }

    pub fn preview(&self, tolerance: f64) -> Option<geometry::CoveragePreview> {
        geometry::build_preview(&self.geom, tolerance)
    }
}

/// Order areas by name match quality, then specificity, then name length.
pub fn sort_by_name_match(areas: &mut [(NameMatch, Arc<CoverageArea>)]) {
    areas.sort_by(|(lm, la), (rm, ra)| {
        lm.cmp(rm)
            .then_with(|| ra.specificity_weight().cmp(&la.specificity_weight()))
            .then_with(|| la.name.len().cmp(&ra.name.len()))
            .then_with(|| la.id.cmp(&ra.id))
    });
}

// =============================================================================
// SQL Queries
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct CoverageAreaRow {
    id: CoverageAreaId,
    kind: CoverageKind,
    name: String,
    geom: JsonValue,
    center_lat: Option<f64>,
    center_lon: Option<f64>,
    radius_meters: Option<f64>,
    bbox_north: f64,
    bbox_south: f64,
    bbox_east: f64,
    bbox_west: f64,
    ext_ids: sqlx::types::Json<BTreeMap<String, String>>,
    created_by: Option<String>,
    updated_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CoverageAreaRow> for CoverageArea {
    type Error = CoverageError;

    fn try_from(row: CoverageAreaRow) -> Result<Self, Self::Error> {
        let geom = parse_geometry(&row.geom).map_err(|e| {
            CoverageError::Internal(anyhow::anyhow!(
                "Stored geometry for coverage area {} is unreadable: {}",
                row.id,
                e
            ))
        })?;
        let center = match (row.center_lat, row.center_lon) {
            (Some(lat), Some(lon)) => Some(LatLon::new(lat, lon)),
            _ => None,
        };

        Ok(Self {
            id: row.id,
            kind: row.kind,
            name: row.name,
            geom,
            center,
            radius_meters: row.radius_meters,
            bbox: BoundingBox {
                north: row.bbox_north,
                south: row.bbox_south,
                east: row.bbox_east,
                west: row.bbox_west,
            },
            ext_ids: row.ext_ids.0,
            created_by: row.created_by,
            updated_by: row.updated_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn rows_to_areas(rows: Vec<CoverageAreaRow>) -> Result<Vec<CoverageArea>, CoverageError> {
    rows.into_iter().map(CoverageArea::try_from).collect()
}

impl CoverageArea {
    pub async fn find_by_id(id: CoverageAreaId, pool: &PgPool) -> Result<Option<Self>, CoverageError> {
        let row = sqlx::query_as::<_, CoverageAreaRow>("SELECT * FROM coverage_areas WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        row.map(Self::try_from).transpose()
    }

    pub async fn insert(&self, pool: &PgPool) -> Result<Self, CoverageError> {
        let row = sqlx::query_as::<_, CoverageAreaRow>(
            r#"
            INSERT INTO coverage_areas (
                id, kind, name, geom, center_lat, center_lon, radius_meters,
                bbox_north, bbox_south, bbox_east, bbox_west,
                ext_ids, created_by, updated_by, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(self.kind)
        .bind(&self.name)
        .bind(geometry::to_geojson(&self.geom))
        .bind(self.center.map(|c| c.latitude))
        .bind(self.center.map(|c| c.longitude))
        .bind(self.radius_meters)
        .bind(self.bbox.north)
        .bind(self.bbox.south)
        .bind(self.bbox.east)
        .bind(self.bbox.west)
        .bind(sqlx::types::Json(&self.ext_ids))
        .bind(&self.created_by)
        .bind(&self.updated_by)
        .bind(self.created_at)
        .bind(self.updated_at)
        .fetch_one(pool)
        .await?;
        Self::try_from(row)
    }

    /// Read, modify and write one area inside a transaction. The row lock
    /// serializes concurrent updates so none of them is lost.
    pub async fn update_by_id(
        id: CoverageAreaId,
        update: CoverageAreaUpdate,
        now: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<Self, CoverageError> {
        let mut tx = pool.begin().await?;

        let row = sqlx::query_as::<_, CoverageAreaRow>("SELECT * FROM coverage_areas WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let current = match row {
            Some(row) => Self::try_from(row)?,
            None => return Err(CoverageError::NotFound(id)),
        };

        let next = current.apply_update(update, now)?;
        let stored = next.replace(&mut *tx).await?;

        tx.commit().await?;
        Ok(stored)
    }

    /// Overwrite every mutable column in one statement.
    async fn replace(&self, conn: &mut PgConnection) -> Result<Self, CoverageError> {
        let row = sqlx::query_as::<_, CoverageAreaRow>(
            r#"
            UPDATE coverage_areas
            SET name = $2,
                geom = $3,
                center_lat = $4,
                center_lon = $5,
                radius_meters = $6,
                bbox_north = $7,
                bbox_south = $8,
                bbox_east = $9,
                bbox_west = $10,
                ext_ids = $11,
                updated_by = $12,
                updated_at = $13
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(geometry::to_geojson(&self.geom))
        .bind(self.center.map(|c| c.latitude))
        .bind(self.center.map(|c| c.longitude))
        .bind(self.radius_meters)
        .bind(self.bbox.north)
        .bind(self.bbox.south)
        .bind(self.bbox.east)
        .bind(self.bbox.west)
        .bind(sqlx::types::Json(&self.ext_ids))
        .bind(&self.updated_by)
        .bind(self.updated_at)
        .fetch_optional(conn)
        .await?;

        match row {
            Some(row) => Self::try_from(row),
            None => Err(CoverageError::NotFound(self.id)),
        }
    }

    pub async fn search(
        kind: Option<CoverageKind>,
        name_substring: Option<&str>,
        pool: &PgPool,
    ) -> Result<Vec<Self>, CoverageError> {
        let pattern = name_substring
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", escape_like(s)));

        let rows = sqlx::query_as::<_, CoverageAreaRow>(
            r#"
            SELECT * FROM coverage_areas
            WHERE ($1::coverage_kind IS NULL OR kind = $1)
              AND ($2::text IS NULL OR name ILIKE $2)
            ORDER BY name, id
            "#,
        )
        .bind(kind)
        .bind(pattern)
        .fetch_all(pool)
        .await?;
        rows_to_areas(rows)
    }

    /// Areas whose bounding box contains the point. Callers still need the
    /// exact containment test.
    pub async fn find_bbox_candidates(point: LatLon, pool: &PgPool) -> Result<Vec<Self>, CoverageError> {
        let rows = sqlx::query_as::<_, CoverageAreaRow>(
            r#"
            SELECT * FROM coverage_areas
            WHERE bbox_south <= $1 AND bbox_north >= $1
              AND bbox_west <= $2 AND bbox_east >= $2
            "#,
        )
        .bind(point.latitude)
        .bind(point.longitude)
        .fetch_all(pool)
        .await?;
        rows_to_areas(rows)
    }

    /// Areas whose name equals, contains, or is contained in the query text.
    /// `normalized_query` must already be normalized; stored names are
    /// normalized the same way (trimmed, whitespace collapsed, lowercased).
    pub async fn find_by_name_text(normalized_query: &str, pool: &PgPool) -> Result<Vec<Self>, CoverageError> {
        let rows = sqlx::query_as::<_, CoverageAreaRow>(
            r#"
            SELECT c.* FROM coverage_areas c
            CROSS JOIN LATERAL (
                SELECT lower(btrim(regexp_replace(c.name, '\s+', ' ', 'g'))) AS name
            ) n
            WHERE n.name = $1
               OR (char_length(n.name) >= 3 AND position(n.name IN $1) > 0)
               OR (char_length($1) >= 3 AND position($1 IN n.name) > 0)
            "#,
        )
        .bind(normalized_query)
        .fetch_all(pool)
        .await?;
        rows_to_areas(rows)
    }

    pub async fn ping(pool: &PgPool) -> Result<(), CoverageError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::utils::destination_point;
    use serde_json::json;

    fn london_radius(miles: f64) -> NewCoverageArea {
        NewCoverageArea::builder()
            .kind(CoverageKind::Radius)
            .name("London KY 10mi")
            .geometry(GeometryInput::CenterRadius {
                center: LatLon::new(37.1283, -84.0836),
                radius_miles: miles,
            })
            .build()
    }

    fn county_square() -> NewCoverageArea {
        NewCoverageArea::builder()
            .kind(CoverageKind::County)
            .name("Laurel County")
            .geometry(GeometryInput::GeoJson(json!({
                "type": "Polygon",
                "coordinates": [[[-84.4, 36.9], [-83.8, 36.9], [-83.8, 37.4], [-84.4, 37.4], [-84.4, 36.9]]]
            })))
            .ext_ids(BTreeMap::from([("fips".to_string(), "21125".to_string())]))
            .created_by("importer")
            .build()
    }

    #[test]
    fn radius_area_derives_geometry() {
        let area = CoverageArea::build(london_radius(10.0), Utc::now()).unwrap();
        assert_eq!(area.kind, CoverageKind::Radius);
        assert!(area.center.is_some());
        assert!((area.radius_miles().unwrap() - 10.0).abs() < 1e-9);

        let center = area.center.unwrap();
        assert!(area.contains(destination_point(center, 45.0, 5.0)));
        assert!(!area.contains(destination_point(center, 45.0, 15.0)));
    }

    #[test]
    fn radius_kind_rejects_geojson() {
        let mut input = county_square();
        input.kind = CoverageKind::Radius;
        assert!(matches!(
            CoverageArea::build(input, Utc::now()),
            Err(ValidationError::GeometryKindMismatch { .. })
        ));
    }

    #[test]
    fn county_rejects_center_radius() {
        let mut input = london_radius(5.0);
        input.kind = CoverageKind::County;
        assert!(matches!(
            CoverageArea::build(input, Utc::now()),
            Err(ValidationError::GeometryKindMismatch { .. })
        ));
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut input = county_square();
        input.name = "   ".to_string();
        assert_eq!(
            CoverageArea::build(input, Utc::now()).unwrap_err(),
            ValidationError::BlankName
        );
    }

    #[test]
    fn update_recomputes_radius_geometry() {
        let created = Utc::now();
        let area = CoverageArea::build(london_radius(10.0), created).unwrap();
        let center = area.center.unwrap();
        let twelve_out = destination_point(center, 90.0, 12.0);
        assert!(!area.contains(twelve_out));

        let update = CoverageAreaUpdate::builder()
            .geometry(GeometryInput::CenterRadius {
                center,
                radius_miles: 20.0,
            })
            .updated_by("admin")
            .build();
        let updated = area.apply_update(update, created + chrono::Duration::minutes(1)).unwrap();

        assert!(updated.contains(twelve_out));
        assert_eq!(updated.id, area.id);
        assert_eq!(updated.updated_by.as_deref(), Some("admin"));
        assert!(updated.updated_at > updated.created_at);
        // original value is untouched
        assert!(!area.contains(twelve_out));
    }

    #[test]
    fn failed_update_leaves_area_unchanged() {
        let area = CoverageArea::build(london_radius(10.0), Utc::now()).unwrap();
        let update = CoverageAreaUpdate::builder()
            .geometry(GeometryInput::CenterRadius {
                center: area.center.unwrap(),
                radius_miles: 250.0,
            })
            .build();
        assert!(matches!(
            area.apply_update(update, Utc::now()),
            Err(ValidationError::RadiusOutOfRange { .. })
        ));
    }

    #[test]
    fn name_matching() {
        let area = CoverageArea::build(county_square(), Utc::now()).unwrap();
        assert_eq!(area.name_match("laurel county"), Some(NameMatch::Exact));
        assert_eq!(area.name_match("food in laurel county ky"), Some(NameMatch::NameInQuery));
        assert_eq!(area.name_match("laurel"), Some(NameMatch::QueryInName));
        assert_eq!(area.name_match("la"), None);
        assert_eq!(area.name_match("knox county"), None);

        let mut spaced = county_square();
        spaced.name = "Laurel   County".to_string();
        let spaced = CoverageArea::build(spaced, Utc::now()).unwrap();
        assert_eq!(spaced.name_match("laurel county"), Some(NameMatch::Exact));
    }

    #[test]
    fn representative_point_is_inside() {
        let county = CoverageArea::build(county_square(), Utc::now()).unwrap();
        assert!(county.contains(county.representative_point()));

        let radius = CoverageArea::build(london_radius(3.0), Utc::now()).unwrap();
        assert_eq!(radius.representative_point(), LatLon::new(37.1283, -84.0836));
    }

    #[test]
    fn covers_needs_the_whole_area() {
        let county = CoverageArea::build(county_square(), Utc::now()).unwrap();
        let state = CoverageArea::build(
            NewCoverageArea::builder()
                .kind(CoverageKind::State)
                .name("Kentucky")
                .geometry(GeometryInput::GeoJson(json!({
                    "type": "Polygon",
                    "coordinates": [[[-89.6, 36.5], [-81.9, 36.5], [-81.9, 39.1], [-89.6, 39.1], [-89.6, 36.5]]]
                })))
                .build(),
            Utc::now(),
        )
        .unwrap();
        let tiny = CoverageArea::build(london_radius(1.0), Utc::now()).unwrap();

        assert!(state.covers(&county));
        assert!(county.covers(&county));
        assert!(county.covers(&tiny));
        assert!(!tiny.covers(&county));
        assert!(!county.covers(&state));
    }

    #[test]
    fn kind_parsing_and_weights() {
        assert_eq!("radius".parse::<CoverageKind>().unwrap(), CoverageKind::Radius);
        assert_eq!(" County ".parse::<CoverageKind>().unwrap(), CoverageKind::County);
        assert!("zip".parse::<CoverageKind>().is_err());
        assert!(CoverageKind::Radius.specificity_weight() > CoverageKind::City.specificity_weight());
        assert!(CoverageKind::City.specificity_weight() > CoverageKind::County.specificity_weight());
        assert!(CoverageKind::County.specificity_weight() > CoverageKind::State.specificity_weight());
    }

    #[test]
    fn serializes_geometry_as_geojson() {
        let area = CoverageArea::build(county_square(), Utc::now()).unwrap();
        let value = serde_json::to_value(&area).unwrap();
        assert_eq!(value["kind"], "COUNTY");
        assert_eq!(value["geom"]["type"], "Polygon");
        assert_eq!(value["ext_ids"]["fips"], "21125");
    }

    #[test]
    fn geometry_input_deserializes_both_shapes() {
        let radius: GeometryInput = serde_json::from_value(json!({
            "center": {"latitude": 37.0, "longitude": -84.0},
            "radius_miles": 5.0
        }))
        .unwrap();
        assert!(matches!(radius, GeometryInput::CenterRadius { .. }));

        let polygon: GeometryInput = serde_json::from_value(json!({
            "type": "Polygon",
            "coordinates": []
        }))
        .unwrap();
        assert!(matches!(polygon, GeometryInput::GeoJson(_)));
    }
}
