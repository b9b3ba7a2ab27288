use serde::{Deserialize, Serialize};

/// Mean earth radius used by the haversine helpers.
pub const EARTH_RADIUS_MILES: f64 = 3958.7613;

pub const METERS_PER_MILE: f64 = 1609.344;

/// WGS84 point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLon {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// True when both components are inside [-90,90] x [-180,180].
    pub fn in_bounds(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Clamp latitude and wrap longitude into the valid range.
    ///
    /// # Example
    /// ```
    /// use coverage_core::common::LatLon;
    ///
    /// let p = LatLon::new(91.0, 190.0).normalized();
    /// assert_eq!(p.latitude, 90.0);
    /// assert_eq!(p.longitude, -170.0);
    /// ```
    pub fn normalized(&self) -> Self {
        Self {
            latitude: clamp_latitude(self.latitude),
            longitude: normalize_longitude(self.longitude),
        }
    }
}

pub fn clamp_latitude(lat: f64) -> f64 {
    lat.clamp(-90.0, 90.0)
}

/// Wrap a longitude into [-180, 180]. 180 stays 180 rather than flipping sign.
pub fn normalize_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        return lon;
    }
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && lon > 0.0 {
        180.0
    } else {
        wrapped
    }
}

pub fn miles_to_meters(miles: f64) -> f64 {
    miles * METERS_PER_MILE
}

pub fn meters_to_miles(meters: f64) -> f64 {
    meters / METERS_PER_MILE
}

/// Great-circle distance in miles (haversine).
///
/// Inputs are clamped/wrapped first so out-of-range coordinates from callers
/// still give a finite answer.
pub fn haversine_miles(from: LatLon, to: LatLon) -> f64 {
    let from = from.normalized();
    let to = to.normalized();

    let dlat = (to.latitude - from.latitude).to_radians();
    let dlng = (to.longitude - from.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + from.latitude.to_radians().cos()
            * to.latitude.to_radians().cos()
            * (dlng / 2.0).sin().powi(2);

    // Rounding can push `a` a hair above 1 for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Point reached by travelling `distance_miles` along a great circle from
/// `origin` at `bearing_deg` (clockwise from north). Used by tests and the
/// fixtures to place points at a known distance.
pub fn destination_point(origin: LatLon, bearing_deg: f64, distance_miles: f64) -> LatLon {
    let angular = distance_miles / EARTH_RADIUS_MILES;
    let bearing = bearing_deg.to_radians();
    let lat1 = origin.latitude.to_radians();
    let lon1 = origin.longitude.to_radians();

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos()).atan2(angular.cos() - lat1.sin() * lat2.sin());

    LatLon::new(lat2.to_degrees(), normalize_longitude(lon2.to_degrees()))
}
