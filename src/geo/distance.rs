use serde::Serialize;

use crate::constants::EARTH_RADIUS_MILES;

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to `other` in miles
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        haversine_miles(self, other)
    }
}

/// Great-circle distance between two points in miles (Haversine formula).
///
/// Uses the `atan2` form so rounding near the antipode cannot push the
/// intermediate term outside the function's domain.
pub fn haversine_miles(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (to.lon - from.lon).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // rounding can leave `a` a hair above 1
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn identical_points_are_zero_apart() {
        let p = GeoPoint::new(40.7128, -74.0060);
        assert_eq!(haversine_miles(&p, &p), 0.0);
        let origin = GeoPoint::new(0.0, 0.0);
        assert_eq!(origin.distance_to(&origin), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint::new(47.6062, -122.3321);
        let b = GeoPoint::new(45.5152, -122.6784);
        assert_eq!(haversine_miles(&a, &b), haversine_miles(&b, &a));
    }

    #[test]
    fn one_degree_of_longitude_at_the_equator() {
        let d = haversine_miles(&GeoPoint::new(0.0, 0.0), &GeoPoint::new(0.0, 1.0));
        let expected = EARTH_RADIUS_MILES * PI / 180.0;
        assert!((d - expected).abs() < 1e-9, "got {d}");
        assert!((d - 69.17).abs() < 0.1, "got {d}");
    }

    #[test]
    fn antipodal_points_do_not_produce_nan() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 180.0);
        let d = haversine_miles(&a, &b);
        assert!(d.is_finite());
        assert!((d - EARTH_RADIUS_MILES * PI).abs() < 1e-6);

        let c = GeoPoint::new(45.0, 10.0);
        let near_anti = GeoPoint::new(-45.0, -170.0 + 1e-12);
        assert!(haversine_miles(&c, &near_anti).is_finite());
    }

    #[test]
    fn known_city_pair() {
        // New York to Los Angeles, roughly 2445 miles
        let nyc = GeoPoint::new(40.7128, -74.0060);
        let la = GeoPoint::new(34.0522, -118.2437);
        let d = nyc.distance_to(&la);
        assert!((d - 2445.0).abs() < 10.0, "got {d}");
    }
}
