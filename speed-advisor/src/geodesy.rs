//! Great-circle geometry on a spherical Earth
//!
//! Pure functions for distance and initial bearing between two points.

use crate::types::GeoPoint;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine great-circle distance in meters
///
/// The haversine term is clamped to `[0, 1]` so floating-point overshoot near
/// antipodal points never leaves the domain of `asin`.
pub fn distance_meters(p1: GeoPoint, p2: GeoPoint) -> f64 {
    let lat1 = p1.latitude_deg.to_radians();
    let lat2 = p2.latitude_deg.to_radians();
    let delta_lat = (p2.latitude_deg - p1.latitude_deg).to_radians();
    let delta_lon = (p2.longitude_deg - p1.longitude_deg).to_radians();

    let sin_dlat = (delta_lat / 2.0).sin();
    let sin_dlon = (delta_lon / 2.0).sin();
    let a = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;

    2.0 * EARTH_RADIUS_M * a.clamp(0.0, 1.0).sqrt().asin()
}

/// Initial bearing from `p1` towards `p2`, degrees in `[0, 360)`
///
/// Coincident points have bearing 0.
pub fn bearing_deg(p1: GeoPoint, p2: GeoPoint) -> f64 {
    if p1 == p2 {
        return 0.0;
    }

    let lat1 = p1.latitude_deg.to_radians();
    let lat2 = p2.latitude_deg.to_radians();
    let delta_lon = (p2.longitude_deg - p1.longitude_deg).to_radians();

    let y = delta_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

    normalize_degrees(y.atan2(x).to_degrees())
}

/// Normalize an angle into `[0, 360)`
pub fn normalize_degrees(angle: f64) -> f64 {
    let normalized = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon)
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        for point in [p(0.0, 0.0), p(40.5, -73.25), p(-89.9, 179.9), p(90.0, 0.0)] {
            assert_eq!(distance_meters(point, point), 0.0);
        }
    }

    #[test]
    fn test_distance_symmetry() {
        let a = p(40.5, -73.25);
        let b = p(51.5, -0.12);
        assert_eq!(distance_meters(a, b), distance_meters(b, a));
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        // ~111km per degree of latitude
        let distance = distance_meters(p(35.0, 139.0), p(36.0, 139.0));
        assert!((distance - 111_195.0).abs() < 1.0);
    }

    #[test]
    fn test_distance_small_offsets_are_stable() {
        let distance = distance_meters(p(40.5, -73.25), p(40.500001, -73.25));
        assert!((distance - 0.1112).abs() < 1e-3);
    }

    #[test]
    fn test_distance_antipodal() {
        let distance = distance_meters(p(0.0, 0.0), p(0.0, 180.0));
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_M;
        assert!(distance.is_finite());
        assert!((distance - half_circumference).abs() < 1.0);

        let distance = distance_meters(p(45.0, 10.0), p(-45.0, -170.0));
        assert!(distance.is_finite());
        assert!((distance - half_circumference).abs() < 1.0);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        assert!(bearing_deg(p(35.0, 139.0), p(36.0, 139.0)).abs() < 1e-9);
        assert!((bearing_deg(p(35.0, 139.0), p(35.0, 140.0)) - 90.0).abs() < 1.0);
        assert!((bearing_deg(p(36.0, 139.0), p(35.0, 139.0)) - 180.0).abs() < 1e-9);
        assert!((bearing_deg(p(35.0, 140.0), p(35.0, 139.0)) - 270.0).abs() < 1.0);
    }

    #[test]
    fn test_bearing_coincident_points() {
        assert_eq!(bearing_deg(p(40.5, -73.25), p(40.5, -73.25)), 0.0);
    }

    #[test]
    fn test_bearing_range() {
        let points = [
            p(0.0, 0.0),
            p(89.99, 0.0),
            p(-89.99, 0.0),
            p(10.0, 179.99),
            p(10.0, -179.99),
            p(-33.87, 151.21),
            p(40.5, -73.25),
        ];
        for a in points {
            for b in points {
                let bearing = bearing_deg(a, b);
                assert!((0.0..360.0).contains(&bearing), "{:?} -> {:?}: {}", a, b, bearing);
            }
        }
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(450.0), 90.0);
        assert!(normalize_degrees(-1e-20) < 360.0);
    }
}
