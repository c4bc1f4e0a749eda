// ===============================
// src/geo.rs
// ===============================
/*
=============================================================================
Project : sattrack_rust — satellite position tracker in Rust
Module  : <module_name>.rs
Version : 0.3.0
License : MIT (see LICENSE)

Summary : Streams bulk satellite position dumps into an embedded SQLite
          store in fixed-size batches, and answers two queries: the last
          known position of a satellite, and the satellite closest to a
          point at (or before) a given timestamp.
=============================================================================
*/

/// Mean Earth radius in meters (spherical-earth approximation).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle surface distance in meters between two points given in
/// degrees (haversine formula).
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_is_zero() {
        assert_eq!(haversine_m(51.5, -0.12, 51.5, -0.12), 0.0);
        assert_eq!(haversine_m(0.0, 0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn symmetric_within_tolerance() {
        let d1 = haversine_m(10.0, 10.0, -33.86, 151.21);
        let d2 = haversine_m(-33.86, 151.21, 10.0, 10.0);
        assert!((d1 - d2).abs() / d1 < 1e-6);
    }

    #[test]
    fn small_offset_near_equator() {
        // ~0.001 deg diagonal at lat 10: roughly 156 m on the sphere
        let d = haversine_m(10.0, 10.0, 10.001, 10.001);
        assert!(d > 150.0 && d < 160.0, "got {d}");
    }

    #[test]
    fn quarter_circumference() {
        let d = haversine_m(0.0, 0.0, 0.0, 90.0);
        let expected = std::f64::consts::FRAC_PI_2 * EARTH_RADIUS_M;
        assert!((d - expected).abs() < 1.0);
    }
}
