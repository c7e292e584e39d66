//! Great-circle distance between coordinates.

use crate::models::Coordinate;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Approximate degrees of latitude per kilometer.
pub const DEG_PER_KM: f64 = 1.0 / 111.0;

/// Haversine distance in kilometers. Inputs are assumed to be in range.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    // rounding can push h a hair above 1 for antipodal points
    2.0 * EARTH_RADIUS_KM * h.sqrt().clamp(0.0, 1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lng: f64) -> Coordinate {
        Coordinate { lat, lng }
    }

    #[test]
    fn test_identity_is_zero() {
        let p = c(5.6037, -0.1870);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            (c(5.61, -0.18), c(5.60, -0.19)),
            (c(-33.86, 151.21), c(51.50, -0.12)),
            (c(89.9, 179.9), c(-89.9, -179.9)),
        ];
        for (a, b) in pairs {
            assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let km = haversine_km(c(0.0, 0.0), c(1.0, 0.0));
        assert!((km - 111.19).abs() < 0.01, "got {}", km);
    }

    #[test]
    fn test_antipodal_is_finite() {
        let km = haversine_km(c(0.0, 0.0), c(0.0, 180.0));
        assert!(km.is_finite());
        assert!((km - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }
}
