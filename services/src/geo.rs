//! Great-circle distance and the geofence rule.

use db::models::attendance_record::AttendanceStatus;
use serde::{Deserialize, Serialize};

use crate::ServiceError;

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Submissions further than this from the anchor are recorded as BUNK.
pub const GEOFENCE_RADIUS_M: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Rejects non-finite values and anything off the globe.
    pub fn validate(&self) -> Result<(), ServiceError> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            return Err(ServiceError::InvalidLocation(
                "Coordinates must be finite numbers".into(),
            ));
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(ServiceError::InvalidLocation(format!(
                "Latitude {} is outside [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(ServiceError::InvalidLocation(format!(
                "Longitude {} is outside [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }

    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        haversine_distance(*self, *other)
    }
}

/// Haversine distance in metres.
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lng - a.lng).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// PRESENT inside the geofence (boundary inclusive), BUNK outside.
pub fn classify(distance_m: f64) -> AttendanceStatus {
    if distance_m > GEOFENCE_RADIUS_M {
        AttendanceStatus::Bunk
    } else {
        AttendanceStatus::Present
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: Coordinate = Coordinate::new(0.0, 0.0);

    #[test]
    fn distance_to_self_is_zero() {
        let p = Coordinate::new(28.6139, 77.2090);
        assert_eq!(haversine_distance(p, p), 0.0);
        assert_eq!(haversine_distance(ORIGIN, ORIGIN), 0.0);
    }

    #[test]
    fn distance_is_symmetric_and_non_negative() {
        let pairs = [
            (Coordinate::new(51.5007, -0.1246), Coordinate::new(40.6892, -74.0445)),
            (Coordinate::new(-33.8568, 151.2153), Coordinate::new(35.6586, 139.7454)),
            (Coordinate::new(12.9716, 77.5946), Coordinate::new(12.9717, 77.5947)),
        ];
        for (a, b) in pairs {
            let ab = haversine_distance(a, b);
            let ba = haversine_distance(b, a);
            assert!(ab >= 0.0);
            assert!((ab - ba).abs() < 1e-6, "{ab} != {ba}");
        }
    }

    #[test]
    fn geofence_boundary_around_fifty_metres() {
        let outside = haversine_distance(ORIGIN, Coordinate::new(0.0, 0.00045));
        assert!((outside - 50.04).abs() < 0.01, "got {outside}");
        assert_eq!(classify(outside), AttendanceStatus::Bunk);

        let inside = haversine_distance(ORIGIN, Coordinate::new(0.0, 0.0004));
        assert!((inside - 44.48).abs() < 0.01, "got {inside}");
        assert_eq!(classify(inside), AttendanceStatus::Present);

        assert_eq!(classify(GEOFENCE_RADIUS_M), AttendanceStatus::Present);
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        assert!(Coordinate::new(90.0, 180.0).validate().is_ok());
        assert!(Coordinate::new(90.01, 0.0).validate().is_err());
        assert!(Coordinate::new(0.0, -180.5).validate().is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).validate().is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).validate().is_err());
    }
}
