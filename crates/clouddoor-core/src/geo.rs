// ── Geodesy ──
//
// Great-circle distance on a spherical Earth. Pure and synchronous:
// nothing here ever suspends or touches I/O.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use clouddoor_api::Geolocation;

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting out-of-range or non-finite values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoreError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoreError::InvalidCoordinate {
                message: format!("latitude {latitude} is outside [-90, 90]"),
            });
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoreError::InvalidCoordinate {
                message: format!("longitude {longitude} is outside [-180, 180]"),
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl From<&Geolocation> for Coordinate {
    fn from(geo: &Geolocation) -> Self {
        Self {
            latitude: geo.latitude,
            longitude: geo.longitude,
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

/// Surface distance between two points, truncated to whole meters.
///
/// Haversine formula; symmetric, zero for identical points.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
pub fn distance_meters(a: Coordinate, b: Coordinate) -> u32 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos()
            * b.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    // Half the circumference (~20,015 km) fits comfortably in u32.
    (EARTH_RADIUS_M * c) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate::new(latitude, longitude).expect("valid test coordinate")
    }

    #[test]
    fn identical_points_are_zero_apart() {
        let p = at(46.056_9, 14.505_8);
        assert_eq!(distance_meters(p, p), 0);
    }

    #[test]
    fn one_degree_on_the_equator() {
        assert_eq!(distance_meters(at(0.0, 0.0), at(0.0, 1.0)), 111_194);
        assert_eq!(distance_meters(at(0.0, 0.0), at(1.0, 0.0)), 111_194);
    }

    #[test]
    fn distance_is_truncated_not_rounded() {
        // 44.48 m and 100.08 m respectively.
        assert_eq!(distance_meters(at(46.0, 14.5), at(46.000_4, 14.5)), 44);
        assert_eq!(distance_meters(at(46.0, 14.5), at(46.000_9, 14.5)), 100);
    }

    #[test]
    fn distance_is_symmetric() {
        let london = at(51.500_7, -0.124_6);
        let new_york = at(40.689_2, -74.044_5);
        assert_eq!(distance_meters(london, new_york), 5_574_840);
        assert_eq!(distance_meters(new_york, london), 5_574_840);
    }

    #[test]
    fn crossing_the_antimeridian_takes_the_short_way() {
        assert_eq!(distance_meters(at(0.0, 179.9), at(0.0, -179.9)), 22_238);
    }

    #[test]
    fn pole_to_pole() {
        assert_eq!(distance_meters(at(90.0, 0.0), at(-90.0, 0.0)), 20_015_086);
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(Coordinate::new(90.5, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
        assert!(Coordinate::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn from_geolocation_copies_position() {
        let geo = Geolocation {
            id: "g".into(),
            name: "Gate".into(),
            latitude: 46.1,
            longitude: 14.6,
            radius: 10,
        };
        assert_eq!(Coordinate::from(&geo), at(46.1, 14.6));
    }
}
