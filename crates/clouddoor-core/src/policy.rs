// ── Authorization policy ──
//
// Pairs locations with the device position and decides whether a door
// may be opened. Everything here is synchronous; the network is never
// consulted before a positive decision.

use serde::{Deserialize, Serialize};

use crate::error::DenialReason;
use crate::geo::{Coordinate, distance_meters};
use clouddoor_api::Location;

/// A location together with the device's distance to its primary geofence.
///
/// Derived and ephemeral: rebuilt whenever the location set or the
/// position changes. `distance_meters` is `None` when the position is
/// unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationWithDistance {
    pub location: Location,
    pub distance_meters: Option<u32>,
}

impl LocationWithDistance {
    pub fn new(location: Location, position: Option<Coordinate>) -> Self {
        let distance_meters = position.and_then(|here| {
            location
                .primary_geofence()
                .map(|geo| distance_meters(here, Coordinate::from(geo)))
        });
        Self {
            location,
            distance_meters,
        }
    }

    /// Identifier sent to the open-door endpoint.
    pub fn access_point_id(&self) -> &str {
        &self.location.id
    }

    pub fn name(&self) -> &str {
        &self.location.name
    }

    /// Radius of the primary geofence, in meters.
    pub fn radius_meters(&self) -> Option<i64> {
        self.location.primary_geofence().map(|geo| geo.radius)
    }
}

/// Attach distances to every location, preserving order.
///
/// Without a position every distance is absent. The input is left
/// untouched; a fresh sequence is returned on each call.
pub fn with_distances(
    locations: &[Location],
    position: Option<Coordinate>,
) -> Vec<LocationWithDistance> {
    locations
        .iter()
        .map(|location| LocationWithDistance::new(location.clone(), position))
        .collect()
}

/// Decide whether the door may be opened, and why not if it may not.
pub fn evaluate(entry: &LocationWithDistance) -> Result<(), DenialReason> {
    let Some(radius_meters) = entry.radius_meters() else {
        return Err(DenialReason::NoGeofence);
    };
    let Some(distance_meters) = entry.distance_meters else {
        return Err(DenialReason::PositionUnknown);
    };
    if i64::from(distance_meters) <= radius_meters {
        Ok(())
    } else {
        Err(DenialReason::TooFar {
            distance_meters,
            radius_meters,
        })
    }
}

/// `true` iff the distance is known and within the primary radius.
pub fn is_openable(entry: &LocationWithDistance) -> bool {
    evaluate(entry).is_ok()
}

/// Render a distance for display.
///
/// Above 1000 m the value is shown in whole kilometers (truncated);
/// otherwise in meters. Absent distances render as `unknown`.
pub fn format_distance(distance_meters: Option<u32>) -> String {
    match distance_meters {
        Some(d) if d > 1000 => format!("{}km", d / 1000),
        Some(d) => format!("{d}m"),
        None => "unknown".into(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use clouddoor_api::Geolocation;

    fn location(id: &str, latitude: f64, longitude: f64, radius: i64) -> Location {
        Location {
            id: id.into(),
            name: format!("Door {id}"),
            geolocations: vec![Geolocation {
                id: format!("geo-{id}"),
                name: "Entrance".into(),
                latitude,
                longitude,
                radius,
            }],
        }
    }

    fn entry(distance: Option<u32>, radius: i64) -> LocationWithDistance {
        LocationWithDistance {
            location: location("x", 0.0, 0.0, radius),
            distance_meters: distance,
        }
    }

    #[test]
    fn with_distances_preserves_length_and_order() {
        let locations = vec![
            location("a", 46.0, 14.5, 100),
            location("b", 46.000_4, 14.5, 100),
            location("c", 47.0, 15.0, 100),
        ];
        let here = Coordinate::new(46.0, 14.5).expect("coordinate");

        let entries = with_distances(&locations, Some(here));

        assert_eq!(entries.len(), 3);
        let ids: Vec<_> = entries.iter().map(LocationWithDistance::access_point_id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(entries[0].distance_meters, Some(0));
        assert_eq!(entries[1].distance_meters, Some(44));
        assert!(entries.iter().all(|e| e.distance_meters.is_some()));
    }

    #[test]
    fn with_distances_without_position_marks_all_absent() {
        let locations = vec![location("a", 46.0, 14.5, 100), location("b", 1.0, 1.0, 5)];
        let entries = with_distances(&locations, None);
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.distance_meters.is_none()));
    }

    #[test]
    fn with_distances_on_empty_input() {
        assert!(with_distances(&[], None).is_empty());
    }

    #[test]
    fn with_distances_uses_first_geofence_only() {
        let mut loc = location("a", 46.0, 14.5, 100);
        loc.geolocations.push(Geolocation {
            id: "far".into(),
            name: "Far".into(),
            latitude: 0.0,
            longitude: 0.0,
            radius: 1,
        });
        let here = Coordinate::new(46.0, 14.5).expect("coordinate");
        let entries = with_distances(&[loc], Some(here));
        assert_eq!(entries[0].distance_meters, Some(0));
        assert_eq!(entries[0].radius_meters(), Some(100));
    }

    #[test]
    fn openable_within_radius() {
        assert!(is_openable(&entry(Some(50), 100)));
        assert_eq!(evaluate(&entry(Some(50), 100)), Ok(()));
    }

    #[test]
    fn openable_exactly_on_the_boundary() {
        assert!(is_openable(&entry(Some(100), 100)));
    }

    #[test]
    fn too_far_outside_radius() {
        assert!(!is_openable(&entry(Some(150), 100)));
        assert_eq!(
            evaluate(&entry(Some(150), 100)),
            Err(DenialReason::TooFar {
                distance_meters: 150,
                radius_meters: 100
            })
        );
    }

    #[test]
    fn negative_radius_is_never_openable() {
        assert!(!is_openable(&entry(Some(0), -5)));
        assert_eq!(
            evaluate(&entry(Some(0), -5)),
            Err(DenialReason::TooFar {
                distance_meters: 0,
                radius_meters: -5
            })
        );
    }

    #[test]
    fn unknown_position_is_never_openable() {
        assert!(!is_openable(&entry(None, 100)));
        assert_eq!(evaluate(&entry(None, 100)), Err(DenialReason::PositionUnknown));
    }

    #[test]
    fn missing_geofence_is_denied() {
        let bare = LocationWithDistance::new(
            Location {
                id: "bare".into(),
                name: "Bare".into(),
                geolocations: Vec::new(),
            },
            Some(Coordinate::new(0.0, 0.0).expect("coordinate")),
        );
        assert_eq!(bare.distance_meters, None);
        assert_eq!(evaluate(&bare), Err(DenialReason::NoGeofence));
    }

    #[test]
    fn formats_meters_and_truncated_kilometers() {
        assert_eq!(format_distance(Some(500)), "500m");
        assert_eq!(format_distance(Some(1000)), "1000m");
        assert_eq!(format_distance(Some(1001)), "1km");
        assert_eq!(format_distance(Some(1500)), "1km");
        assert_eq!(format_distance(Some(1999)), "1km");
        assert_eq!(format_distance(Some(25_750)), "25km");
        assert_eq!(format_distance(Some(0)), "0m");
        assert_eq!(format_distance(None), "unknown");
    }
}
