// Wire types for the DoorCloud API.
//
// `Location` and `Geolocation` double as the domain entities: they are
// immutable once fetched and are written verbatim to the location cache.
// The response envelopes stay crate-private; callers only see payloads.

use serde::{Deserialize, Serialize};

/// One physical access point and the radius it may be opened from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geolocation {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Permitted proximity, in meters. The service does not constrain the
    /// sign; a negative radius decodes and simply never admits anyone.
    pub radius: i64,
}

/// A door or site the user may access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    /// Geofences for this location. The first entry is authoritative for
    /// distance and gating.
    pub geolocations: Vec<Geolocation>,
}

impl Location {
    /// The geofence used for distance display and open gating.
    pub fn primary_geofence(&self) -> Option<&Geolocation> {
        self.geolocations.first()
    }
}

/// Confirmation echoed by `OpenDoorOnLocation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenDoorResult {
    pub access_point_id: String,
}

// ── Response envelopes ──────────────────────────────────────────────

/// `POST /token`
#[derive(Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
}

/// `GET /api/Location/GetUserLocations`
#[derive(Deserialize)]
pub(crate) struct UserLocationsResponse {
    pub result: Vec<Location>,
}

/// `POST /api/Location/OpenDoorOnLocation`: `{result: {data: {id}}}`
#[derive(Deserialize)]
pub(crate) struct OpenDoorResponse {
    pub result: OpenDoorEnvelope,
}

#[derive(Deserialize)]
pub(crate) struct OpenDoorEnvelope {
    pub data: OpenDoorData,
}

#[derive(Deserialize)]
pub(crate) struct OpenDoorData {
    pub id: String,
}

impl From<OpenDoorResponse> for OpenDoorResult {
    fn from(resp: OpenDoorResponse) -> Self {
        Self {
            access_point_id: resp.result.data.id,
        }
    }
}
