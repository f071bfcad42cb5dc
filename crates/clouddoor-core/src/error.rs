// ── Core error types ──
//
// User-facing errors from clouddoor-core. Network failures keep the
// underlying `clouddoor_api::Error` as their source so the taxonomy
// (transport / status / decode / encoding) stays inspectable, while
// policy denials are produced locally without any network call.

use thiserror::Error;

/// Which API step of a workflow failed (the token step has its own variant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ApiOperation {
    #[strum(serialize = "Fetching locations")]
    ListLocations,
    #[strum(serialize = "Opening door")]
    OpenDoor,
}

/// Why the local policy refused an open attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// Device position is not known.
    PositionUnknown,
    /// Device is outside the geofence.
    TooFar { distance_meters: u32, radius_meters: i64 },
    /// The location carries no geofence to measure against.
    NoGeofence,
}

impl DenialReason {
    /// The user-facing sentence for a denial at `location`.
    pub fn describe(&self, location: &str) -> String {
        match self {
            Self::PositionUnknown => {
                "Cannot open door, since location of the device is not known".into()
            }
            Self::TooFar {
                distance_meters,
                radius_meters,
            } => format!(
                "Door '{location}' too far away ({distance_meters}m > {radius_meters}m)"
            ),
            Self::NoGeofence => format!("Door '{location}' has no geofence configured"),
        }
    }
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Local (no network call made) ─────────────────────────────────
    #[error("Credentials are not configured")]
    NotConfigured,

    #[error("{}", .reason.describe(.location))]
    AuthorizationDenied {
        location: String,
        reason: DenialReason,
    },

    #[error("Door '{access_point_id}' is already being opened")]
    OpenInFlight { access_point_id: String },

    #[error("Invalid coordinate: {message}")]
    InvalidCoordinate { message: String },

    // ── Network ──────────────────────────────────────────────────────
    #[error("Authentication failed: {source}")]
    AuthenticationFailed {
        #[source]
        source: clouddoor_api::Error,
    },

    #[error("{operation} failed: {source}")]
    Api {
        operation: ApiOperation,
        #[source]
        source: clouddoor_api::Error,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Title for the single title/message pair shown to the user.
    pub fn title(&self) -> &'static str {
        "Error"
    }

    /// Message for the single title/message pair shown to the user.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// `true` when the error was produced without any network call.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::NotConfigured
                | Self::AuthorizationDenied { .. }
                | Self::OpenInFlight { .. }
                | Self::InvalidCoordinate { .. }
                | Self::Config { .. }
        )
    }

    /// The API error behind a network failure, if any.
    pub fn api_error(&self) -> Option<&clouddoor_api::Error> {
        match self {
            Self::AuthenticationFailed { source } | Self::Api { source, .. } => Some(source),
            _ => None,
        }
    }

    /// The denial reason, if the local policy rejected an open attempt.
    pub fn denial(&self) -> Option<DenialReason> {
        match self {
            Self::AuthorizationDenied { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_far_message_matches_alert_text() {
        let err = CoreError::AuthorizationDenied {
            location: "Office".into(),
            reason: DenialReason::TooFar {
                distance_meters: 150,
                radius_meters: 100,
            },
        };
        assert_eq!(err.message(), "Door 'Office' too far away (150m > 100m)");
        assert_eq!(err.title(), "Error");
        assert!(err.is_local());
    }

    #[test]
    fn position_unknown_message() {
        let err = CoreError::AuthorizationDenied {
            location: "Office".into(),
            reason: DenialReason::PositionUnknown,
        };
        assert_eq!(
            err.to_string(),
            "Cannot open door, since location of the device is not known"
        );
        assert_eq!(err.denial(), Some(DenialReason::PositionUnknown));
    }

    #[test]
    fn network_errors_keep_their_source() {
        let err = CoreError::Api {
            operation: ApiOperation::ListLocations,
            source: clouddoor_api::Error::HttpStatus {
                status: 500,
                body: "boom".into(),
            },
        };
        assert!(!err.is_local());
        assert_eq!(err.api_error().and_then(clouddoor_api::Error::status), Some(500));
        assert_eq!(
            err.to_string(),
            "Fetching locations failed: Response failed with '500': boom"
        );
    }
}
