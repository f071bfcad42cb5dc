use thiserror::Error;

/// Top-level error type for the `clouddoor-api` crate.
///
/// Every endpoint funnels its failures through this type: transport,
/// non-200 status, body decoding, and request construction.
/// `clouddoor-core` wraps these into user-facing workflow errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// No HTTP status was obtained (DNS failure, connection refused,
    /// timeout, body read interrupted).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error (bad hostname in the configuration).
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Response ────────────────────────────────────────────────────
    /// The server answered with anything other than `200 OK`.
    /// The raw body is kept for diagnostics.
    #[error("Response failed with '{status}': {body}")]
    HttpStatus { status: u16, body: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Request construction ────────────────────────────────────────
    /// A form-urlencoded request body could not be built.
    #[error("Failed to urlencode parameters: {0}")]
    Encoding(#[from] serde_urlencoded::ser::Error),
}

impl Error {
    /// The HTTP status carried by this error, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if the request never produced an HTTP status.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns `true` if the request gave up waiting for the server.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}
