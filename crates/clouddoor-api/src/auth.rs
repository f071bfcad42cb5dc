use std::fmt;

use secrecy::{ExposeSecret, SecretString};

/// Credentials for the DoorCloud token endpoint.
///
/// Loaded once from the configuration provider and never mutated.
/// An empty `username` means "not configured": callers must not attempt
/// any network call with such credentials.
#[derive(Clone)]
pub struct Credentials {
    /// Base URL of the service (e.g. `https://doors.example.com`).
    pub hostname: String,
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(
        hostname: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Credentials that indicate nothing has been set up yet.
    pub fn unconfigured() -> Self {
        Self::new(String::new(), String::new(), String::new())
    }

    /// `false` when the username is empty.
    pub fn is_configured(&self) -> bool {
        !self.username.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("hostname", &self.hostname)
            .field("username", &self.username)
            .field("password", &"****")
            .finish()
    }
}

/// Opaque bearer token returned by `POST /token`.
///
/// Lives for a single workflow call. It is never cached, persisted, or
/// refreshed; each high-level action requests a fresh one.
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The `Authorization` header value for this token.
    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.0.expose_secret())
    }

    /// The raw token string.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(****)")
    }
}
