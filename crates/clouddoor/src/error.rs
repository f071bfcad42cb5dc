//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use clouddoor_config::ConfigError;
use clouddoor_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const DENIED: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach DoorCloud: {message}")]
    #[diagnostic(
        code(clouddoor::connection_failed),
        help(
            "Check the hostname in your profile and your network connection.\n\
             Self-signed certificate? Use --insecure (-k) or set ca_cert."
        )
    )]
    ConnectionFailed { message: String },

    #[error("Request timed out: {message}")]
    #[diagnostic(
        code(clouddoor::timeout),
        help("Increase the timeout with --timeout or check the service status.")
    )]
    Timeout { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(clouddoor::auth_failed),
        help(
            "Verify your user name and password.\n\
             Run: clouddoor config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("No account configured for profile '{profile}'")]
    #[diagnostic(
        code(clouddoor::not_configured),
        help(
            "Create a profile with: clouddoor config init\n\
             Or pass --hostname and --username (password via CLOUDDOOR_PASSWORD)."
        )
    )]
    NotConfigured { profile: String },

    // ── Policy ───────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(clouddoor::denied),
        help("Doors open only inside their geofence. Pass your position with --lat/--lon.")
    )]
    Denied { message: String },

    #[error("{message}")]
    #[diagnostic(code(clouddoor::in_flight))]
    InFlight { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Location '{identifier}' not found")]
    #[diagnostic(
        code(clouddoor::not_found),
        help("Run: clouddoor locations to see the doors you can open")
    )]
    NotFound { identifier: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(clouddoor::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(clouddoor::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(clouddoor::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: clouddoor config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(clouddoor::config))]
    Config(#[from] ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(clouddoor::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NotConfigured { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Denied { .. } => exit_code::DENIED,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let message = err.message();
        if let Some(api) = err.api_error() {
            if api.is_timeout() {
                return Self::Timeout { message };
            }
            if api.is_transport() {
                return Self::ConnectionFailed { message };
            }
        }

        match err {
            CoreError::NotConfigured => Self::NotConfigured {
                profile: "current".into(),
            },
            CoreError::AuthorizationDenied { .. } => Self::Denied { message },
            CoreError::OpenInFlight { .. } => Self::InFlight { message },
            CoreError::InvalidCoordinate { message } => Self::Validation {
                field: "position".into(),
                reason: message,
            },
            CoreError::AuthenticationFailed { .. } => Self::AuthFailed { message },
            CoreError::Config { message } => Self::ConnectionFailed { message },
            CoreError::Api { .. } | CoreError::Internal(_) => Self::ApiError { message },
        }
    }
}
