//! Configuration for the CloudDoor client.
//!
//! TOML profiles, password resolution (env + keyring + plaintext),
//! translation to `clouddoor_core` credentials and transport settings,
//! and the on-disk location cache. The CLI layers its flag overrides on top.

pub mod cache;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use clouddoor_core::{Credentials, CredentialsProvider, TlsMode, TransportConfig};

pub use cache::{CachedLocations, FileLocationCache};

/// Keyring service name; entries are keyed `<profile>/password`.
const KEYRING_SERVICE: &str = "clouddoor";

/// Environment variable that overrides every stored password.
pub const PASSWORD_ENV: &str = "CLOUDDOOR_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found in config")]
    UnknownProfile { profile: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("cache file is not valid: {0}")]
    CacheFormat(#[from] serde_json::Error),

    #[error("no platform directory available for {0}")]
    NoDirectory(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named DoorCloud accounts.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use, honoring an explicit choice first.
    pub fn profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds. Unset means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: None,
        }
    }
}

fn default_output() -> String {
    "table".into()
}

/// A named DoorCloud account.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Service base URL (e.g., "https://door.example.com").
    pub hostname: String,

    /// Account user name. Empty means not configured.
    #[serde(default)]
    pub username: String,

    /// Plaintext password; prefer the keyring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// PEM bundle to trust in addition to the system roots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "clouddoor", "clouddoor")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("clouddoor");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Resolve the location cache file path.
pub fn cache_path() -> Result<PathBuf, ConfigError> {
    project_dirs()
        .map(|dirs| dirs.cache_dir().join("locations.json"))
        .ok_or(ConfigError::NoDirectory("the location cache"))
}

// ── Loading & saving ────────────────────────────────────────────────

/// Load the full config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path`, layered as defaults ← file ← `CLOUDDOOR_*` env.
///
/// Nested keys in the environment use a double underscore, e.g.
/// `CLOUDDOOR_DEFAULTS__TIMEOUT=10`. A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CLOUDDOOR_").split("__"))
        .extract()?;
    Ok(config)
}

/// Load config, returning the defaults if it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write it to the canonical path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(&path, cfg)?;
    Ok(path)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Password resolution ─────────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/password"),
    )?)
}

fn keyring_password(profile_name: &str) -> Option<String> {
    let lookup = keyring_entry(profile_name)
        .and_then(|entry| entry.get_password().map_err(ConfigError::from));
    match lookup {
        Ok(pw) => Some(pw),
        Err(e) => {
            debug!(profile = profile_name, error = %e, "no keyring password");
            None
        }
    }
}

/// First non-empty source wins: env, then keyring, then plaintext.
fn first_password(
    env: Option<String>,
    keyring: impl FnOnce() -> Option<String>,
    plaintext: Option<&str>,
) -> Option<SecretString> {
    env.filter(|pw| !pw.is_empty())
        .or_else(|| keyring().filter(|pw| !pw.is_empty()))
        .or_else(|| plaintext.filter(|pw| !pw.is_empty()).map(str::to_owned))
        .map(SecretString::from)
}

/// Resolve the password for `profile` through the credential chain.
pub fn resolve_password(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    first_password(
        std::env::var(PASSWORD_ENV).ok(),
        || keyring_password(profile_name),
        profile.password.as_deref(),
    )
    .ok_or_else(|| ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store `password` for `profile_name` in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

// ── Translation to core types ───────────────────────────────────────

/// Credentials read from a profile each time a workflow starts.
#[derive(Debug, Clone)]
pub struct ProfileCredentials {
    name: String,
    profile: Option<Profile>,
}

impl ProfileCredentials {
    /// Credentials for `name`; an absent profile reads as not configured.
    pub fn new(name: impl Into<String>, profile: Option<Profile>) -> Self {
        Self {
            name: name.into(),
            profile,
        }
    }

    pub fn from_config(config: &Config, name: &str) -> Self {
        Self::new(name, config.profiles.get(name).cloned())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }
}

impl CredentialsProvider for ProfileCredentials {
    fn credentials(&self) -> Credentials {
        let Some(profile) = &self.profile else {
            return Credentials::unconfigured();
        };
        if profile.username.is_empty() {
            return Credentials::unconfigured();
        }
        // A missing password still lets the service answer with a 400,
        // which reports the problem better than failing locally.
        let password = resolve_password(profile, &self.name)
            .unwrap_or_else(|_| SecretString::from(String::new()));
        Credentials {
            hostname: profile.hostname.clone(),
            username: profile.username.clone(),
            password,
        }
    }
}

/// Transport settings for a profile, falling back to the global defaults.
pub fn profile_transport(profile: Option<&Profile>, defaults: &Defaults) -> TransportConfig {
    let insecure = profile
        .and_then(|p| p.insecure)
        .unwrap_or(defaults.insecure);
    let tls = match profile.and_then(|p| p.ca_cert.clone()) {
        _ if insecure => TlsMode::DangerAcceptInvalid,
        Some(path) => TlsMode::CustomCa(path),
        None => TlsMode::System,
    };
    let transport = TransportConfig::default().with_tls(tls);
    match profile.and_then(|p| p.timeout).or(defaults.timeout) {
        Some(secs) => transport.with_timeout(Duration::from_secs(secs)),
        None => transport,
    }
}
