//! CLI configuration: thin wrapper around `clouddoor_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--hostname, --username, --insecure, --timeout, --lat/--lon) and
//! assembles the `Session` every door command runs against.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use clouddoor_core::{
    Coordinate, CoreError, CredentialsProvider, LocationCache, NoCache, Session, TlsMode,
    TransportConfig,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use clouddoor_config::{
    Config, FileLocationCache, Profile, ProfileCredentials, config_path, load_config,
    load_config_or_default, profile_transport, save_config, store_password,
};

// ── Profile resolution ──────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.profile_name(global.profile.as_deref())
}

/// The active profile with `--hostname` / `--username` applied on top.
///
/// Flags alone are enough to describe an account, so a profile is
/// synthesized when the config has none by that name.
pub fn resolve_profile(global: &GlobalOpts, config: &Config, name: &str) -> Option<Profile> {
    let stored = config.profiles.get(name).cloned();
    if global.hostname.is_none() && global.username.is_none() {
        return stored;
    }
    let mut profile = stored.unwrap_or_default();
    if let Some(hostname) = &global.hostname {
        profile.hostname.clone_from(hostname);
    }
    if let Some(username) = &global.username {
        profile.username.clone_from(username);
    }
    Some(profile)
}

/// Transport settings: profile, then defaults, then CLI flags on top.
pub fn resolve_transport(
    global: &GlobalOpts,
    config: &Config,
    profile: Option<&Profile>,
) -> TransportConfig {
    let mut transport = profile_transport(profile, &config.defaults);
    if global.insecure {
        transport = transport.with_tls(TlsMode::DangerAcceptInvalid);
    }
    if let Some(secs) = global.timeout {
        transport = transport.with_timeout(Duration::from_secs(secs));
    }
    transport
}

/// Position from `--lat/--lon`, validated.
pub fn resolve_position(global: &GlobalOpts) -> Result<Option<Coordinate>, CliError> {
    match (global.lat, global.lon) {
        (Some(lat), Some(lon)) => Ok(Some(Coordinate::new(lat, lon)?)),
        _ => Ok(None),
    }
}

// ── Context ─────────────────────────────────────────────────────────

/// Everything a door command needs, resolved once per invocation.
pub struct Context {
    pub profile_name: String,
    pub session: Session,
    pub position: Option<Coordinate>,
}

impl Context {
    pub fn build(global: &GlobalOpts) -> Result<Self, CliError> {
        let config = load_config()?;
        let profile_name = active_profile_name(global, &config);
        let profile = resolve_profile(global, &config, &profile_name);
        let transport = resolve_transport(global, &config, profile.as_ref());
        let position = resolve_position(global)?;

        let cache: Arc<dyn LocationCache> = match FileLocationCache::at_default_path() {
            Ok(cache) => {
                debug!(path = %cache.path().display(), "using location cache");
                Arc::new(cache)
            }
            Err(e) => {
                warn!(error = %e, "location cache unavailable");
                Arc::new(NoCache)
            }
        };
        let credentials: Arc<dyn CredentialsProvider> =
            Arc::new(ProfileCredentials::new(profile_name.clone(), profile));

        Ok(Self {
            profile_name,
            session: Session::new(credentials, cache, transport),
            position,
        })
    }

    /// Convert a workflow error, naming the active profile where it helps.
    pub fn fail(&self, err: CoreError) -> CliError {
        match err {
            CoreError::NotConfigured => CliError::NotConfigured {
                profile: self.profile_name.clone(),
            },
            other => other.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["clouddoor"];
        argv.extend_from_slice(args);
        argv.push("locations");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn config_with(name: &str, profile: Profile) -> Config {
        let mut config = Config::default();
        config.profiles.insert(name.into(), profile);
        config
    }

    fn stored() -> Profile {
        Profile {
            hostname: "https://door.example.com".into(),
            username: "alice".into(),
            timeout: Some(12),
            ..Profile::default()
        }
    }

    #[test]
    fn flags_override_profile_fields() {
        let config = config_with("default", stored());
        let g = global(&["--username", "bob"]);

        let profile = resolve_profile(&g, &config, "default").unwrap();

        assert_eq!(profile.username, "bob");
        assert_eq!(profile.hostname, "https://door.example.com");
    }

    #[test]
    fn flags_alone_describe_an_account() {
        let g = global(&["--hostname", "https://h", "--username", "carol"]);
        let profile = resolve_profile(&g, &Config::default(), "default").unwrap();
        assert_eq!(profile.hostname, "https://h");
        assert_eq!(profile.username, "carol");
    }

    #[test]
    fn no_profile_and_no_flags_is_none() {
        assert!(resolve_profile(&global(&[]), &Config::default(), "default").is_none());
    }

    #[test]
    fn timeout_flag_beats_profile() {
        let config = config_with("default", stored());
        let profile = config.profiles.get("default");

        let from_profile = resolve_transport(&global(&[]), &config, profile);
        assert_eq!(from_profile.timeout, Some(Duration::from_secs(12)));

        let from_flag = resolve_transport(&global(&["--timeout", "3", "-k"]), &config, profile);
        assert_eq!(from_flag.timeout, Some(Duration::from_secs(3)));
        assert_eq!(from_flag.tls, TlsMode::DangerAcceptInvalid);
    }

    #[test]
    fn position_requires_valid_coordinates() {
        assert_eq!(resolve_position(&global(&[])).unwrap(), None);
        assert!(
            resolve_position(&global(&["--lat", "46.05", "--lon", "-14.5"]))
                .unwrap()
                .is_some()
        );
        assert!(resolve_position(&global(&["--lat", "91", "--lon", "0"])).is_err());
    }
}
