//! Clap derive structures for the `clouddoor` CLI.
//!
//! Shared with `build.rs`, so this file may only depend on clap and
//! clap_complete.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// clouddoor -- open DoorCloud doors when you are close enough
#[derive(Debug, Parser)]
#[command(
    name = "clouddoor",
    version,
    about = "Open DoorCloud doors from the command line",
    long_about = "Lists the doors your DoorCloud account can open, shows how far\n\
        away each one is, and unlocks a door when you are inside its geofence.\n\n\
        Your position comes from --lat/--lon (or CLOUDDOOR_LAT/CLOUDDOOR_LON).",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Account profile to use
    #[arg(long, short = 'p', env = "CLOUDDOOR_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Service URL (overrides profile)
    #[arg(long, env = "CLOUDDOOR_HOSTNAME", global = true)]
    pub hostname: Option<String>,

    /// Account user name (overrides profile)
    #[arg(long, env = "CLOUDDOOR_USERNAME", global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CLOUDDOOR_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Current latitude in decimal degrees
    #[arg(
        long,
        env = "CLOUDDOOR_LAT",
        requires = "lon",
        allow_negative_numbers = true,
        global = true
    )]
    pub lat: Option<f64>,

    /// Current longitude in decimal degrees
    #[arg(
        long,
        env = "CLOUDDOOR_LON",
        requires = "lat",
        allow_negative_numbers = true,
        global = true
    )]
    pub lon: Option<f64>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "CLOUDDOOR_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "CLOUDDOOR_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List doors with their distance and whether they can be opened
    #[command(alias = "ls", alias = "l")]
    Locations(LocationsArgs),

    /// Open a door by id or name
    Open(OpenArgs),

    /// Follow positions from stdin ("lat,lon" per line) and re-render distances
    Track(TrackArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct LocationsArgs {
    /// Only show the last cached list, without contacting the service
    #[arg(long)]
    pub cached: bool,
}

#[derive(Debug, Args)]
pub struct OpenArgs {
    /// Location id, or its name (case-insensitive)
    pub location: String,

    /// Resolve the location from the cache instead of refreshing first
    #[arg(long)]
    pub cached: bool,
}

#[derive(Debug, Args)]
pub struct TrackArgs {
    /// Use the cached list without refreshing first
    #[arg(long)]
    pub cached: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create a profile with guided setup
    Init,

    /// Display the current configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,

    /// Set a profile value
    Set {
        /// One of: hostname, username, insecure, timeout, ca_cert
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
