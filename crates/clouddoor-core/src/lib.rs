//! Geofence authorization and session workflows for the DoorCloud client.
//!
//! This crate sits between `clouddoor-api` and a presentation layer
//! (the `clouddoor` CLI, or any embedding UI):
//!
//! - **[`geo`]**: [`Coordinate`] and great-circle [`distance_meters`].
//!
//! - **[`policy`]**: pairs locations with the live position
//!   ([`with_distances`]), decides whether a door may be opened
//!   ([`is_openable`] / [`evaluate`]), and formats distances for display.
//!
//! - **[`Session`]**: the two workflows: token → locations, and
//!   policy → token → open door. Every call gets a fresh token. Workflows
//!   can run inline or as spawned [`Attempt`]s that carry their own
//!   [`WorkflowState`] and tagged outcome.
//!
//! - **[`LocationBoard`]**: the presented location set plus last-known
//!   position, published through a `watch` channel. Stale refresh
//!   outcomes are discarded by generation.
//!
//! - **Capabilities** ([`provider`], [`position`]): narrow traits for
//!   credentials, the location cache, and the live-position feed, so the
//!   core never touches disk or sensors directly.

pub mod board;
pub mod error;
pub mod geo;
pub mod policy;
pub mod position;
pub mod provider;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use board::{BoardSnapshot, LocationBoard};
pub use error::{ApiOperation, CoreError, DenialReason};
pub use geo::{Coordinate, distance_meters};
pub use policy::{LocationWithDistance, evaluate, format_distance, is_openable, with_distances};
pub use position::{PositionFeed, PositionWatch, StaticPosition};
pub use provider::{CredentialsProvider, InMemoryLocationCache, LocationCache, NoCache};
pub use session::{Attempt, OpenConfirmation, Outcome, Session, WorkflowState};

// Wire types double as domain entities.
pub use clouddoor_api::Error as ApiError;
pub use clouddoor_api::{
    AccessToken, Credentials, Geolocation, Location, OpenDoorResult, TlsMode, TransportConfig,
};
