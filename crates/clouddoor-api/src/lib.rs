// clouddoor-api: Async Rust client for the DoorCloud access-control API

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use auth::{AccessToken, Credentials};
pub use client::DoorClient;
pub use error::Error;
pub use models::{Geolocation, Location, OpenDoorResult};
pub use transport::{TlsMode, TransportConfig};
