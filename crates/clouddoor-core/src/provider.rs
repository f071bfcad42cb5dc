// ── Capability interfaces ──
//
// Narrow read/write seams for collaborators that live outside the core:
// the credentials store and the last-known-locations cache. Concrete
// file/keyring implementations live in `clouddoor-config`.

use std::sync::{PoisonError, RwLock};

use clouddoor_api::{Credentials, Location};

/// Read-only source of the service credentials.
pub trait CredentialsProvider: Send + Sync {
    /// Current credentials. An empty username means "not configured".
    fn credentials(&self) -> Credentials;
}

impl CredentialsProvider for Credentials {
    fn credentials(&self) -> Credentials {
        self.clone()
    }
}

/// Last-known locations, used to populate the display before the first
/// refresh completes.
pub trait LocationCache: Send + Sync {
    /// Cached locations, or `None` if nothing (readable) was stored.
    fn cached_locations(&self) -> Option<Vec<Location>>;

    /// Replace the cached set. Failures are the implementation's to log;
    /// callers never see them.
    fn store_locations(&self, locations: &[Location]);
}

/// A cache that never holds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl LocationCache for NoCache {
    fn cached_locations(&self) -> Option<Vec<Location>> {
        None
    }

    fn store_locations(&self, _locations: &[Location]) {}
}

/// Process-local cache, for tests and embedders without persistent storage.
#[derive(Debug, Default)]
pub struct InMemoryLocationCache {
    locations: RwLock<Option<Vec<Location>>>,
}

impl InMemoryLocationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locations(locations: Vec<Location>) -> Self {
        Self {
            locations: RwLock::new(Some(locations)),
        }
    }
}

impl LocationCache for InMemoryLocationCache {
    fn cached_locations(&self) -> Option<Vec<Location>> {
        self.locations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store_locations(&self, locations: &[Location]) {
        *self
            .locations
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(locations.to_vec());
    }
}
