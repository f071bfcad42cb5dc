// ── Session workflows ──
//
// Orchestrates the two user-triggered actions:
//
//   refresh:  token → locations → cache write-through
//   open:     policy (local) → token → open door
//
// Every invocation reads the credentials afresh, requests its own token,
// and drops it when done. Nothing is shared between invocations except
// the per-access-point in-flight set that stops duplicate unlocks, and the
// generation of the last refresh written to the cache.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashSet;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{ApiOperation, CoreError};
use crate::policy::{LocationWithDistance, evaluate};
use crate::position::PositionFeed;
use crate::provider::{CredentialsProvider, LocationCache};
use clouddoor_api::{Credentials, DoorClient, Location, TransportConfig};

// ── WorkflowState ────────────────────────────────────────────────

/// Progress of a single workflow attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum WorkflowState {
    Idle,
    TokenRequested,
    LocationsRequested,
    DoorOpenRequested,
    Failed,
}

// ── Results ──────────────────────────────────────────────────────

/// Successful unlock, as echoed by the service.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct OpenConfirmation {
    pub location_name: String,
    pub access_point_id: String,
}

impl OpenConfirmation {
    pub fn title(&self) -> &'static str {
        "Success"
    }

    pub fn message(&self) -> String {
        format!("Door '{}' opened", self.location_name)
    }
}

/// Tagged result of a spawned attempt.
#[derive(Debug)]
pub struct Outcome<T> {
    /// Monotonic per-session sequence number, assigned at spawn time.
    pub generation: u64,
    pub result: Result<T, CoreError>,
}

/// Handle to a workflow running as its own task.
///
/// Owns its state channel and its result; nothing is written into
/// shared presentation state from inside the task.
#[derive(Debug)]
pub struct Attempt<T> {
    generation: u64,
    state: watch::Receiver<WorkflowState>,
    handle: JoinHandle<Result<T, CoreError>>,
}

impl<T> Attempt<T> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Receiver for this attempt's state transitions.
    pub fn state(&self) -> watch::Receiver<WorkflowState> {
        self.state.clone()
    }

    /// Wait for the attempt to finish.
    pub async fn outcome(self) -> Outcome<T> {
        let result = match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(CoreError::Internal(format!("workflow task failed: {e}"))),
        };
        Outcome {
            generation: self.generation,
            result,
        }
    }
}

// ── Session ──────────────────────────────────────────────────────

/// Entry point for the door workflows.
///
/// Cheaply cloneable via `Arc<SessionInner>`.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    credentials: Arc<dyn CredentialsProvider>,
    cache: Arc<dyn LocationCache>,
    transport: TransportConfig,
    /// Access point ids with an unlock currently outstanding.
    in_flight: DashSet<String>,
    generation: AtomicU64,
    /// Generation of the refresh last written to the cache.
    cached_generation: Mutex<u64>,
}

/// Removes an access point from the in-flight set when dropped.
struct InFlightGuard<'a> {
    set: &'a DashSet<String>,
    id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.remove(&self.id);
    }
}

fn transition(state: &watch::Sender<WorkflowState>, next: WorkflowState) {
    debug!(state = %next, "workflow transition");
    state.send_replace(next);
}

impl Session {
    pub fn new(
        credentials: Arc<dyn CredentialsProvider>,
        cache: Arc<dyn LocationCache>,
        transport: TransportConfig,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                credentials,
                cache,
                transport,
                in_flight: DashSet::new(),
                generation: AtomicU64::new(0),
                cached_generation: Mutex::new(0),
            }),
        }
    }

    /// `true` if the credentials provider has a username.
    pub fn is_configured(&self) -> bool {
        self.inner.credentials.credentials().is_configured()
    }

    /// Last-known locations from the cache, for cold-start display.
    pub fn cached_locations(&self) -> Option<Vec<Location>> {
        self.inner.cache.cached_locations()
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Fetch the user's locations with a fresh token.
    ///
    /// On success the result is written through to the cache, unless a
    /// refresh started later has already been written. On failure nothing
    /// is written, so previously cached data stays available.
    pub async fn refresh_locations(&self) -> Result<Vec<Location>, CoreError> {
        let generation = self.next_generation();
        let (state, _) = watch::channel(WorkflowState::Idle);
        self.refresh_with(generation, &state).await
    }

    /// Run [`refresh_locations`](Self::refresh_locations) as its own task.
    pub fn spawn_refresh(&self) -> Attempt<Vec<Location>> {
        let generation = self.next_generation();
        let (state, rx) = watch::channel(WorkflowState::Idle);
        let session = self.clone();
        let handle = tokio::spawn(async move { session.refresh_with(generation, &state).await });
        Attempt {
            generation,
            state: rx,
            handle,
        }
    }

    async fn refresh_with(
        &self,
        generation: u64,
        state: &watch::Sender<WorkflowState>,
    ) -> Result<Vec<Location>, CoreError> {
        let result = self.refresh_steps(generation, state).await;
        match &result {
            Ok(locations) => {
                info!(count = locations.len(), "locations refreshed");
                transition(state, WorkflowState::Idle);
            }
            Err(e) => {
                warn!(error = %e, "location refresh failed");
                transition(state, WorkflowState::Failed);
            }
        }
        result
    }

    // ── Open door ────────────────────────────────────────────────

    /// Try to unlock the door for `entry`.
    ///
    /// The policy is checked first; a denial returns
    /// [`CoreError::AuthorizationDenied`] without touching the network.
    /// A second call for the same access point while one is outstanding
    /// fails with [`CoreError::OpenInFlight`].
    pub async fn attempt_open(
        &self,
        entry: &LocationWithDistance,
    ) -> Result<OpenConfirmation, CoreError> {
        let (state, _) = watch::channel(WorkflowState::Idle);
        self.open_with(entry, &state).await
    }

    /// Measure `location` against the feed's current position, then
    /// [`attempt_open`](Self::attempt_open).
    pub async fn open_location(
        &self,
        location: &Location,
        position: &dyn PositionFeed,
    ) -> Result<OpenConfirmation, CoreError> {
        let entry = LocationWithDistance::new(location.clone(), position.current());
        self.attempt_open(&entry).await
    }

    /// Run [`attempt_open`](Self::attempt_open) as its own task.
    pub fn spawn_open(&self, entry: LocationWithDistance) -> Attempt<OpenConfirmation> {
        let generation = self.next_generation();
        let (state, rx) = watch::channel(WorkflowState::Idle);
        let session = self.clone();
        let handle = tokio::spawn(async move { session.open_with(&entry, &state).await });
        Attempt {
            generation,
            state: rx,
            handle,
        }
    }

    async fn open_with(
        &self,
        entry: &LocationWithDistance,
        state: &watch::Sender<WorkflowState>,
    ) -> Result<OpenConfirmation, CoreError> {
        let result = self.open_steps(entry, state).await;
        match &result {
            Ok(confirmation) => {
                info!(access_point_id = %confirmation.access_point_id, "door opened");
                transition(state, WorkflowState::Idle);
            }
            Err(e) => {
                debug!(error = %e, "open attempt failed");
                transition(state, WorkflowState::Failed);
            }
        }
        result
    }

    async fn refresh_steps(
        &self,
        generation: u64,
        state: &watch::Sender<WorkflowState>,
    ) -> Result<Vec<Location>, CoreError> {
        let credentials = self.configured_credentials()?;
        let client = self.client_for(&credentials)?;

        transition(state, WorkflowState::TokenRequested);
        let token = client
            .request_token(&credentials)
            .await
            .map_err(|source| CoreError::AuthenticationFailed { source })?;

        transition(state, WorkflowState::LocationsRequested);
        let locations = client
            .list_locations(&token)
            .await
            .map_err(|source| CoreError::Api {
                operation: ApiOperation::ListLocations,
                source,
            })?;
        drop(token);

        self.write_through(generation, &locations);
        Ok(locations)
    }

    async fn open_steps(
        &self,
        entry: &LocationWithDistance,
        state: &watch::Sender<WorkflowState>,
    ) -> Result<OpenConfirmation, CoreError> {
        if let Err(reason) = evaluate(entry) {
            warn!(
                location = entry.name(),
                distance = ?entry.distance_meters,
                "open denied by geofence policy"
            );
            return Err(CoreError::AuthorizationDenied {
                location: entry.name().to_owned(),
                reason,
            });
        }

        let credentials = self.configured_credentials()?;
        let _guard = self.claim(entry.access_point_id())?;
        let client = self.client_for(&credentials)?;

        transition(state, WorkflowState::TokenRequested);
        let token = client
            .request_token(&credentials)
            .await
            .map_err(|source| CoreError::AuthenticationFailed { source })?;

        transition(state, WorkflowState::DoorOpenRequested);
        let echoed = client
            .open_door(&token, entry.access_point_id())
            .await
            .map_err(|source| CoreError::Api {
                operation: ApiOperation::OpenDoor,
                source,
            })?;

        Ok(OpenConfirmation {
            location_name: entry.name().to_owned(),
            access_point_id: echoed.access_point_id,
        })
    }

    // ── Helpers ──────────────────────────────────────────────────

    fn next_generation(&self) -> u64 {
        self.inner.generation.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Store `locations` unless a newer refresh is already in the cache.
    fn write_through(&self, generation: u64, locations: &[Location]) -> bool {
        let mut cached = self
            .inner
            .cached_generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if generation <= *cached {
            debug!(generation, newest = *cached, "stale refresh, cache left as is");
            return false;
        }
        self.inner.cache.store_locations(locations);
        *cached = generation;
        true
    }

    fn configured_credentials(&self) -> Result<Credentials, CoreError> {
        let credentials = self.inner.credentials.credentials();
        if credentials.is_configured() {
            Ok(credentials)
        } else {
            debug!("no username configured, skipping network call");
            Err(CoreError::NotConfigured)
        }
    }

    fn client_for(&self, credentials: &Credentials) -> Result<DoorClient, CoreError> {
        DoorClient::new(&credentials.hostname, &self.inner.transport).map_err(|e| {
            CoreError::Config {
                message: format!("cannot reach '{}': {e}", credentials.hostname),
            }
        })
    }

    fn claim(&self, access_point_id: &str) -> Result<InFlightGuard<'_>, CoreError> {
        if self.inner.in_flight.insert(access_point_id.to_owned()) {
            Ok(InFlightGuard {
                set: &self.inner.in_flight,
                id: access_point_id.to_owned(),
            })
        } else {
            warn!(access_point_id, "open already in flight");
            Err(CoreError::OpenInFlight {
                access_point_id: access_point_id.to_owned(),
            })
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("transport", &self.inner.transport)
            .field("in_flight", &self.inner.in_flight.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{InMemoryLocationCache, NoCache};

    fn unconfigured_session() -> Session {
        Session::new(
            Arc::new(Credentials::unconfigured()),
            Arc::new(NoCache),
            TransportConfig::default(),
        )
    }

    #[test]
    fn confirmation_renders_alert_text() {
        let confirmation = OpenConfirmation {
            location_name: "Office".into(),
            access_point_id: "loc-1".into(),
        };
        assert_eq!(confirmation.title(), "Success");
        assert_eq!(confirmation.message(), "Door 'Office' opened");
    }

    #[tokio::test]
    async fn unconfigured_refresh_fails_locally() {
        let session = unconfigured_session();
        assert!(!session.is_configured());
        let err = session.refresh_locations().await.expect_err("must fail");
        assert!(matches!(err, CoreError::NotConfigured));
        assert!(err.is_local());
    }

    #[tokio::test]
    async fn generations_increase_per_spawn() {
        let session = unconfigured_session();
        let first = session.spawn_refresh();
        let second = session.spawn_refresh();
        assert!(second.generation() > first.generation());

        let outcome = first.outcome().await;
        assert!(matches!(outcome.result, Err(CoreError::NotConfigured)));
        let _ = second.outcome().await;
    }

    #[tokio::test]
    async fn spawned_attempt_reports_failed_state() {
        let session = unconfigured_session();
        let attempt = session.spawn_refresh();
        let state = attempt.state();
        let _ = attempt.outcome().await;
        assert_eq!(*state.borrow(), WorkflowState::Failed);
    }

    #[test]
    fn in_flight_guard_releases_on_drop() {
        let session = unconfigured_session();
        {
            let _guard = session.claim("ap-1").expect("first claim");
            assert!(matches!(
                session.claim("ap-1"),
                Err(CoreError::OpenInFlight { .. })
            ));
            assert!(session.claim("ap-2").is_ok());
        }
        assert!(session.claim("ap-1").is_ok());
    }

    #[test]
    fn write_through_skips_older_generations() {
        let cache = Arc::new(InMemoryLocationCache::new());
        let session = Session::new(
            Arc::new(Credentials::unconfigured()),
            cache.clone(),
            TransportConfig::default(),
        );
        let newer = vec![Location {
            id: "loc-2".into(),
            name: "Lab".into(),
            geolocations: Vec::new(),
        }];

        assert!(session.write_through(2, &newer));
        assert!(!session.write_through(1, &[]));
        assert!(!session.write_through(2, &[]));
        assert_eq!(cache.cached_locations(), Some(newer));
    }

    #[test]
    fn cached_locations_come_from_the_cache() {
        let cache = InMemoryLocationCache::with_locations(vec![Location {
            id: "loc-1".into(),
            name: "Office".into(),
            geolocations: Vec::new(),
        }]);
        let session = Session::new(
            Arc::new(Credentials::unconfigured()),
            Arc::new(cache),
            TransportConfig::default(),
        );
        assert_eq!(session.cached_locations().map(|l| l.len()), Some(1));
    }
}
