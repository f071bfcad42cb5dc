// ── Location board ──
//
// Presentation state for the location list: the last accepted location
// set, the current position, and the derived distance entries. Consumers
// subscribe to a `watch` channel and always see a consistent snapshot.
//
// Refresh results carry the generation of the attempt that produced them;
// a result older than the one already shown is discarded.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::geo::Coordinate;
use crate::policy::{LocationWithDistance, with_distances};
use clouddoor_api::Location;

/// Immutable view of the board at one point in time.
#[derive(Debug, Clone, Default)]
pub struct BoardSnapshot {
    pub locations: Arc<Vec<Location>>,
    pub entries: Arc<Vec<LocationWithDistance>>,
    pub position: Option<Coordinate>,
    /// Generation of the refresh that produced `locations` (0 = seeded).
    pub generation: u64,
}

#[derive(Debug)]
pub struct LocationBoard {
    tx: watch::Sender<BoardSnapshot>,
}

impl Default for LocationBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationBoard {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(BoardSnapshot::default());
        Self { tx }
    }

    /// Show cached locations before the first refresh lands.
    ///
    /// Ignored once any refresh has been applied.
    pub fn seed(&self, locations: Vec<Location>) {
        self.tx.send_if_modified(|snap| {
            if snap.generation > 0 {
                return false;
            }
            *snap = rebuild(Arc::new(locations), snap.position, 0);
            true
        });
    }

    /// Apply a refresh result tagged with its attempt generation.
    ///
    /// Returns `false` when the result is stale and was discarded.
    pub fn apply_refresh(&self, generation: u64, locations: Vec<Location>) -> bool {
        self.tx.send_if_modified(|snap| {
            if generation <= snap.generation {
                debug!(
                    generation,
                    current = snap.generation,
                    "discarding stale refresh result"
                );
                return false;
            }
            *snap = rebuild(Arc::new(locations), snap.position, generation);
            true
        })
    }

    /// Recompute distances for a new (or lost) position.
    pub fn update_position(&self, position: Option<Coordinate>) {
        self.tx.send_if_modified(|snap| {
            if snap.position == position {
                return false;
            }
            *snap = rebuild(Arc::clone(&snap.locations), position, snap.generation);
            true
        });
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<BoardSnapshot> {
        self.tx.subscribe()
    }

    pub fn position(&self) -> Option<Coordinate> {
        self.tx.borrow().position
    }

    /// Look up an entry by exact id, then by case-insensitive name.
    pub fn find(&self, query: &str) -> Option<LocationWithDistance> {
        let snap = self.tx.borrow();
        snap.entries
            .iter()
            .find(|e| e.access_point_id() == query)
            .or_else(|| {
                snap.entries
                    .iter()
                    .find(|e| e.name().eq_ignore_ascii_case(query))
            })
            .cloned()
    }
}

fn rebuild(
    locations: Arc<Vec<Location>>,
    position: Option<Coordinate>,
    generation: u64,
) -> BoardSnapshot {
    let entries = Arc::new(with_distances(&locations, position));
    BoardSnapshot {
        locations,
        entries,
        position,
        generation,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use clouddoor_api::Geolocation;

    fn location(id: &str, name: &str) -> Location {
        Location {
            id: id.into(),
            name: name.into(),
            geolocations: vec![Geolocation {
                id: format!("geo-{id}"),
                name: "Entrance".into(),
                latitude: 46.0,
                longitude: 14.5,
                radius: 100,
            }],
        }
    }

    fn here() -> Coordinate {
        Coordinate::new(46.0, 14.5).expect("coordinate")
    }

    #[test]
    fn starts_empty() {
        let board = LocationBoard::new();
        let snap = board.snapshot();
        assert!(snap.entries.is_empty());
        assert_eq!(snap.generation, 0);
        assert_eq!(snap.position, None);
    }

    #[test]
    fn newer_refresh_replaces_older() {
        let board = LocationBoard::new();
        assert!(board.apply_refresh(1, vec![location("a", "Office")]));
        assert!(board.apply_refresh(2, vec![location("b", "Garage")]));
        assert_eq!(board.snapshot().entries[0].access_point_id(), "b");
    }

    #[test]
    fn stale_refresh_is_discarded() {
        let board = LocationBoard::new();
        assert!(board.apply_refresh(2, vec![location("b", "Garage")]));
        assert!(!board.apply_refresh(1, vec![location("a", "Office")]));

        let snap = board.snapshot();
        assert_eq!(snap.generation, 2);
        assert_eq!(snap.entries[0].access_point_id(), "b");
    }

    #[test]
    fn seed_only_applies_before_first_refresh() {
        let board = LocationBoard::new();
        board.seed(vec![location("cached", "Cached")]);
        assert_eq!(board.snapshot().entries.len(), 1);

        board.apply_refresh(1, Vec::new());
        board.seed(vec![location("late", "Late")]);
        assert!(board.snapshot().entries.is_empty());
    }

    #[test]
    fn position_change_recomputes_distances() {
        let board = LocationBoard::new();
        board.apply_refresh(1, vec![location("a", "Office")]);
        assert_eq!(board.snapshot().entries[0].distance_meters, None);

        board.update_position(Some(here()));
        assert_eq!(board.snapshot().entries[0].distance_meters, Some(0));
        assert_eq!(board.position(), Some(here()));

        board.update_position(None);
        assert_eq!(board.snapshot().entries[0].distance_meters, None);
    }

    #[test]
    fn position_survives_refresh() {
        let board = LocationBoard::new();
        board.update_position(Some(here()));
        board.apply_refresh(1, vec![location("a", "Office")]);
        assert_eq!(board.snapshot().entries[0].distance_meters, Some(0));
    }

    #[test]
    fn find_by_id_then_name() {
        let board = LocationBoard::new();
        board.apply_refresh(
            1,
            vec![location("office", "Garage"), location("g-1", "Office")],
        );

        assert_eq!(
            board.find("office").map(|e| e.name().to_owned()),
            Some("Garage".to_owned())
        );
        assert_eq!(
            board.find("OFFICE").map(|e| e.access_point_id().to_owned()),
            Some("g-1".to_owned())
        );
        assert!(board.find("nowhere").is_none());
    }

    #[tokio::test]
    async fn subscribers_are_notified() {
        let board = LocationBoard::new();
        let mut rx = board.subscribe();
        board.apply_refresh(1, vec![location("a", "Office")]);
        rx.changed().await.expect("sender alive");
        assert_eq!(rx.borrow_and_update().entries.len(), 1);
    }
}
