// ── Live-position feed ──
//
// The device position is produced outside the core (GPS, an OS location
// service, a command-line flag). The core only reads the latest value or
// subscribes to changes.

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::geo::Coordinate;

/// A source of the device's last-known position.
pub trait PositionFeed: Send + Sync {
    /// The latest position, or `None` if it is not known.
    fn current(&self) -> Option<Coordinate>;
}

/// A fixed position (or a fixed "unknown").
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StaticPosition(pub Option<Coordinate>);

impl PositionFeed for StaticPosition {
    fn current(&self) -> Option<Coordinate> {
        self.0
    }
}

/// Push-based feed backed by a `watch` channel.
///
/// Producers call [`publish`](Self::publish); consumers either read
/// [`current`](PositionFeed::current), hold a receiver, or iterate a stream.
#[derive(Debug)]
pub struct PositionWatch {
    tx: watch::Sender<Option<Coordinate>>,
}

impl Default for PositionWatch {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionWatch {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Replace the current position. `None` means the fix was lost.
    pub fn publish(&self, position: Option<Coordinate>) {
        self.tx.send_replace(position);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Coordinate>> {
        self.tx.subscribe()
    }

    /// Stream of positions, starting with the current one.
    pub fn stream(&self) -> WatchStream<Option<Coordinate>> {
        WatchStream::new(self.tx.subscribe())
    }
}

impl PositionFeed for PositionWatch {
    fn current(&self) -> Option<Coordinate> {
        *self.tx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use tokio_stream::StreamExt;

    use super::*;

    fn at(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate::new(latitude, longitude).expect("valid test coordinate")
    }

    #[test]
    fn static_position_returns_its_value() {
        assert_eq!(StaticPosition(None).current(), None);
        assert_eq!(StaticPosition(Some(at(1.0, 2.0))).current(), Some(at(1.0, 2.0)));
    }

    #[test]
    fn watch_starts_unknown_and_tracks_latest() {
        let feed = PositionWatch::new();
        assert_eq!(feed.current(), None);

        feed.publish(Some(at(46.0, 14.5)));
        assert_eq!(feed.current(), Some(at(46.0, 14.5)));

        feed.publish(None);
        assert_eq!(feed.current(), None);
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let feed = PositionWatch::new();
        let mut rx = feed.subscribe();

        feed.publish(Some(at(10.0, 20.0)));
        rx.changed().await.expect("sender alive");
        assert_eq!(*rx.borrow_and_update(), Some(at(10.0, 20.0)));
    }

    #[tokio::test]
    async fn stream_yields_current_value_first() {
        let feed = PositionWatch::new();
        feed.publish(Some(at(5.0, 5.0)));

        let mut stream = feed.stream();
        assert_eq!(stream.next().await, Some(Some(at(5.0, 5.0))));
    }
}
