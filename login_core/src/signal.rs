use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// How many values a slow subscriber can fall behind before it starts missing
/// some. Login screens don't produce many events, so this is plenty.
const CAPACITY: usize = 32;

/// A live stream of values that any number of subscribers can follow. New
/// subscribers see values published after they subscribe; there's no replay.
///
/// A subscriber that falls more than a few dozen values behind gets
/// `RecvError::Lagged` and misses the oldest ones. `latest` always has the
/// most recent value, so laggards can catch up on current state.
#[derive(Debug)]
pub struct Signal<T> {
    tx: broadcast::Sender<T>,

    /// Most recently published value, if anything has been published.
    latest: Arc<watch::Sender<Option<T>>>,
}

impl<T: Clone> Signal<T> {
    /// Create a signal with nobody listening yet.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CAPACITY);
        let (latest, _) = watch::channel(None);

        Self {
            tx,
            latest: Arc::new(latest),
        }
    }

    /// Start following this signal.
    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.tx.subscribe()
    }

    /// The most recently published value, regardless of who has seen it.
    pub fn latest(&self) -> Option<T> {
        self.latest.borrow().clone()
    }

    /// Send a value to everyone currently subscribed. Only the pipeline gets
    /// to do this.
    pub(crate) fn publish(&self, value: T) {
        self.latest.send_replace(Some(value.clone()));

        // Nobody listening is not a problem; the value just goes nowhere.
        let _ = self.tx.send(value);
    }
}

impl<T: Clone> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            latest: Arc::clone(&self.latest),
        }
    }
}
