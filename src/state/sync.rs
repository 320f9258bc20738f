use tokio::sync::broadcast;

use crate::dto::sse::ServerEvent;

/// Broadcast hub fanning out full session snapshots to subscribers.
///
/// Every accepted mutation pushes one complete snapshot; subscribers that
/// lag simply miss intermediate states and catch up on the next one, which
/// matches the coalescing contract clients are written against.
pub struct SnapshotHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SnapshotHub {
    /// Construct a hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent snapshots.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all current subscribers, ignoring delivery errors.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }
}
