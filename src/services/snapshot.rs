//! Projection of the authoritative session document into the full-state
//! snapshot every subscriber receives, and the broadcast that delivers it.

use tracing::warn;

use crate::{
    dto::{session::SessionSnapshot, sse::ServerEvent},
    state::SessionHandle,
};

/// SSE event name carried by every snapshot.
pub const EVENT_SNAPSHOT: &str = "session.snapshot";

/// Project the current session document into a snapshot.
pub async fn current_snapshot(handle: &SessionHandle) -> SessionSnapshot {
    handle.with_session(|session| SessionSnapshot::from(session)).await
}

/// Broadcast one full snapshot of the session to every subscriber.
///
/// Called after every accepted mutation; delivery errors (no subscribers,
/// lagged receivers) are deliberately ignored.
pub async fn broadcast_session(handle: &SessionHandle) {
    let snapshot = current_snapshot(handle).await;
    send_snapshot(handle, &snapshot);
}

/// Wrap a snapshot into a server event, logging serialization failures.
pub fn snapshot_event(snapshot: &SessionSnapshot) -> Option<ServerEvent> {
    match ServerEvent::json(Some(EVENT_SNAPSHOT.to_string()), snapshot) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(error = %err, "failed to serialize session snapshot");
            None
        }
    }
}

fn send_snapshot(handle: &SessionHandle, snapshot: &SessionSnapshot) {
    if let Some(event) = snapshot_event(snapshot) {
        handle.hub.broadcast(event);
    }
}
