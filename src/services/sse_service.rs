//! Per-session SSE plumbing: subscribe to the snapshot hub and adapt the
//! broadcast receiver into an axum SSE response.

use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;

use crate::{
    dto::sse::ServerEvent,
    error::ServiceError,
    services::{session_service::require_session, snapshot},
    state::SharedState,
};

/// Subscribe to a session's snapshot stream.
///
/// The returned receiver is primed with the current snapshot, so a freshly
/// connected client renders immediately instead of waiting for the next
/// mutation.
pub async fn subscribe(
    state: &SharedState,
    game_id: &str,
) -> Result<broadcast::Receiver<ServerEvent>, ServiceError> {
    let handle = require_session(state, game_id)?;
    let receiver = handle.hub.subscribe();
    let current = snapshot::current_snapshot(&handle).await;
    if let Some(event) = snapshot::snapshot_event(&current) {
        // Delivered to every subscriber; each treats it as the latest full
        // state, which it is.
        handle.hub.broadcast(event);
    }
    Ok(receiver)
}

/// Convert a broadcast receiver into an SSE response, forwarding snapshots
/// until the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    game_id: String,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    // forwarder task: reads from broadcast and pushes into mpsc
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            let mut event = Event::default().data(payload.data);
                            if let Some(name) = payload.event {
                                event = event.event(name);
                            }

                            if tx.send(Ok(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(_)) => {
                            // A lagged subscriber only missed intermediate
                            // snapshots; the next one is complete anyway.
                            continue;
                        }
                    }
                }
            }
        }

        info!(game_id, "snapshot stream disconnected");
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
