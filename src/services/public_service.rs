//! Read-only views over a live session, for clients that poll instead of
//! subscribing to the snapshot stream.

use crate::{
    dto::{
        ranking::{LeaderboardResponse, PodiumResponse, PodiumSlotDto},
        session::SessionSnapshot,
    },
    error::ServiceError,
    ranking,
    services::{session_service::require_session, snapshot},
    state::{SessionStatus, SharedState},
};

/// Current full snapshot of the session, identical to what the stream
/// delivers.
pub async fn session_snapshot(
    state: &SharedState,
    game_id: &str,
) -> Result<SessionSnapshot, ServiceError> {
    let handle = require_session(state, game_id)?;
    Ok(snapshot::current_snapshot(&handle).await)
}

/// Current standings, regardless of whether the leaderboard view is shown.
pub async fn leaderboard(
    state: &SharedState,
    game_id: &str,
) -> Result<LeaderboardResponse, ServiceError> {
    let handle = require_session(state, game_id)?;
    let entries = handle
        .with_session(|session| ranking::leaderboard(&session.players))
        .await;
    Ok(LeaderboardResponse {
        entries: entries.into_iter().map(Into::into).collect(),
    })
}

/// Final podium in ceremony reveal order. Only available once the session
/// is finished.
pub async fn podium(state: &SharedState, game_id: &str) -> Result<PodiumResponse, ServiceError> {
    let handle = require_session(state, game_id)?;
    handle
        .with_session(|session| {
            if session.status() != SessionStatus::Finished {
                return Err(ServiceError::InvalidState(
                    "the podium is only available once the session is finished".into(),
                ));
            }
            let slots = ranking::podium(&session.players);
            Ok(PodiumResponse {
                slots: ranking::reveal_order(&slots)
                    .cloned()
                    .map(PodiumSlotDto::from)
                    .collect(),
            })
        })
        .await
}
