//! Host moderation of players: warnings, muting, and the two-phase kick.

use tokio::time::sleep;
use tracing::info;
use uuid::Uuid;

use crate::{
    dto::requests::ActionResponse,
    error::ServiceError,
    services::{session_service::require_session, snapshot::broadcast_session},
    state::{SharedState, session::ModerationState},
};

/// Kick a player: flag them immediately, remove the record after a grace
/// delay.
///
/// Phase one lands in the same snapshot broadcast as any other write, so
/// the kicked client learns its fate (and the reason) right away while the
/// rest of the room still sees the greyed-out entry. Phase two runs on a
/// detached task and physically drops the record; a player who rejoined a
/// restarted session under a new id in the meantime is unaffected because
/// removal targets the original id.
pub async fn kick_player(
    state: &SharedState,
    game_id: &str,
    player_id: Uuid,
    reason: String,
) -> Result<ActionResponse, ServiceError> {
    let handle = require_session(state, game_id)?;

    handle
        .with_session_mut(|session| {
            let player = session
                .players
                .get_mut(&player_id)
                .ok_or_else(|| ServiceError::NotFound(format!("unknown player {player_id}")))?;
            if player.is_kicked() {
                return Err(ServiceError::Conflict("player is already kicked".into()));
            }
            player.moderation = ModerationState::KickedPendingRemoval { reason };
            player.connected = false;
            session.touch();
            Ok(())
        })
        .await?;

    info!(game_id, %player_id, "player kicked, removal pending");
    broadcast_session(&handle).await;

    let grace = state.config().kick_removal_grace;
    let game_id = game_id.to_string();
    tokio::spawn(async move {
        sleep(grace).await;
        let removed = handle
            .with_session_mut(|session| {
                // Only the pending record is removed; a hard reset in the
                // meantime already dropped it.
                let pending = session
                    .players
                    .get(&player_id)
                    .is_some_and(|player| player.is_kicked());
                if pending {
                    session.players.shift_remove(&player_id);
                    session.touch();
                }
                pending
            })
            .await;
        if removed {
            info!(game_id, %player_id, "kicked player removed");
            broadcast_session(&handle).await;
        }
    });

    Ok(ActionResponse {
        message: "player kicked".into(),
    })
}

/// Set or clear a player's mute flag.
pub async fn set_muted(
    state: &SharedState,
    game_id: &str,
    player_id: Uuid,
    muted: bool,
) -> Result<ActionResponse, ServiceError> {
    let handle = require_session(state, game_id)?;

    handle
        .with_session_mut(|session| {
            let player = session
                .players
                .get_mut(&player_id)
                .ok_or_else(|| ServiceError::NotFound(format!("unknown player {player_id}")))?;
            player.muted = muted;
            session.touch();
            Ok::<_, ServiceError>(())
        })
        .await?;

    broadcast_session(&handle).await;
    Ok(ActionResponse {
        message: if muted { "player muted" } else { "player unmuted" }.into(),
    })
}

/// Issue a warning to a player. Warnings only accumulate; acting on them
/// (e.g. kicking after three) stays a host decision.
pub async fn warn_player(
    state: &SharedState,
    game_id: &str,
    player_id: Uuid,
) -> Result<ActionResponse, ServiceError> {
    let handle = require_session(state, game_id)?;

    let warnings = handle
        .with_session_mut(|session| {
            let player = session
                .players
                .get_mut(&player_id)
                .ok_or_else(|| ServiceError::NotFound(format!("unknown player {player_id}")))?;
            player.warnings += 1;
            let warnings = player.warnings;
            session.touch();
            Ok::<_, ServiceError>(warnings)
        })
        .await?;

    broadcast_session(&handle).await;
    Ok(ActionResponse {
        message: format!("warning {warnings} issued"),
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        config::AppConfig,
        question::{Question, QuestionKind},
        services::{player_service, session_service},
        state::AppState,
    };

    fn test_config() -> AppConfig {
        AppConfig {
            kick_removal_grace: Duration::from_millis(10),
            full_restart_grace: Duration::from_millis(10),
            snapshot_capacity: 8,
            avatars: vec!["fox".into(), "owl".into()],
        }
    }

    async fn lobby_with_player(state: &SharedState, game_id: &str) -> uuid::Uuid {
        let questions = vec![Question {
            id: uuid::Uuid::new_v4(),
            text: "q".into(),
            points: 10,
            time_limit_secs: 10,
            kind: QuestionKind::TrueFalse { correct: true },
        }];
        session_service::register_game(state, game_id, "Test".into(), questions).unwrap();
        session_service::create_session(state, game_id, uuid::Uuid::new_v4())
            .await
            .unwrap();
        player_service::join(state, game_id, "amelia".into(), None)
            .await
            .unwrap()
            .player_id
    }

    #[tokio::test]
    async fn kick_flags_immediately_and_removes_after_the_grace_delay() {
        let state = AppState::new(test_config());
        let player_id = lobby_with_player(&state, "g1").await;

        kick_player(&state, "g1", player_id, "spamming the chat".into())
            .await
            .unwrap();

        let handle =
            crate::services::session_service::require_session(&state, "g1").unwrap();
        handle
            .with_session(|session| {
                let record = &session.players[&player_id];
                assert!(record.is_kicked());
                assert!(!record.connected);
            })
            .await;

        tokio::time::sleep(Duration::from_millis(100)).await;

        let gone = handle
            .with_session(|session| !session.players.contains_key(&player_id))
            .await;
        assert!(gone);
    }

    #[tokio::test]
    async fn kicking_twice_conflicts() {
        let state = AppState::new(test_config());
        let player_id = lobby_with_player(&state, "g1").await;

        kick_player(&state, "g1", player_id, "first".into())
            .await
            .unwrap();
        let err = kick_player(&state, "g1", player_id, "second".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn kicked_players_cannot_change_presence() {
        let state = AppState::new(test_config());
        let player_id = lobby_with_player(&state, "g1").await;

        kick_player(&state, "g1", player_id, "cheating".into())
            .await
            .unwrap();
        let err = player_service::set_presence(&state, "g1", player_id, true)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn warnings_accumulate() {
        let state = AppState::new(test_config());
        let player_id = lobby_with_player(&state, "g1").await;

        warn_player(&state, "g1", player_id).await.unwrap();
        warn_player(&state, "g1", player_id).await.unwrap();

        let handle =
            crate::services::session_service::require_session(&state, "g1").unwrap();
        let warnings = handle
            .with_session(|session| session.players[&player_id].warnings)
            .await;
        assert_eq!(warnings, 2);
    }

    #[tokio::test]
    async fn mute_flag_round_trips() {
        let state = AppState::new(test_config());
        let player_id = lobby_with_player(&state, "g1").await;

        set_muted(&state, "g1", player_id, true).await.unwrap();
        let handle =
            crate::services::session_service::require_session(&state, "g1").unwrap();
        let muted = handle
            .with_session(|session| session.players[&player_id].muted)
            .await;
        assert!(muted);

        set_muted(&state, "g1", player_id, false).await.unwrap();
        let muted = handle
            .with_session(|session| session.players[&player_id].muted)
            .await;
        assert!(!muted);
    }
}
