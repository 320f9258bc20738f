//! Business logic behind the host-facing lifecycle routes. Every command is
//! serialized through the session's command gate, validated against the
//! state machine, applied under the write lock, and followed by one full
//! snapshot broadcast.

use std::{sync::Arc, time::SystemTime};

use tokio::time::sleep;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::{
        requests::{ActionResponse, RegisterGameResponse},
        session::SessionSnapshot,
    },
    error::ServiceError,
    question::{GameDefinition, Question},
    services::snapshot::broadcast_session,
    state::{SessionCommand, SessionHandle, SharedState, session::Session},
};

/// Look up the live session for `game_id` or fail with not-found.
pub(crate) fn require_session(
    state: &SharedState,
    game_id: &str,
) -> Result<Arc<SessionHandle>, ServiceError> {
    state
        .session(game_id)
        .ok_or_else(|| ServiceError::NotFound(format!("no session for game `{game_id}`")))
}

/// Run a host command against the session document and broadcast the result.
///
/// The gate guarantees two host commands never interleave their
/// validate/apply/mutate sequence; player writes only contend on the inner
/// write lock.
async fn host_command<T>(
    state: &SharedState,
    game_id: &str,
    work: impl FnOnce(&mut Session) -> Result<T, ServiceError>,
) -> Result<T, ServiceError> {
    let handle = require_session(state, game_id)?;
    let _gate = handle.command_gate.lock().await;
    let result = handle.with_session_mut(work).await?;
    broadcast_session(&handle).await;
    Ok(result)
}

/// Register (or replace) a game definition under a join code.
///
/// Replacing a definition never touches a live session: sessions hold their
/// own `Arc` to the definition they started with.
pub fn register_game(
    state: &SharedState,
    game_id: &str,
    title: String,
    questions: Vec<Question>,
) -> Result<RegisterGameResponse, ServiceError> {
    if questions.is_empty() {
        return Err(ServiceError::InvalidInput(
            "a game needs at least one question".into(),
        ));
    }
    for (position, question) in questions.iter().enumerate() {
        question
            .check()
            .map_err(|cause| ServiceError::InvalidInput(format!("question {position}: {cause}")))?;
    }

    let definition = GameDefinition {
        id: game_id.to_string(),
        title,
        questions,
    };
    let question_count = definition.questions.len();
    state.register_definition(definition);
    info!(game_id, question_count, "game definition registered");

    Ok(RegisterGameResponse {
        game_id: game_id.to_string(),
        question_count,
    })
}

/// Create a fresh lobby session for a registered game.
pub async fn create_session(
    state: &SharedState,
    game_id: &str,
    host_id: Uuid,
) -> Result<SessionSnapshot, ServiceError> {
    let definition = state.definition(game_id).ok_or_else(|| {
        ServiceError::NotFound(format!("game `{game_id}` is not registered"))
    })?;

    let handle = state
        .create_session(game_id, host_id, definition)
        .ok_or_else(|| {
            ServiceError::Conflict(format!("a session for game `{game_id}` already exists"))
        })?;

    info!(game_id, %host_id, "session created");
    broadcast_session(&handle).await;
    Ok(handle
        .with_session(|session| SessionSnapshot::from(session))
        .await)
}

/// Tear down a live session entirely, dropping its document and hub.
///
/// Subscribers see their stream end when the hub is dropped; the game
/// definition stays registered, so a new session can be created right away.
pub fn close_session(state: &SharedState, game_id: &str) -> Result<ActionResponse, ServiceError> {
    if !state.remove_session(game_id) {
        return Err(ServiceError::NotFound(format!("no session for game `{game_id}`")));
    }
    info!(game_id, "session closed");
    Ok(ActionResponse {
        message: "session closed".into(),
    })
}

/// Open the first question. Requires at least one connected player.
pub async fn start_game(state: &SharedState, game_id: &str) -> Result<ActionResponse, ServiceError> {
    host_command(state, game_id, |session| {
        if session.connected_player_count() == 0 {
            return Err(ServiceError::InvalidInput(
                "cannot start a game without at least one connected player".into(),
            ));
        }
        session.apply(SessionCommand::Start)?;
        session.open_question(0, SystemTime::now());
        Ok(ActionResponse {
            message: "started".into(),
        })
    })
    .await
}

/// Advance the question cursor, or finish the quiz when no question remains.
///
/// `index` lets the host jump explicitly (skipping a question); omitted, the
/// cursor moves one step forward. Any target at or past the end of the list
/// finishes the session instead of activating an out-of-range question.
pub async fn advance_question(
    state: &SharedState,
    game_id: &str,
    index: Option<usize>,
) -> Result<ActionResponse, ServiceError> {
    host_command(state, game_id, |session| {
        let target = index.unwrap_or(session.current_question_index + 1);
        if target < session.definition.questions.len() {
            session.apply(SessionCommand::NextQuestion)?;
            session.open_question(target, SystemTime::now());
            Ok(ActionResponse {
                message: format!("question {target} opened"),
            })
        } else {
            session.apply(SessionCommand::FinishQuiz)?;
            // The cursor sits one past the last question only in this
            // terminal state.
            session.current_question_index = session.definition.questions.len();
            session.question_started_at = None;
            session.paused_remaining = None;
            session.clear_reveal_flags();
            Ok(ActionResponse {
                message: "finished".into(),
            })
        }
    })
    .await
}

/// Suspend the countdown manually.
pub async fn pause_game(state: &SharedState, game_id: &str) -> Result<ActionResponse, ServiceError> {
    host_command(state, game_id, |session| {
        session.apply(SessionCommand::Pause)?;
        session.capture_remaining(SystemTime::now());
        Ok(ActionResponse {
            message: "paused".into(),
        })
    })
    .await
}

/// Resume a paused question with the remaining time it was paused at.
pub async fn resume_game(state: &SharedState, game_id: &str) -> Result<ActionResponse, ServiceError> {
    host_command(state, game_id, |session| {
        session.apply(SessionCommand::Resume)?;
        session.clear_reveal_flags();
        session.resume_countdown(SystemTime::now());
        Ok(ActionResponse {
            message: "resumed".into(),
        })
    })
    .await
}

/// Show per-question results; answers close because the session pauses.
pub async fn reveal_results(
    state: &SharedState,
    game_id: &str,
) -> Result<ActionResponse, ServiceError> {
    host_command(state, game_id, |session| {
        session.apply(SessionCommand::RevealResults)?;
        session.capture_remaining(SystemTime::now());
        session.show_results_view();
        Ok(ActionResponse {
            message: "results revealed".into(),
        })
    })
    .await
}

/// Show the intermediate leaderboard, replacing the results view.
pub async fn reveal_leaderboard(
    state: &SharedState,
    game_id: &str,
) -> Result<ActionResponse, ServiceError> {
    host_command(state, game_id, |session| {
        session.apply(SessionCommand::RevealLeaderboard)?;
        session.capture_remaining(SystemTime::now());
        session.show_leaderboard_view();
        Ok(ActionResponse {
            message: "leaderboard revealed".into(),
        })
    })
    .await
}

/// Force the session to finished from any running state.
pub async fn end_game(state: &SharedState, game_id: &str) -> Result<ActionResponse, ServiceError> {
    host_command(state, game_id, |session| {
        session.apply(SessionCommand::End)?;
        session.question_started_at = None;
        session.paused_remaining = None;
        session.clear_reveal_flags();
        Ok(ActionResponse {
            message: "ended".into(),
        })
    })
    .await
}

/// Soft restart: scores and answers reset, players stay attached.
pub async fn restart_game(
    state: &SharedState,
    game_id: &str,
) -> Result<ActionResponse, ServiceError> {
    host_command(state, game_id, |session| {
        session.apply(SessionCommand::Restart)?;
        session.soft_reset();
        Ok(ActionResponse {
            message: "restarted".into(),
        })
    })
    .await
}

/// Hard restart: broadcast the restart signal now, replace the session with
/// a fresh empty lobby after the configured grace delay.
///
/// The delay is a soft debounce window, not a transaction: clients must act
/// on `restart_signal` the moment they observe it, and may see the session
/// in a lame-duck state until the replacement lands.
pub async fn full_restart_game(
    state: &SharedState,
    game_id: &str,
) -> Result<ActionResponse, ServiceError> {
    let response = host_command(state, game_id, |session| {
        session.apply(SessionCommand::FullRestart)?;
        session.restart_signal = true;
        Ok(ActionResponse {
            message: "restart signalled".into(),
        })
    })
    .await?;

    let handle = require_session(state, game_id)?;
    let grace = state.config().full_restart_grace;
    let game_id = game_id.to_string();
    tokio::spawn(async move {
        sleep(grace).await;
        let _gate = handle.command_gate.lock().await;
        let reset = handle.with_session_mut(|session| session.hard_reset()).await;
        match reset {
            Ok(()) => info!(game_id, "session replaced after full restart"),
            Err(err) => {
                // Another restart cycle already moved the machine on.
                warn!(game_id, error = %err, "full restart reset skipped");
                return;
            }
        }
        broadcast_session(&handle).await;
    });

    Ok(response)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use uuid::Uuid;

    use super::*;
    use crate::{
        config::AppConfig,
        question::{Question, QuestionKind},
        services::player_service,
        state::{AppState, SessionStatus},
    };

    fn test_config(grace_ms: u64) -> AppConfig {
        AppConfig {
            kick_removal_grace: Duration::from_millis(grace_ms),
            full_restart_grace: Duration::from_millis(grace_ms),
            snapshot_capacity: 8,
            avatars: vec!["fox".into(), "owl".into(), "crow".into()],
        }
    }

    fn two_questions() -> Vec<Question> {
        vec![
            Question {
                id: Uuid::new_v4(),
                text: "2 + 2?".into(),
                points: 100,
                time_limit_secs: 30,
                kind: QuestionKind::SingleChoice {
                    options: vec!["3".into(), "4".into()],
                    correct: 1,
                },
            },
            Question {
                id: Uuid::new_v4(),
                text: "Water boils at 100C at sea level.".into(),
                points: 50,
                time_limit_secs: 20,
                kind: QuestionKind::TrueFalse { correct: true },
            },
        ]
    }

    async fn running_session(state: &SharedState, game_id: &str) -> Uuid {
        register_game(state, game_id, "Test quiz".into(), two_questions()).unwrap();
        create_session(state, game_id, Uuid::new_v4()).await.unwrap();
        let joined = player_service::join(state, game_id, "amelia".into(), None)
            .await
            .unwrap();
        joined.player_id
    }

    #[tokio::test]
    async fn start_requires_a_connected_player() {
        let state = AppState::new(test_config(5));
        register_game(&state, "g1", "Test quiz".into(), two_questions()).unwrap();
        create_session(&state, "g1", Uuid::new_v4()).await.unwrap();

        let err = start_game(&state, "g1").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn duplicate_session_creation_conflicts() {
        let state = AppState::new(test_config(5));
        register_game(&state, "g1", "Test quiz".into(), two_questions()).unwrap();
        create_session(&state, "g1", Uuid::new_v4()).await.unwrap();

        let err = create_session(&state, "g1", Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn advancing_past_the_last_question_finishes() {
        let state = AppState::new(test_config(5));
        running_session(&state, "g1").await;
        start_game(&state, "g1").await.unwrap();

        advance_question(&state, "g1", None).await.unwrap();
        advance_question(&state, "g1", None).await.unwrap();

        let handle = require_session(&state, "g1").unwrap();
        let status = handle.with_session(|session| session.status()).await;
        assert_eq!(status, SessionStatus::Finished);
    }

    #[tokio::test]
    async fn explicit_index_skips_ahead() {
        let state = AppState::new(test_config(5));
        running_session(&state, "g1").await;
        start_game(&state, "g1").await.unwrap();

        advance_question(&state, "g1", Some(1)).await.unwrap();

        let handle = require_session(&state, "g1").unwrap();
        let index = handle
            .with_session(|session| session.current_question_index)
            .await;
        assert_eq!(index, 1);
    }

    #[tokio::test]
    async fn soft_restart_keeps_players_and_zeroes_scores() {
        let state = AppState::new(test_config(5));
        let player_id = running_session(&state, "g1").await;
        start_game(&state, "g1").await.unwrap();
        end_game(&state, "g1").await.unwrap();
        restart_game(&state, "g1").await.unwrap();

        let handle = require_session(&state, "g1").unwrap();
        handle
            .with_session(|session| {
                assert_eq!(session.status(), SessionStatus::Waiting);
                let player = &session.players[&player_id];
                assert_eq!(player.score, 0);
                assert!(player.answers.is_empty());
            })
            .await;
    }

    #[tokio::test]
    async fn full_restart_drops_players_after_the_grace_delay() {
        let state = AppState::new(test_config(10));
        running_session(&state, "g1").await;
        full_restart_game(&state, "g1").await.unwrap();

        let handle = require_session(&state, "g1").unwrap();
        handle
            .with_session(|session| {
                assert_eq!(session.status(), SessionStatus::Restarting);
                assert!(session.restart_signal);
                assert_eq!(session.players.len(), 1);
            })
            .await;

        tokio::time::sleep(Duration::from_millis(100)).await;

        handle
            .with_session(|session| {
                assert_eq!(session.status(), SessionStatus::Waiting);
                assert!(!session.restart_signal);
                assert!(session.players.is_empty());
            })
            .await;
    }

    #[tokio::test]
    async fn closing_a_session_frees_the_game_for_a_new_one() {
        let state = AppState::new(test_config(5));
        running_session(&state, "g1").await;

        close_session(&state, "g1").unwrap();
        assert!(require_session(&state, "g1").is_err());

        let err = close_session(&state, "g1").unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        // The definition survives, so a fresh lobby can be opened.
        create_session(&state, "g1", Uuid::new_v4()).await.unwrap();
    }

    #[tokio::test]
    async fn registering_an_empty_game_is_rejected() {
        let state = AppState::new(test_config(5));
        let err = register_game(&state, "g1", "Empty".into(), Vec::new()).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn pause_and_resume_preserve_the_countdown() {
        let state = AppState::new(test_config(5));
        running_session(&state, "g1").await;
        start_game(&state, "g1").await.unwrap();

        pause_game(&state, "g1").await.unwrap();
        let handle = require_session(&state, "g1").unwrap();
        let paused = handle
            .with_session(|session| session.paused_remaining)
            .await
            .unwrap();
        assert!(paused <= Duration::from_secs(30));

        resume_game(&state, "g1").await.unwrap();
        handle
            .with_session(|session| {
                assert_eq!(session.status(), SessionStatus::Active);
                assert!(session.paused_remaining.is_none());
                assert!(session.question_started_at.is_some());
            })
            .await;
    }

    #[tokio::test]
    async fn reveal_views_are_mutually_exclusive() {
        let state = AppState::new(test_config(5));
        running_session(&state, "g1").await;
        start_game(&state, "g1").await.unwrap();

        reveal_results(&state, "g1").await.unwrap();
        let handle = require_session(&state, "g1").unwrap();
        handle
            .with_session(|session| {
                assert!(session.show_results);
                assert!(!session.show_leaderboard);
            })
            .await;

        reveal_leaderboard(&state, "g1").await.unwrap();
        handle
            .with_session(|session| {
                assert!(!session.show_results);
                assert!(session.show_leaderboard);
            })
            .await;
    }
}
