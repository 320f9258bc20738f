//! Player-facing writes: joining the lobby, submitting answers, and
//! flipping the connectivity flag. Each accepted write broadcasts a full
//! snapshot, same as every host command.

use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;

use crate::{
    dto::requests::{JoinResponse, SubmitAnswerResponse},
    error::ServiceError,
    question::CandidateAnswer,
    scoring, timing,
    services::{session_service::require_session, snapshot::broadcast_session},
    state::{SessionStatus, SharedState},
    state::session::{Player, PlayerAnswer},
};

/// Join the lobby of a live session.
///
/// Joining is only open while the session is waiting; once the first
/// question opens, the roster is frozen. When no avatar is supplied one is
/// assigned from the configured set, avoiding avatars already in use.
pub async fn join(
    state: &SharedState,
    game_id: &str,
    nickname: String,
    avatar: Option<String>,
) -> Result<JoinResponse, ServiceError> {
    let handle = require_session(state, game_id)?;
    let config = state.config();

    let response = handle
        .with_session_mut(|session| {
            if session.status() != SessionStatus::Waiting {
                return Err(ServiceError::InvalidState(
                    "players can only join while the session is waiting".into(),
                ));
            }

            let avatar = avatar.unwrap_or_else(|| {
                let used: Vec<&str> = session
                    .players
                    .values()
                    .map(|player| player.avatar.as_str())
                    .collect();
                config.pick_avatar(&used)
            });

            let player_id = Uuid::new_v4();
            session
                .players
                .insert(player_id, Player::new(nickname, avatar.clone()));
            session.touch();
            Ok(JoinResponse { player_id, avatar })
        })
        .await?;

    info!(game_id, player_id = %response.player_id, "player joined");
    broadcast_session(&handle).await;
    Ok(response)
}

/// Record a candidate answer for the live question.
///
/// The answer window is open exactly while the session is active: a paused
/// or revealing session rejects submissions, and at most one answer per
/// player per question is ever recorded. The verdict and award are computed
/// once, at submission time, and never revised.
pub async fn submit_answer(
    state: &SharedState,
    game_id: &str,
    player_id: Uuid,
    answer: CandidateAnswer,
) -> Result<SubmitAnswerResponse, ServiceError> {
    let handle = require_session(state, game_id)?;
    let now = SystemTime::now();

    let response = handle
        .with_session_mut(|session| {
            if session.status() != SessionStatus::Active {
                return Err(ServiceError::InvalidState(
                    "answers are only accepted while a question is active".into(),
                ));
            }
            let question = session
                .current_question()
                .cloned()
                .ok_or_else(|| ServiceError::InvalidState("no question is open".into()))?;
            let anchor = session
                .question_started_at
                .ok_or_else(|| ServiceError::InvalidState("no question is open".into()))?;

            {
                let player = session
                    .players
                    .get(&player_id)
                    .ok_or_else(|| ServiceError::NotFound(format!("unknown player {player_id}")))?;
                if player.is_kicked() {
                    return Err(ServiceError::Forbidden(
                        "kicked players cannot submit answers".into(),
                    ));
                }
            }

            let time_spent_ms = timing::elapsed_ms(now, anchor);
            let correct = question.is_correct(&answer);
            let points = scoring::award_points(correct, time_spent_ms, question.points, question.time_limit_secs);

            let record = PlayerAnswer {
                question_id: question.id,
                answer,
                time_spent_ms,
                correct,
                points,
                submitted_at: now,
            };

            let player = session
                .players
                .get_mut(&player_id)
                .ok_or_else(|| ServiceError::NotFound(format!("unknown player {player_id}")))?;
            if !player.record_answer(record) {
                return Err(ServiceError::Conflict(
                    "an answer for this question was already recorded".into(),
                ));
            }
            let score = player.score;
            session.touch();

            Ok(SubmitAnswerResponse {
                question_id: question.id,
                correct,
                points,
                score,
            })
        })
        .await?;

    broadcast_session(&handle).await;
    Ok(response)
}

/// Flip a player's connectivity flag.
///
/// Disconnecting hides the player from the leaderboard but keeps their
/// record, score included, for when they come back. Kicked players are
/// locked out of this write like every other.
pub async fn set_presence(
    state: &SharedState,
    game_id: &str,
    player_id: Uuid,
    connected: bool,
) -> Result<(), ServiceError> {
    let handle = require_session(state, game_id)?;

    handle
        .with_session_mut(|session| {
            let player = session
                .players
                .get_mut(&player_id)
                .ok_or_else(|| ServiceError::NotFound(format!("unknown player {player_id}")))?;
            if player.is_kicked() {
                return Err(ServiceError::Forbidden(
                    "kicked players cannot change presence".into(),
                ));
            }
            player.connected = connected;
            session.touch();
            Ok(())
        })
        .await?;

    broadcast_session(&handle).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        config::AppConfig,
        question::{Question, QuestionKind},
        services::session_service,
        state::AppState,
    };

    fn test_config() -> AppConfig {
        AppConfig {
            kick_removal_grace: Duration::from_millis(5),
            full_restart_grace: Duration::from_millis(5),
            snapshot_capacity: 8,
            avatars: vec!["fox".into(), "owl".into()],
        }
    }

    fn one_question() -> Vec<Question> {
        vec![Question {
            id: Uuid::new_v4(),
            text: "2 + 2?".into(),
            points: 100,
            time_limit_secs: 30,
            kind: QuestionKind::SingleChoice {
                options: vec!["3".into(), "4".into()],
                correct: 1,
            },
        }]
    }

    async fn lobby(state: &SharedState, game_id: &str) {
        session_service::register_game(state, game_id, "Test quiz".into(), one_question()).unwrap();
        session_service::create_session(state, game_id, Uuid::new_v4())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn joining_assigns_an_unused_avatar() {
        let state = AppState::new(test_config());
        lobby(&state, "g1").await;

        let first = join(&state, "g1", "amelia".into(), None).await.unwrap();
        let second = join(&state, "g1", "bruno".into(), None).await.unwrap();
        assert_ne!(first.avatar, second.avatar);
    }

    #[tokio::test]
    async fn joining_after_start_is_rejected() {
        let state = AppState::new(test_config());
        lobby(&state, "g1").await;
        join(&state, "g1", "amelia".into(), None).await.unwrap();
        session_service::start_game(&state, "g1").await.unwrap();

        let err = join(&state, "g1", "late".into(), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn correct_answer_scores_and_updates_the_total() {
        let state = AppState::new(test_config());
        lobby(&state, "g1").await;
        let player = join(&state, "g1", "amelia".into(), None).await.unwrap();
        session_service::start_game(&state, "g1").await.unwrap();

        let receipt = submit_answer(
            &state,
            "g1",
            player.player_id,
            CandidateAnswer::Choice { index: 1 },
        )
        .await
        .unwrap();

        assert!(receipt.correct);
        // Submitted well inside the instant window, so the full base award.
        assert_eq!(receipt.points, 100);
        assert_eq!(receipt.score, 100);
    }

    #[tokio::test]
    async fn wrong_answer_scores_zero_but_is_recorded() {
        let state = AppState::new(test_config());
        lobby(&state, "g1").await;
        let player = join(&state, "g1", "amelia".into(), None).await.unwrap();
        session_service::start_game(&state, "g1").await.unwrap();

        let receipt = submit_answer(
            &state,
            "g1",
            player.player_id,
            CandidateAnswer::Choice { index: 0 },
        )
        .await
        .unwrap();
        assert!(!receipt.correct);
        assert_eq!(receipt.points, 0);

        let handle =
            crate::services::session_service::require_session(&state, "g1").unwrap();
        let recorded = handle
            .with_session(|session| session.players[&player.player_id].answers.len())
            .await;
        assert_eq!(recorded, 1);
    }

    #[tokio::test]
    async fn duplicate_submission_is_rejected_without_double_counting() {
        let state = AppState::new(test_config());
        lobby(&state, "g1").await;
        let player = join(&state, "g1", "amelia".into(), None).await.unwrap();
        session_service::start_game(&state, "g1").await.unwrap();

        submit_answer(
            &state,
            "g1",
            player.player_id,
            CandidateAnswer::Choice { index: 1 },
        )
        .await
        .unwrap();
        let err = submit_answer(
            &state,
            "g1",
            player.player_id,
            CandidateAnswer::Choice { index: 1 },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let handle =
            crate::services::session_service::require_session(&state, "g1").unwrap();
        handle
            .with_session(|session| {
                let record = &session.players[&player.player_id];
                assert_eq!(record.answers.len(), 1);
                assert_eq!(record.score, 100);
            })
            .await;
    }

    #[tokio::test]
    async fn answers_are_closed_while_paused() {
        let state = AppState::new(test_config());
        lobby(&state, "g1").await;
        let player = join(&state, "g1", "amelia".into(), None).await.unwrap();
        session_service::start_game(&state, "g1").await.unwrap();
        session_service::pause_game(&state, "g1").await.unwrap();

        let err = submit_answer(
            &state,
            "g1",
            player.player_id,
            CandidateAnswer::Choice { index: 1 },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn empty_submission_occupies_the_answer_slot() {
        let state = AppState::new(test_config());
        lobby(&state, "g1").await;
        let player = join(&state, "g1", "amelia".into(), None).await.unwrap();
        session_service::start_game(&state, "g1").await.unwrap();

        let receipt = submit_answer(&state, "g1", player.player_id, CandidateAnswer::Empty)
            .await
            .unwrap();
        assert!(!receipt.correct);
        assert_eq!(receipt.points, 0);

        let err = submit_answer(
            &state,
            "g1",
            player.player_id,
            CandidateAnswer::Choice { index: 1 },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn disconnecting_keeps_the_player_record() {
        let state = AppState::new(test_config());
        lobby(&state, "g1").await;
        let player = join(&state, "g1", "amelia".into(), None).await.unwrap();

        set_presence(&state, "g1", player.player_id, false)
            .await
            .unwrap();

        let handle =
            crate::services::session_service::require_session(&state, "g1").unwrap();
        handle
            .with_session(|session| {
                let record = &session.players[&player.player_id];
                assert!(!record.connected);
            })
            .await;
    }
}
