use std::collections::BTreeSet;

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::{
        epoch_ms, format_system_time,
        ranking::{LeaderboardEntry, PodiumSlotDto},
    },
    question::{CandidateAnswer, Question, QuestionKind},
    ranking,
    state::{
        SessionStatus,
        session::{ModerationState, Player, PlayerAnswer, Session},
    },
};

/// Complete projection of a session document, delivered on every change.
///
/// There is no diff or event channel: clients recompute all derived view
/// state (answered-yet, time remaining, standings) from each snapshot.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionSnapshot {
    /// Join code of the game.
    pub game_id: String,
    /// Quiz title from the definition.
    pub title: String,
    /// Identifier of the controlling host.
    pub host_id: Uuid,
    /// Lifecycle status.
    pub status: SessionStatus,
    /// Cursor into the question list.
    pub current_question_index: usize,
    /// Countdown anchor in epoch milliseconds; clients derive remaining time
    /// from it rather than decrementing a local counter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_started_at_ms: Option<u64>,
    /// Remaining milliseconds captured while paused.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused_remaining_ms: Option<u64>,
    /// Whether the per-question results view is shown.
    pub show_results: bool,
    /// Whether the intermediate leaderboard view is shown.
    pub show_leaderboard: bool,
    /// Set during a full restart; clients must exit the moment they see it.
    pub restart_signal: bool,
    /// The live question, without its correct answers. Present outside the
    /// lobby while the cursor is in range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionSnapshot>,
    /// Correct answers for the live question, present only while the results
    /// view is shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<SolutionSnapshot>,
    /// Standings, present while the leaderboard view is shown or once the
    /// session is finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaderboard: Option<Vec<LeaderboardEntry>>,
    /// Podium slots in ceremony reveal order, present once finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub podium: Option<Vec<PodiumSlotDto>>,
    /// Every player subtree of the session document.
    pub players: Vec<PlayerSnapshot>,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Last accepted mutation (RFC 3339).
    pub updated_at: String,
}

/// Player-safe projection of a question: options without the answer key.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionSnapshot {
    /// Question identifier.
    pub id: Uuid,
    /// Prompt text.
    pub text: String,
    /// Base points at stake.
    pub points: u32,
    /// Answer window in seconds.
    pub time_limit_secs: u32,
    /// Question type and displayed options.
    #[serde(flatten)]
    pub kind: QuestionKindSnapshot,
}

/// Question type tag with only the displayable parts of each variant.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKindSnapshot {
    /// One option is correct.
    SingleChoice {
        /// Displayed answer options.
        options: Vec<String>,
    },
    /// Several options are correct.
    MultiSelect {
        /// Displayed answer options.
        options: Vec<String>,
    },
    /// Boolean statement.
    TrueFalse,
    /// Free-form text entry.
    FreeText,
}

/// Correct answers of the live question, revealed with the results view.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SolutionSnapshot {
    /// Correct option index.
    SingleChoice {
        /// Index into the options list.
        correct: usize,
    },
    /// Exact correct index set.
    MultiSelect {
        /// Indices into the options list.
        correct: BTreeSet<usize>,
    },
    /// The statement's truth value.
    TrueFalse {
        /// Whether the statement is true.
        correct: bool,
    },
    /// Accepted spellings.
    FreeText {
        /// All accepted answers.
        accepted: Vec<String>,
    },
}

/// Public projection of a player subtree.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerSnapshot {
    /// Player identifier.
    pub id: Uuid,
    /// Display name.
    pub nickname: String,
    /// Avatar.
    pub avatar: String,
    /// Current score.
    pub score: u32,
    /// Connectivity flag.
    pub connected: bool,
    /// Chat restriction flag.
    pub muted: bool,
    /// Warning count.
    pub warnings: u32,
    /// Whether the host has kicked this player.
    pub kicked: bool,
    /// Reason recorded with the kick.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kick_reason: Option<String>,
    /// Recorded answers, one per answered question.
    pub answers: Vec<PlayerAnswerSnapshot>,
}

/// Projection of one recorded answer.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerAnswerSnapshot {
    /// Question the answer belongs to.
    pub question_id: Uuid,
    /// The submitted candidate.
    pub answer: CandidateAnswer,
    /// Milliseconds between the anchor and the submission.
    pub time_spent_ms: u64,
    /// Validator verdict.
    pub correct: bool,
    /// Awarded points.
    pub points: u32,
    /// Server receive time (RFC 3339).
    pub submitted_at: String,
}

impl From<&Question> for QuestionSnapshot {
    fn from(question: &Question) -> Self {
        let kind = match &question.kind {
            QuestionKind::SingleChoice { options, .. } => QuestionKindSnapshot::SingleChoice {
                options: options.clone(),
            },
            QuestionKind::MultiSelect { options, .. } => QuestionKindSnapshot::MultiSelect {
                options: options.clone(),
            },
            QuestionKind::TrueFalse { .. } => QuestionKindSnapshot::TrueFalse,
            QuestionKind::FreeText { .. } => QuestionKindSnapshot::FreeText,
        };
        Self {
            id: question.id,
            text: question.text.clone(),
            points: question.points,
            time_limit_secs: question.time_limit_secs,
            kind,
        }
    }
}

impl From<&QuestionKind> for SolutionSnapshot {
    fn from(kind: &QuestionKind) -> Self {
        match kind {
            QuestionKind::SingleChoice { correct, .. } => SolutionSnapshot::SingleChoice {
                correct: *correct,
            },
            QuestionKind::MultiSelect { correct, .. } => SolutionSnapshot::MultiSelect {
                correct: correct.clone(),
            },
            QuestionKind::TrueFalse { correct } => SolutionSnapshot::TrueFalse { correct: *correct },
            QuestionKind::FreeText { accepted } => SolutionSnapshot::FreeText {
                accepted: accepted.clone(),
            },
        }
    }
}

impl From<(Uuid, &Player)> for PlayerSnapshot {
    fn from((id, player): (Uuid, &Player)) -> Self {
        let (kicked, kick_reason) = match &player.moderation {
            ModerationState::Active => (false, None),
            ModerationState::KickedPendingRemoval { reason } => (true, Some(reason.clone())),
        };
        Self {
            id,
            nickname: player.nickname.clone(),
            avatar: player.avatar.clone(),
            score: player.score,
            connected: player.connected,
            muted: player.muted,
            warnings: player.warnings,
            kicked,
            kick_reason,
            answers: player.answers.iter().map(Into::into).collect(),
        }
    }
}

impl From<&PlayerAnswer> for PlayerAnswerSnapshot {
    fn from(answer: &PlayerAnswer) -> Self {
        Self {
            question_id: answer.question_id,
            answer: answer.answer.clone(),
            time_spent_ms: answer.time_spent_ms,
            correct: answer.correct,
            points: answer.points,
            submitted_at: format_system_time(answer.submitted_at),
        }
    }
}

impl From<&Session> for SessionSnapshot {
    fn from(session: &Session) -> Self {
        let in_lobby = matches!(
            session.status(),
            SessionStatus::Waiting | SessionStatus::Restarting
        );
        let question = if in_lobby {
            None
        } else {
            session.current_question().map(Into::into)
        };
        let solution = if session.show_results {
            session
                .current_question()
                .map(|question| (&question.kind).into())
        } else {
            None
        };

        let finished = session.status() == SessionStatus::Finished;
        let leaderboard = if session.show_leaderboard || finished {
            Some(
                ranking::leaderboard(&session.players)
                    .into_iter()
                    .map(Into::into)
                    .collect(),
            )
        } else {
            None
        };
        let podium = if finished {
            let slots = ranking::podium(&session.players);
            Some(
                ranking::reveal_order(&slots)
                    .cloned()
                    .map(Into::into)
                    .collect(),
            )
        } else {
            None
        };

        Self {
            game_id: session.game_id.clone(),
            title: session.definition.title.clone(),
            host_id: session.host_id,
            status: session.status(),
            current_question_index: session.current_question_index,
            question_started_at_ms: session.question_started_at.map(epoch_ms),
            paused_remaining_ms: session
                .paused_remaining
                .map(|remaining| remaining.as_millis() as u64),
            show_results: session.show_results,
            show_leaderboard: session.show_leaderboard,
            restart_signal: session.restart_signal,
            question,
            solution,
            leaderboard,
            podium,
            players: session
                .players
                .iter()
                .map(|(id, player)| (*id, player).into())
                .collect(),
            created_at: format_system_time(session.created_at),
            updated_at: format_system_time(session.updated_at),
        }
    }
}
