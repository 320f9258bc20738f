use std::time::{Duration, SystemTime};

use indexmap::IndexMap;
use uuid::Uuid;

use crate::{
    question::{CandidateAnswer, GameDefinition, Question},
    state::state_machine::{
        InvalidTransition, SessionCommand, SessionStateMachine, SessionStatus,
    },
    timing,
};
use std::sync::Arc;

/// One running instance of a game, shared by a host and its players.
///
/// The session is the root aggregate: host commands mutate its control
/// fields, each player mutates only their own entry in `players`, and every
/// accepted mutation is followed by a full-snapshot broadcast.
#[derive(Debug, Clone)]
pub struct Session {
    /// Join code of the game definition this session runs.
    pub game_id: String,
    /// Sole issuer of lifecycle commands.
    pub host_id: Uuid,
    /// Read-only quiz content the session walks through.
    pub definition: Arc<GameDefinition>,
    /// Lifecycle machine gating every status change.
    pub lifecycle: SessionStateMachine,
    /// Cursor into the definition's question list. Always a valid index, or
    /// equal to the question count only transiently while finishing.
    pub current_question_index: usize,
    /// Server-assigned anchor every client derives its countdown from.
    pub question_started_at: Option<SystemTime>,
    /// Remaining time captured when the session paused, so resuming
    /// continues the countdown instead of restarting it.
    pub paused_remaining: Option<Duration>,
    /// Gate for the per-question results view.
    pub show_results: bool,
    /// Gate for the intermediate leaderboard view.
    pub show_leaderboard: bool,
    /// Set the moment a full restart is accepted; authoritative for clients
    /// the instant they observe it, even before the session is replaced.
    pub restart_signal: bool,
    /// Participants keyed by player id.
    pub players: IndexMap<Uuid, Player>,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
    /// Last accepted mutation.
    pub updated_at: SystemTime,
}

/// A non-host participant and everything they own in the session document.
#[derive(Debug, Clone)]
pub struct Player {
    /// Display name chosen at join time, immutable thereafter.
    pub nickname: String,
    /// Avatar chosen or assigned at join time, immutable thereafter.
    pub avatar: String,
    /// Total score; grows only by scoring-engine outputs.
    pub score: u32,
    /// One entry at most per question id, immutable once written.
    pub answers: Vec<PlayerAnswer>,
    /// Whether the player's client currently holds a live subscription.
    pub connected: bool,
    /// Chat restriction flag; chat itself is another service's concern.
    pub muted: bool,
    /// Number of moderation warnings issued by the host.
    pub warnings: u32,
    /// Two-phase kick sub-state (removal happens after a grace delay).
    pub moderation: ModerationState,
}

/// Moderation sub-machine for a player.
///
/// `active → kicked-pending-removal → removed`, where removal means the
/// player record is physically gone from the session. Modelling the pending
/// phase explicitly lets clients (and tests) observe the kick before the
/// delayed removal lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationState {
    /// Player is in good standing.
    Active,
    /// Host kicked the player; the record is removed after a grace delay.
    KickedPendingRemoval {
        /// Reason recorded by the host, surfaced to the kicked client.
        reason: String,
    },
}

/// A recorded answer, immutable once written.
#[derive(Debug, Clone)]
pub struct PlayerAnswer {
    /// Question this answers.
    pub question_id: Uuid,
    /// The submitted candidate, shape-tagged by question type.
    pub answer: CandidateAnswer,
    /// Milliseconds between the question anchor and the submission.
    pub time_spent_ms: u64,
    /// Validator verdict at submission time.
    pub correct: bool,
    /// Scoring-engine award at submission time, never recomputed.
    pub points: u32,
    /// Server receive time.
    pub submitted_at: SystemTime,
}

impl Player {
    /// Fresh player with a zero score and a clean moderation record.
    pub fn new(nickname: String, avatar: String) -> Self {
        Self {
            nickname,
            avatar,
            score: 0,
            answers: Vec::new(),
            connected: true,
            muted: false,
            warnings: 0,
            moderation: ModerationState::Active,
        }
    }

    /// Whether the host has kicked this player (removal may still be pending).
    pub fn is_kicked(&self) -> bool {
        matches!(self.moderation, ModerationState::KickedPendingRemoval { .. })
    }

    /// Whether an answer for `question_id` has already been recorded.
    pub fn has_answered(&self, question_id: Uuid) -> bool {
        self.answers
            .iter()
            .any(|answer| answer.question_id == question_id)
    }

    /// Append `answer` and add its points to the score.
    ///
    /// Returns `false` without mutating anything when an answer for the same
    /// question already exists; the caller surfaces that as a duplicate
    /// submission error.
    pub fn record_answer(&mut self, answer: PlayerAnswer) -> bool {
        if self.has_answered(answer.question_id) {
            return false;
        }
        self.score += answer.points;
        self.answers.push(answer);
        true
    }
}

impl Session {
    /// Build a fresh lobby for `definition`, hosted by `host_id`.
    pub fn new(game_id: String, host_id: Uuid, definition: Arc<GameDefinition>) -> Self {
        let timestamp = SystemTime::now();
        Self {
            game_id,
            host_id,
            definition,
            lifecycle: SessionStateMachine::new(),
            current_question_index: 0,
            question_started_at: None,
            paused_remaining: None,
            show_results: false,
            show_leaderboard: false,
            restart_signal: false,
            players: IndexMap::new(),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Current lifecycle status.
    pub fn status(&self) -> SessionStatus {
        self.lifecycle.status()
    }

    /// Apply a lifecycle command and touch the update timestamp.
    pub fn apply(&mut self, command: SessionCommand) -> Result<SessionStatus, InvalidTransition> {
        let next = self.lifecycle.apply(command)?;
        self.touch();
        Ok(next)
    }

    /// Question under the cursor, when the cursor is in range.
    pub fn current_question(&self) -> Option<&Question> {
        self.definition.questions.get(self.current_question_index)
    }

    /// Whether a question exists after the cursor.
    pub fn has_next_question(&self) -> bool {
        self.current_question_index + 1 < self.definition.questions.len()
    }

    /// Point the cursor at `index` with a fresh anchor and cleared views.
    pub fn open_question(&mut self, index: usize, now: SystemTime) {
        self.current_question_index = index;
        self.question_started_at = Some(now);
        self.paused_remaining = None;
        self.clear_reveal_flags();
        self.touch();
    }

    /// Capture the remaining countdown when entering a paused status.
    ///
    /// Idempotent: a session paused through `revealResults` and then paused
    /// again keeps its first capture.
    pub fn capture_remaining(&mut self, now: SystemTime) {
        if self.paused_remaining.is_some() {
            return;
        }
        if let (Some(anchor), Some(question)) = (self.question_started_at, self.current_question())
        {
            let limit = Duration::from_secs(u64::from(question.time_limit_secs));
            self.paused_remaining = Some(timing::remaining(now, anchor, limit));
        }
    }

    /// Re-anchor the countdown so the captured remaining time continues.
    pub fn resume_countdown(&mut self, now: SystemTime) {
        if let (Some(remaining), Some(question)) =
            (self.paused_remaining.take(), self.current_question())
        {
            let limit = Duration::from_secs(u64::from(question.time_limit_secs));
            self.question_started_at = Some(timing::resume_anchor(now, limit, remaining));
        }
        self.touch();
    }

    /// Turn on the results view. Clears the leaderboard view: at most one of
    /// the two gates is ever set.
    pub fn show_results_view(&mut self) {
        self.show_results = true;
        self.show_leaderboard = false;
        self.touch();
    }

    /// Turn on the leaderboard view, clearing the results view.
    pub fn show_leaderboard_view(&mut self) {
        self.show_leaderboard = true;
        self.show_results = false;
        self.touch();
    }

    /// Clear both secondary views.
    pub fn clear_reveal_flags(&mut self) {
        self.show_results = false;
        self.show_leaderboard = false;
    }

    /// Soft restart: zero every score and answer list, rewind the cursor,
    /// and clear every per-question field. Players stay attached.
    pub fn soft_reset(&mut self) {
        for player in self.players.values_mut() {
            player.score = 0;
            player.answers.clear();
        }
        self.current_question_index = 0;
        self.question_started_at = None;
        self.paused_remaining = None;
        self.restart_signal = false;
        self.clear_reveal_flags();
        self.touch();
    }

    /// Hard restart completion: drop every player and rebuild the lobby
    /// in place, keeping the same definition and host.
    ///
    /// Fails if the machine is not in the restarting status, which happens
    /// when another restart cycle raced this one.
    pub fn hard_reset(&mut self) -> Result<(), InvalidTransition> {
        self.lifecycle.apply(SessionCommand::ResetComplete)?;
        self.players.clear();
        self.current_question_index = 0;
        self.question_started_at = None;
        self.paused_remaining = None;
        self.restart_signal = false;
        self.clear_reveal_flags();
        self.created_at = SystemTime::now();
        self.touch();
        Ok(())
    }

    /// Number of connected, non-kicked players.
    pub fn connected_player_count(&self) -> usize {
        self.players
            .values()
            .filter(|player| player.connected && !player.is_kicked())
            .count()
    }

    /// Record the mutation timestamp.
    pub fn touch(&mut self) {
        self.updated_at = SystemTime::now();
    }
}
