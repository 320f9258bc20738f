use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::question::{CandidateAnswer, Question};

/// Payload registering a game definition under a join code.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegisterGameRequest {
    /// Display title of the quiz.
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    /// Ordered question list; each entry is checked before registration.
    pub questions: Vec<Question>,
}

/// Acknowledgement for a registered game definition.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterGameResponse {
    /// Join code the definition was stored under.
    pub game_id: String,
    /// Number of questions accepted.
    pub question_count: usize,
}

/// Payload creating a lobby session for a registered game.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    /// Identifier of the controlling host.
    pub host_id: Uuid,
}

/// Payload for a player joining the lobby.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct JoinRequest {
    /// Display name, unique enforcement is deliberately not applied.
    #[validate(length(min = 1, max = 24))]
    pub nickname: String,
    /// Avatar choice; one is assigned from the configured set when omitted.
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Identifier handed back to a freshly joined player.
#[derive(Debug, Serialize, ToSchema)]
pub struct JoinResponse {
    /// Identifier the player uses for all subsequent writes.
    pub player_id: Uuid,
    /// Avatar actually assigned.
    pub avatar: String,
}

/// Payload moving the question cursor.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AdvanceRequest {
    /// Explicit target index; omitted, the cursor moves one step forward.
    /// A target at or past the end of the list finishes the quiz.
    #[serde(default)]
    pub index: Option<usize>,
}

/// Payload submitting an answer to the live question.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitAnswerRequest {
    /// The candidate answer; [`CandidateAnswer::Empty`] for a timed-out
    /// auto-submit.
    pub answer: CandidateAnswer,
}

/// Receipt for a recorded answer. The authoritative result still arrives
/// through the snapshot stream like every other mutation.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitAnswerResponse {
    /// Question the answer was recorded against.
    pub question_id: Uuid,
    /// Validator verdict.
    pub correct: bool,
    /// Points awarded by the scoring engine.
    pub points: u32,
    /// Player score after the award.
    pub score: u32,
}

/// Payload flipping a player's connectivity flag.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PresenceRequest {
    /// New connectivity state.
    pub connected: bool,
}

/// Payload kicking a player.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct KickRequest {
    /// Reason recorded with the kick and surfaced to the kicked client.
    #[validate(length(min = 1, max = 200))]
    pub reason: String,
}

/// Payload muting or unmuting a player.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MuteRequest {
    /// New mute state.
    pub muted: bool,
}

/// Generic acknowledgement body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    /// Human-readable confirmation.
    pub message: String,
}
