use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::ranking::{PodiumSlot, RankedPlayer};

/// One leaderboard row exposed to REST/SSE clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    /// Competition-ranking position (tied players share it).
    pub position: usize,
    /// Player identifier.
    pub player_id: Uuid,
    /// Display name.
    pub nickname: String,
    /// Avatar.
    pub avatar: String,
    /// Score at ranking time.
    pub score: u32,
}

/// One podium slot: every player tied on a distinct score.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PodiumSlotDto {
    /// Shared position of the group.
    pub position: usize,
    /// The score the group reached.
    pub score: u32,
    /// Tied players, nickname ascending.
    pub players: Vec<LeaderboardEntry>,
}

/// Full standings response.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    /// Rows, best first.
    pub entries: Vec<LeaderboardEntry>,
}

/// Podium ceremony response.
#[derive(Debug, Serialize, ToSchema)]
pub struct PodiumResponse {
    /// Slots in ceremony reveal order: 3rd group, then 2nd, then 1st.
    pub slots: Vec<PodiumSlotDto>,
}

impl From<RankedPlayer> for LeaderboardEntry {
    fn from(entry: RankedPlayer) -> Self {
        Self {
            position: entry.position,
            player_id: entry.player_id,
            nickname: entry.nickname,
            avatar: entry.avatar,
            score: entry.score,
        }
    }
}

impl From<PodiumSlot> for PodiumSlotDto {
    fn from(slot: PodiumSlot) -> Self {
        Self {
            position: slot.position,
            score: slot.score,
            players: slot.players.into_iter().map(Into::into).collect(),
        }
    }
}
