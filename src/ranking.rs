//! Tie-aware leaderboard and podium ranking.
//!
//! Pure functions over the session's player map. Only connected, non-kicked
//! players enter the standings: a kicked or disconnected player is excluded,
//! not merely hidden.

use indexmap::IndexMap;
use uuid::Uuid;

use crate::state::session::Player;

/// One row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedPlayer {
    /// Competition-ranking position: tied players share a position and the
    /// next distinct score skips the intervening ranks (1, 1, 3, ...).
    pub position: usize,
    /// Player identifier.
    pub player_id: Uuid,
    /// Display name.
    pub nickname: String,
    /// Avatar chosen at join time.
    pub avatar: String,
    /// Score at ranking time.
    pub score: u32,
}

/// A podium slot grouping every player tied on one distinct score.
///
/// When more than three players tie at the top-3 cutoff the whole group
/// stays in its slot, even if the ceremony then shows more than three
/// people.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodiumSlot {
    /// Shared position of the group (1, 2 or 3 by distinct score).
    pub position: usize,
    /// The score every member of the slot reached.
    pub score: u32,
    /// Tied players, nickname ascending.
    pub players: Vec<RankedPlayer>,
}

/// Full standings, best first.
///
/// Primary key: score descending. Display tie-break: nickname ascending, so
/// the ordering is stable and deterministic across clients.
pub fn leaderboard(players: &IndexMap<Uuid, Player>) -> Vec<RankedPlayer> {
    let mut eligible: Vec<(&Uuid, &Player)> = players
        .iter()
        .filter(|(_, player)| player.connected && !player.is_kicked())
        .collect();

    eligible.sort_by(|(_, a), (_, b)| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.nickname.cmp(&b.nickname))
    });

    let mut ranked = Vec::with_capacity(eligible.len());
    let mut position = 0;
    let mut previous_score = None;

    for (index, (id, player)) in eligible.into_iter().enumerate() {
        if previous_score != Some(player.score) {
            position = index + 1;
            previous_score = Some(player.score);
        }
        ranked.push(RankedPlayer {
            position,
            player_id: *id,
            nickname: player.nickname.clone(),
            avatar: player.avatar.clone(),
            score: player.score,
        });
    }

    ranked
}

/// Podium slots for the top three distinct scores, best first.
pub fn podium(players: &IndexMap<Uuid, Player>) -> Vec<PodiumSlot> {
    let mut slots: Vec<PodiumSlot> = Vec::new();

    for entry in leaderboard(players) {
        if let Some(slot) = slots
            .last_mut()
            .filter(|slot| slot.score == entry.score)
        {
            slot.players.push(entry);
        } else if slots.len() < 3 {
            slots.push(PodiumSlot {
                position: entry.position,
                score: entry.score,
                players: vec![entry],
            });
        } else {
            break;
        }
    }

    slots
}

/// Ceremony order over podium slots: worst revealed first (3rd, 2nd, 1st),
/// or fewer steps when fewer distinct score groups exist.
pub fn reveal_order(slots: &[PodiumSlot]) -> impl Iterator<Item = &PodiumSlot> {
    slots.iter().rev()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::session::ModerationState;

    fn roster(entries: &[(&str, u32)]) -> IndexMap<Uuid, Player> {
        entries
            .iter()
            .map(|(nickname, score)| {
                let mut player = Player::new((*nickname).to_string(), "owl".into());
                player.score = *score;
                (Uuid::new_v4(), player)
            })
            .collect()
    }

    fn positions(ranked: &[RankedPlayer]) -> Vec<(String, usize)> {
        ranked
            .iter()
            .map(|entry| (entry.nickname.clone(), entry.position))
            .collect()
    }

    #[test]
    fn tied_players_share_a_position_and_ranks_skip() {
        let players = roster(&[("Bob", 50), ("Alice", 50), ("Zoe", 30)]);
        let ranked = leaderboard(&players);
        assert_eq!(
            positions(&ranked),
            vec![
                ("Alice".to_string(), 1),
                ("Bob".to_string(), 1),
                ("Zoe".to_string(), 3),
            ]
        );
    }

    #[test]
    fn disconnected_and_kicked_players_are_excluded() {
        let mut players = roster(&[("Ann", 80), ("Ben", 60), ("Cal", 40)]);
        let ids: Vec<Uuid> = players.keys().copied().collect();
        players[&ids[0]].connected = false;
        players[&ids[1]].moderation = ModerationState::KickedPendingRemoval {
            reason: "spam".into(),
        };

        let ranked = leaderboard(&players);
        assert_eq!(positions(&ranked), vec![("Cal".to_string(), 1)]);
    }

    #[test]
    fn podium_groups_distinct_scores() {
        let players = roster(&[("Ann", 90), ("Ben", 70), ("Cal", 70), ("Dee", 50), ("Eli", 10)]);
        let slots = podium(&players);

        assert_eq!(slots.len(), 3);
        assert_eq!((slots[0].position, slots[0].score), (1, 90));
        assert_eq!((slots[1].position, slots[1].score), (2, 70));
        assert_eq!(slots[1].players.len(), 2);
        // Dee is 4th by competition ranking but holds the third distinct score.
        assert_eq!((slots[2].position, slots[2].score), (4, 50));
    }

    #[test]
    fn oversized_tie_group_stays_in_one_slot() {
        let players = roster(&[
            ("Ann", 100),
            ("Ben", 100),
            ("Cal", 100),
            ("Dee", 100),
            ("Eli", 20),
        ]);
        let slots = podium(&players);

        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].players.len(), 4);
        assert_eq!(slots[1].position, 5);
    }

    #[test]
    fn reveal_order_runs_third_to_first() {
        let players = roster(&[("Ann", 90), ("Ben", 70), ("Cal", 50)]);
        let slots = podium(&players);
        let order: Vec<usize> = reveal_order(&slots).map(|slot| slot.position).collect();
        assert_eq!(order, vec![3, 2, 1]);
    }

    #[test]
    fn empty_roster_ranks_empty() {
        let players = IndexMap::new();
        assert!(leaderboard(&players).is_empty());
        assert!(podium(&players).is_empty());
    }
}
