//! Persisted match result row
//!
//! The engine hands exactly one of these to the ledger per settled session.
//! Durable storage itself is an external collaborator.

use crate::ids::{PlayerId, SessionId};
use crate::tier::Tier;
use serde::{Deserialize, Serialize};

/// Final result of one settled session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub session_id: SessionId,
    pub tier: Tier,
    /// Both participants, in slot order
    pub players: [PlayerId; 2],
    /// Final scores, same order as `players`
    pub scores: [u32; 2],
    /// None on a draw
    pub winner: Option<PlayerId>,
    /// Unix milliseconds
    pub ended_at: i64,
}

impl MatchRecord {
    /// The losing player, if the match had a winner
    pub fn loser(&self) -> Option<PlayerId> {
        let winner = self.winner?;
        if winner == self.players[0] {
            Some(self.players[1])
        } else {
            Some(self.players[0])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loser_lookup() {
        let a = PlayerId::new();
        let b = PlayerId::new();
        let record = MatchRecord {
            session_id: SessionId::new(),
            tier: Tier::Coins500,
            players: [a, b],
            scores: [7, 4],
            winner: Some(a),
            ended_at: 1_708_123_456_789,
        };
        assert_eq!(record.loser(), Some(b));
    }

    #[test]
    fn test_draw_has_no_loser() {
        let record = MatchRecord {
            session_id: SessionId::new(),
            tier: Tier::Coins200,
            players: [PlayerId::new(), PlayerId::new()],
            scores: [5, 5],
            winner: None,
            ended_at: 1_708_123_456_789,
        };
        assert_eq!(record.loser(), None);
    }
}
