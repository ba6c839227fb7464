//! Wire models for the gateway's client-facing surface

use engine::ledger::PlayerStats;
use serde::{Deserialize, Serialize};
use types::ids::PlayerId;
use types::record::MatchRecord;

/// Player → server messages over the WebSocket
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Enter the matchmaking queue for a wager amount
    #[serde(rename_all = "camelCase")]
    JoinQueue { entry_fee: u64 },

    /// Leave the queue
    LeaveQueue,

    /// Answer the question at this ordinal
    #[serde(rename_all = "camelCase")]
    SubmitAnswer { question_index: usize, answer: u32 },
}

/// GET /v1/profile response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub player_id: PlayerId,
    pub username: String,
    pub coins: u64,
    pub wins: u32,
    pub losses: u32,
    pub total_matches: u32,
}

impl ProfileResponse {
    pub fn new(player_id: PlayerId, username: String, coins: u64, stats: PlayerStats) -> Self {
        Self {
            player_id,
            username,
            coins,
            wins: stats.wins,
            losses: stats.losses,
            total_matches: stats.total_matches,
        }
    }
}

/// GET /v1/matches response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchHistoryResponse {
    pub matches: Vec<MatchRecord>,
}
