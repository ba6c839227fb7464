//! Outbound notification definitions
//!
//! Every event the engine can deliver to a player's client. Session-wide
//! events (`Countdown`, `GameStart`, `ScoreUpdate`, `TimeUpdate`) are sent
//! to both participants; the rest are per-player. The variant tag doubles
//! as the wire event name.

use crate::error::NoticeKind;
use serde::{Deserialize, Serialize};
use types::ids::{PlayerId, SessionId};
use types::player::PlayerProfile;
use types::question::QuestionView;
use types::session::SettleReason;
use types::tier::Tier;

/// One player's line in a score snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreLine {
    pub player_id: PlayerId,
    pub username: String,
    pub score: u32,
    /// Questions answered so far
    pub progress: usize,
}

/// Both slots' score and progress, broadcast after every accepted answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSnapshot {
    pub players: [ScoreLine; 2],
}

/// Personalized result of a settled session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerResult {
    Won,
    Lost,
    Draw,
}

/// Engine → player notifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum Outbound {
    /// Enqueued; waiting for an opponent
    #[serde(rename_all = "camelCase")]
    QueueJoined { tier: Tier, position: usize },

    /// Removed from the queue after the bounded wait elapsed unmatched
    QueueTimedOut,

    /// Paired with an opponent; wagers reserved
    #[serde(rename_all = "camelCase")]
    MatchFound {
        session_id: SessionId,
        opponent: PlayerProfile,
        tier: Tier,
        prize_pool: u64,
    },

    /// Descending pre-game tick (session-wide)
    #[serde(rename_all = "camelCase")]
    Countdown { seconds_remaining: u32 },

    /// The match went active (session-wide)
    #[serde(rename_all = "camelCase")]
    GameStart {
        duration_secs: u64,
        total_questions: usize,
    },

    /// Next question for this player alone
    #[serde(rename_all = "camelCase")]
    NewQuestion { question: QuestionView },

    /// Updated scores after an accepted answer (session-wide)
    #[serde(rename_all = "camelCase")]
    ScoreUpdate { snapshot: ScoreSnapshot },

    /// This player has answered every question
    QuestionsExhausted,

    /// Remaining match time in seconds (session-wide, once per second)
    #[serde(rename_all = "camelCase")]
    TimeUpdate { seconds_remaining: u64 },

    /// Final personalized outcome
    #[serde(rename_all = "camelCase")]
    GameOver {
        result: PlayerResult,
        final_scores: ScoreSnapshot,
        coins_won: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<SettleReason>,
    },

    /// A rejected inbound event, exactly one per rejection
    #[serde(rename_all = "camelCase")]
    Error { kind: NoticeKind },
}

impl Outbound {
    /// Event name label for logging
    pub fn kind_label(&self) -> &'static str {
        match self {
            Outbound::QueueJoined { .. } => "queueJoined",
            Outbound::QueueTimedOut => "queueTimedOut",
            Outbound::MatchFound { .. } => "matchFound",
            Outbound::Countdown { .. } => "countdown",
            Outbound::GameStart { .. } => "gameStart",
            Outbound::NewQuestion { .. } => "newQuestion",
            Outbound::ScoreUpdate { .. } => "scoreUpdate",
            Outbound::QuestionsExhausted => "questionsExhausted",
            Outbound::TimeUpdate { .. } => "timeUpdate",
            Outbound::GameOver { .. } => "gameOver",
            Outbound::Error { .. } => "error",
        }
    }
}
