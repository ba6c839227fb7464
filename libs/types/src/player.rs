//! Public player identity
//!
//! The engine never owns player accounts; the dispatcher supplies this
//! profile on each inbound event. Balances live in the external ledger.

use crate::ids::PlayerId;
use serde::{Deserialize, Serialize};

/// Public identity of a connected player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub player_id: PlayerId,
    pub username: String,
    /// Display avatar (emoji or image handle)
    pub avatar: String,
}

impl PlayerProfile {
    pub fn new(player_id: PlayerId, username: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            player_id,
            username: username.into(),
            avatar: avatar.into(),
        }
    }
}
