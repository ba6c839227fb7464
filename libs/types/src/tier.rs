//! Wager tiers
//!
//! Each tier defines one matchmaking queue with a fixed entry fee in coins.
//! The set is closed: joining with any other amount is a validation error
//! surfaced by the engine, never a new queue.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A fixed wager tier (entry fee in coins)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum Tier {
    Coins200,
    Coins500,
    Coins1000,
    Coins2000,
    Coins5000,
}

impl Tier {
    /// All tiers, ascending by entry fee
    pub const ALL: [Tier; 5] = [
        Tier::Coins200,
        Tier::Coins500,
        Tier::Coins1000,
        Tier::Coins2000,
        Tier::Coins5000,
    ];

    /// Entry fee in coins
    pub fn amount(&self) -> u64 {
        match self {
            Tier::Coins200 => 200,
            Tier::Coins500 => 500,
            Tier::Coins1000 => 1000,
            Tier::Coins2000 => 2000,
            Tier::Coins5000 => 5000,
        }
    }

    /// Prize pool for a two-party match at this tier
    pub fn prize_pool(&self) -> u64 {
        self.amount() * 2
    }

    /// Resolve a raw coin amount to a tier, if recognized
    pub fn from_amount(amount: u64) -> Option<Tier> {
        Tier::ALL.iter().copied().find(|t| t.amount() == amount)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.amount())
    }
}

impl TryFrom<u64> for Tier {
    type Error = String;

    fn try_from(amount: u64) -> Result<Self, Self::Error> {
        Tier::from_amount(amount).ok_or_else(|| format!("unrecognized tier amount: {}", amount))
    }
}

impl From<Tier> for u64 {
    fn from(tier: Tier) -> u64 {
        tier.amount()
    }
}
