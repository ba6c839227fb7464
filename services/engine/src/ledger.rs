//! Balance gateway boundary
//!
//! The external ledger is the single source of truth for coin balances and
//! match history. The engine treats `reserve` and the settlement credits as
//! the atomic units of truth; its in-memory wager figures are derived.
//! `refund` is semantically a credit, kept distinct for auditability.

use crate::error::LedgerError;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Mutex;
use types::ids::PlayerId;
use types::record::MatchRecord;

/// Atomic balance and history operations against the external ledger
#[async_trait]
pub trait BalanceGateway: Send + Sync {
    /// Atomically deduct `amount` from the player's balance.
    /// Fails with `InsufficientFunds` without deducting anything.
    async fn reserve(&self, player: PlayerId, amount: u64) -> Result<(), LedgerError>;

    /// Credit winnings to the player's balance.
    async fn credit(&self, player: PlayerId, amount: u64) -> Result<(), LedgerError>;

    /// Return a previously reserved wager. A credit on the books, but a
    /// distinct operation so reservations and payouts reconcile separately.
    async fn refund(&self, player: PlayerId, amount: u64) -> Result<(), LedgerError>;

    /// Persist the final result of a settled session. Fire-and-forget from
    /// the engine's perspective: failures are logged, not retried.
    async fn record_match_result(&self, record: MatchRecord) -> Result<(), LedgerError>;
}

/// Per-player running tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerStats {
    pub wins: u32,
    pub losses: u32,
    pub total_matches: u32,
}

/// In-memory ledger used by tests and the single-process deployment
#[derive(Default)]
pub struct MemoryLedger {
    balances: DashMap<PlayerId, u64>,
    stats: DashMap<PlayerId, PlayerStats>,
    records: Mutex<Vec<MatchRecord>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or top up an account
    pub fn open_account(&self, player: PlayerId, initial_coins: u64) {
        *self.balances.entry(player).or_insert(0) += initial_coins;
    }

    /// Create the account with a starting balance only if it does not
    /// exist yet; a returning player keeps their current balance
    pub fn ensure_account(&self, player: PlayerId, initial_coins: u64) {
        self.balances.entry(player).or_insert(initial_coins);
    }

    /// Current balance, zero for unknown players
    pub fn balance(&self, player: PlayerId) -> u64 {
        self.balances.get(&player).map(|b| *b).unwrap_or(0)
    }

    /// Win/loss tallies for a player
    pub fn stats(&self, player: PlayerId) -> PlayerStats {
        self.stats.get(&player).map(|s| *s).unwrap_or_default()
    }

    /// All persisted match records, oldest first
    pub fn records(&self) -> Vec<MatchRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Match records involving one player, oldest first
    pub fn records_for(&self, player: PlayerId) -> Vec<MatchRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.players.contains(&player))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl BalanceGateway for MemoryLedger {
    async fn reserve(&self, player: PlayerId, amount: u64) -> Result<(), LedgerError> {
        let mut balance = self
            .balances
            .get_mut(&player)
            .ok_or(LedgerError::InsufficientFunds)?;
        if *balance < amount {
            return Err(LedgerError::InsufficientFunds);
        }
        *balance -= amount;
        Ok(())
    }

    async fn credit(&self, player: PlayerId, amount: u64) -> Result<(), LedgerError> {
        *self.balances.entry(player).or_insert(0) += amount;
        Ok(())
    }

    async fn refund(&self, player: PlayerId, amount: u64) -> Result<(), LedgerError> {
        *self.balances.entry(player).or_insert(0) += amount;
        Ok(())
    }

    async fn record_match_result(&self, record: MatchRecord) -> Result<(), LedgerError> {
        for player in record.players {
            let mut stats = self.stats.entry(player).or_default();
            stats.total_matches += 1;
            match record.winner {
                Some(winner) if winner == player => stats.wins += 1,
                Some(_) => stats.losses += 1,
                None => {}
            }
        }
        self.records.lock().unwrap().push(record);
        Ok(())
    }
}
