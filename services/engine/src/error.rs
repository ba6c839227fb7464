//! Error taxonomy for the engine
//!
//! Validation errors are rejected locally and surfaced to the initiating
//! player as a single notice. Resource errors abort the in-progress
//! operation after undoing any partial reservation. Collaborator errors
//! never block settlement; they are logged for out-of-band reconciliation.

use thiserror::Error;

/// Errors surfaced by engine operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("unrecognized wager tier: {0}")]
    InvalidTier(u64),

    #[error("player is already waiting in a queue")]
    AlreadyQueued,

    #[error("player is already in a session")]
    AlreadyInSession,

    #[error("insufficient funds to reserve wager")]
    InsufficientFunds,
}

impl EngineError {
    /// The notice kind delivered to the initiating player
    pub fn notice_kind(&self) -> NoticeKind {
        match self {
            EngineError::InvalidTier(_) => NoticeKind::InvalidTier,
            EngineError::AlreadyQueued => NoticeKind::AlreadyQueued,
            EngineError::AlreadyInSession => NoticeKind::AlreadyInSession,
            EngineError::InsufficientFunds => NoticeKind::InsufficientFunds,
        }
    }
}

/// Machine-readable notice kinds for the `Error` notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoticeKind {
    InvalidTier,
    AlreadyQueued,
    AlreadyInSession,
    InsufficientFunds,
    /// The match was torn down before it started (opponent left)
    MatchAborted,
}

/// Errors from the external balance ledger
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}
