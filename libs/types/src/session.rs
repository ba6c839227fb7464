//! Session lifecycle status
//!
//! The status is monotonic: Forming → Countdown → Active → Settling →
//! Finished. The only permitted shortcut is Active → Settling, taken by the
//! forfeit and timeout paths. No transition skips forward past Settling or
//! moves backward.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a match session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    /// Match formed, wagers reserved, waiting for the match-found delay
    Forming,
    /// Descending countdown being broadcast to both players
    Countdown,
    /// Questions in flight, answers accepted
    Active,
    /// Outcome being computed and applied; no further game input accepted
    Settling,
    /// Settled; retained briefly for late result queries (terminal)
    Finished,
}

impl SessionStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Finished)
    }

    /// Whether a transition to `next` is permitted
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, next),
            (Forming, Countdown) | (Countdown, Active) | (Active, Settling) | (Settling, Finished)
        )
    }
}

/// Why a session settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettleReason {
    /// Both players exhausted the question sequence before the deadline
    Completed,
    /// The match-duration timer reached zero
    TimeExpired,
    /// A player disconnected mid-match
    OpponentForfeit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use SessionStatus::*;

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(Forming.can_transition_to(Countdown));
        assert!(Countdown.can_transition_to(Active));
        assert!(Active.can_transition_to(Settling));
        assert!(Settling.can_transition_to(Finished));
    }

    #[test]
    fn test_no_skips_or_reversals() {
        assert!(!Forming.can_transition_to(Active));
        assert!(!Countdown.can_transition_to(Settling));
        assert!(!Active.can_transition_to(Finished));
        assert!(!Settling.can_transition_to(Active));
        assert!(!Finished.can_transition_to(Forming));
        assert!(!Finished.can_transition_to(Settling));
    }

    #[test]
    fn test_terminal() {
        assert!(Finished.is_terminal());
        assert!(!Settling.is_terminal());
        assert!(!Active.is_terminal());
    }
}
