//! Settlement arithmetic
//!
//! One pure function computes the balance effects of every settlement path
//! (completion, timeout, forfeit), so the payout rules live in exactly one
//! place. Scores are integral counts, so "higher score" is a strict integer
//! comparison.

/// Balance effects of one settled session, in slot order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Winning slot index, None on a draw
    pub winner: Option<usize>,
    /// Coins credited to each slot during settlement
    pub credits: [u64; 2],
}

impl Outcome {
    /// Whether slot `i` won
    pub fn is_winner(&self, i: usize) -> bool {
        self.winner == Some(i)
    }
}

/// Score-based outcome: higher score takes the full 2×wager pool, equal
/// scores refund each side exactly its own wager (net zero).
pub fn compute_outcome(score_a: u32, score_b: u32, wager: u64) -> Outcome {
    let pool = wager * 2;
    if score_a > score_b {
        Outcome {
            winner: Some(0),
            credits: [pool, 0],
        }
    } else if score_b > score_a {
        Outcome {
            winner: Some(1),
            credits: [0, pool],
        }
    } else {
        Outcome {
            winner: None,
            credits: [wager, wager],
        }
    }
}

/// Forfeit outcome: the remaining slot wins the full pool unconditionally,
/// bypassing score comparison.
pub fn forfeit_outcome(winner_slot: usize, wager: u64) -> Outcome {
    let mut credits = [0u64; 2];
    credits[winner_slot] = wager * 2;
    Outcome {
        winner: Some(winner_slot),
        credits,
    }
}
