//! Per-session state machine
//!
//! A `Session` is one two-party match: two slots, a shared question
//! sequence, a status and two timers. All mutable state lives behind a
//! single async mutex, making the session an independently serialized
//! unit: answer submissions, timer fires and disconnects against the same
//! session never interleave, while distinct sessions proceed in parallel.

use crate::events::{ScoreLine, ScoreSnapshot};
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use types::ids::{PlayerId, SessionId};
use types::player::PlayerProfile;
use types::question::QuestionItem;
use types::session::SessionStatus;
use types::tier::Tier;

/// One submitted answer, kept for auditability
#[derive(Debug, Clone)]
pub struct AnswerRecord {
    pub question_index: usize,
    pub answer: u32,
    pub correct: bool,
    /// Unix milliseconds
    pub submitted_at: i64,
}

/// A participant's mutable state within the session
#[derive(Debug, Clone)]
pub struct PlayerSlot {
    pub profile: PlayerProfile,
    pub score: u32,
    /// Ordinal of the next question this player is expected to answer
    pub next_index: usize,
    pub answers: Vec<AnswerRecord>,
}

impl PlayerSlot {
    fn new(profile: PlayerProfile) -> Self {
        Self {
            profile,
            score: 0,
            next_index: 0,
            answers: Vec::new(),
        }
    }

    fn exhausted(&self, total: usize) -> bool {
        self.next_index >= total
    }
}

/// Abort handles for the tasks a session may have in flight. Every exit
/// from a timer-owning state must cancel the corresponding handle.
#[derive(Debug, Default)]
pub struct TimerHandles {
    /// Match-found delay before the countdown starts
    pub forming: Option<AbortHandle>,
    /// Per-second countdown ticker
    pub countdown: Option<AbortHandle>,
    /// Per-second match-duration ticker
    pub deadline: Option<AbortHandle>,
}

impl TimerHandles {
    pub fn abort_all(&mut self) {
        for handle in [
            self.forming.take(),
            self.countdown.take(),
            self.deadline.take(),
        ]
        .into_iter()
        .flatten()
        {
            handle.abort();
        }
    }
}

/// Everything mutable about a session, guarded by the session lock
#[derive(Debug)]
pub struct SessionState {
    pub status: SessionStatus,
    pub slots: [PlayerSlot; 2],
    pub questions: Vec<QuestionItem>,
    /// Unix milliseconds, set on entering Active
    pub started_at: Option<i64>,
    /// Monotonic deadline, set on entering Active
    pub deadline: Option<Instant>,
    pub winner: Option<PlayerId>,
    pub timers: TimerHandles,
}

/// Result of applying a submitted answer to the state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerApplied {
    /// Answer accepted and scored
    Accepted {
        slot: usize,
        correct: bool,
        /// The next question for this player, if any remain
        next_question_index: Option<usize>,
        /// Both slots have now exhausted the sequence
        all_exhausted: bool,
    },
    /// Stale, out-of-order or otherwise non-actionable; silently dropped
    Ignored,
}

impl SessionState {
    /// Slot index of a participant
    pub fn slot_index(&self, player: PlayerId) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.profile.player_id == player)
    }

    /// Both slots' score and progress
    pub fn snapshot(&self) -> ScoreSnapshot {
        let line = |slot: &PlayerSlot| ScoreLine {
            player_id: slot.profile.player_id,
            username: slot.profile.username.clone(),
            score: slot.score,
            progress: slot.next_index,
        };
        ScoreSnapshot {
            players: [line(&self.slots[0]), line(&self.slots[1])],
        }
    }

    /// Apply one submitted answer. Only valid while Active, and only for
    /// the slot's expected ordinal; everything else is a silent no-op so
    /// duplicate client retransmits cannot double-score.
    pub fn apply_answer(&mut self, player: PlayerId, index: usize, answer: u32) -> AnswerApplied {
        if self.status != SessionStatus::Active {
            return AnswerApplied::Ignored;
        }
        let Some(slot_idx) = self.slot_index(player) else {
            return AnswerApplied::Ignored;
        };

        let total = self.questions.len();
        let slot = &mut self.slots[slot_idx];
        if index != slot.next_index || index >= total {
            return AnswerApplied::Ignored;
        }

        let correct = self.questions[index].grade(answer);
        slot.answers.push(AnswerRecord {
            question_index: index,
            answer,
            correct,
            submitted_at: chrono::Utc::now().timestamp_millis(),
        });
        if correct {
            slot.score += 1;
        }
        slot.next_index += 1;

        let next_question_index = (slot.next_index < total).then_some(slot.next_index);
        let all_exhausted = self.slots.iter().all(|s| s.exhausted(total));

        AnswerApplied::Accepted {
            slot: slot_idx,
            correct,
            next_question_index,
            all_exhausted,
        }
    }

    /// Final scores in slot order
    pub fn scores(&self) -> [u32; 2] {
        [self.slots[0].score, self.slots[1].score]
    }
}

/// One active or recently finished match
pub struct Session {
    pub id: SessionId,
    pub tier: Tier,
    /// Unix milliseconds at formation
    pub created_at: i64,
    player_ids: [PlayerId; 2],
    state: Mutex<SessionState>,
}

impl Session {
    pub fn new(tier: Tier, profiles: [PlayerProfile; 2], questions: Vec<QuestionItem>) -> Self {
        let player_ids = [profiles[0].player_id, profiles[1].player_id];
        let [p0, p1] = profiles;
        Self {
            id: SessionId::new(),
            tier,
            created_at: chrono::Utc::now().timestamp_millis(),
            player_ids,
            state: Mutex::new(SessionState {
                status: SessionStatus::Forming,
                slots: [PlayerSlot::new(p0), PlayerSlot::new(p1)],
                questions,
                started_at: None,
                deadline: None,
                winner: None,
                timers: TimerHandles::default(),
            }),
        }
    }

    /// Both participants, in slot order. Available without the lock.
    pub fn player_ids(&self) -> [PlayerId; 2] {
        self.player_ids
    }

    /// Acquire the session lock
    pub async fn lock(&self) -> tokio::sync::MutexGuard<'_, SessionState> {
        self.state.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions(n: usize) -> Vec<QuestionItem> {
        (0..n)
            .map(|index| QuestionItem {
                index,
                prompt: format!("{} + 1 = ?", index),
                options: [
                    index as u32 + 1,
                    index as u32 + 2,
                    index as u32 + 3,
                    index as u32 + 4,
                ],
                correct: index as u32 + 1,
            })
            .collect()
    }

    fn active_session(n: usize) -> (Session, PlayerId, PlayerId) {
        let a = PlayerProfile::new(PlayerId::new(), "alice", "🦊");
        let b = PlayerProfile::new(PlayerId::new(), "bob", "🐼");
        let (a_id, b_id) = (a.player_id, b.player_id);
        let session = Session::new(Tier::Coins500, [a, b], questions(n));
        (session, a_id, b_id)
    }

    #[tokio::test]
    async fn test_answer_scoring_and_progress() {
        let (session, a, _) = active_session(3);
        let mut state = session.lock().await;
        state.status = SessionStatus::Active;

        // Correct answer for ordinal 0
        let applied = state.apply_answer(a, 0, 1);
        assert_eq!(
            applied,
            AnswerApplied::Accepted {
                slot: 0,
                correct: true,
                next_question_index: Some(1),
                all_exhausted: false,
            }
        );
        assert_eq!(state.slots[0].score, 1);

        // Wrong answer still advances progress
        let applied = state.apply_answer(a, 1, 999);
        assert!(matches!(
            applied,
            AnswerApplied::Accepted { correct: false, .. }
        ));
        assert_eq!(state.slots[0].score, 1);
        assert_eq!(state.slots[0].next_index, 2);
    }

    #[tokio::test]
    async fn test_stale_ordinal_is_silently_ignored() {
        let (session, a, _) = active_session(3);
        let mut state = session.lock().await;
        state.status = SessionStatus::Active;

        state.apply_answer(a, 0, 1);
        // Duplicate retransmit of ordinal 0: no score, no progress, no log
        let before_answers = state.slots[0].answers.len();
        assert_eq!(state.apply_answer(a, 0, 1), AnswerApplied::Ignored);
        assert_eq!(state.slots[0].answers.len(), before_answers);
        assert_eq!(state.slots[0].score, 1);

        // Future ordinal likewise
        assert_eq!(state.apply_answer(a, 2, 3), AnswerApplied::Ignored);
    }

    #[tokio::test]
    async fn test_answers_rejected_unless_active() {
        let (session, a, _) = active_session(3);
        let mut state = session.lock().await;

        assert_eq!(state.status, SessionStatus::Forming);
        assert_eq!(state.apply_answer(a, 0, 1), AnswerApplied::Ignored);

        state.status = SessionStatus::Settling;
        assert_eq!(state.apply_answer(a, 0, 1), AnswerApplied::Ignored);
    }

    #[tokio::test]
    async fn test_exhaustion_detection() {
        let (session, a, b) = active_session(2);
        let mut state = session.lock().await;
        state.status = SessionStatus::Active;

        state.apply_answer(a, 0, 1);
        let applied = state.apply_answer(a, 1, 2);
        assert!(matches!(
            applied,
            AnswerApplied::Accepted {
                next_question_index: None,
                all_exhausted: false,
                ..
            }
        ));

        state.apply_answer(b, 0, 1);
        let applied = state.apply_answer(b, 1, 2);
        assert!(matches!(
            applied,
            AnswerApplied::Accepted {
                all_exhausted: true,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_unknown_player_ignored() {
        let (session, _, _) = active_session(2);
        let mut state = session.lock().await;
        state.status = SessionStatus::Active;
        assert_eq!(
            state.apply_answer(PlayerId::new(), 0, 1),
            AnswerApplied::Ignored
        );
    }

    #[tokio::test]
    async fn test_snapshot_tracks_both_slots() {
        let (session, a, b) = active_session(3);
        let mut state = session.lock().await;
        state.status = SessionStatus::Active;

        state.apply_answer(a, 0, 1);
        state.apply_answer(b, 0, 999);

        let snapshot = state.snapshot();
        assert_eq!(snapshot.players[0].score, 1);
        assert_eq!(snapshot.players[0].progress, 1);
        assert_eq!(snapshot.players[1].score, 0);
        assert_eq!(snapshot.players[1].progress, 1);
    }
}
