//! Matchmaking & session lifecycle orchestrator
//!
//! `MatchEngine` is the single entry point for inbound participant events.
//! It owns the queue registry and session directory, reserves wagers
//! through the balance gateway before any session exists, and drives each
//! session's timers and settlement. No call here blocks on another
//! participant: outcomes are delivered asynchronously via the dispatcher.

use crate::config::EngineConfig;
use crate::directory::SessionDirectory;
use crate::dispatch::Dispatcher;
use crate::error::{EngineError, LedgerError, NoticeKind};
use crate::events::Outbound;
use crate::ledger::BalanceGateway;
use crate::questions;
use crate::queue::{JoinOutcome, QueueEntry, QueueRegistry};
use crate::session::{AnswerApplied, Session};
use crate::settlement;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use types::ids::PlayerId;
use types::player::PlayerProfile;
use types::record::MatchRecord;
use types::session::{SessionStatus, SettleReason};
use types::tier::Tier;
use uuid::Uuid;

/// What a disconnect does to the session the player occupied
enum DisconnectAction {
    /// Match never went active: tear down, refund both reservations
    Teardown,
    /// Mid-match: remaining player wins by forfeit
    Forfeit,
    /// Already settling or settled
    None,
}

/// The matchmaking & session lifecycle engine
pub struct MatchEngine {
    config: EngineConfig,
    queues: QueueRegistry,
    directory: SessionDirectory,
    ledger: Arc<dyn BalanceGateway>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl MatchEngine {
    pub fn new(
        config: EngineConfig,
        ledger: Arc<dyn BalanceGateway>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            queues: QueueRegistry::new(),
            directory: SessionDirectory::new(),
            ledger,
            dispatcher,
        })
    }

    /// Join the matchmaking queue for a wager amount.
    ///
    /// Either pairs the player with the tier's oldest waiter (reserving
    /// both wagers before the session exists) or enqueues them. Rejections
    /// yield exactly one `Error` notice to the caller.
    pub async fn join_queue(
        self: &Arc<Self>,
        profile: PlayerProfile,
        amount: u64,
    ) -> Result<(), EngineError> {
        let player = profile.player_id;

        let Some(tier) = Tier::from_amount(amount) else {
            return Err(self.reject(player, EngineError::InvalidTier(amount)));
        };
        if self.directory.contains_player(player) {
            return Err(self.reject(player, EngineError::AlreadyInSession));
        }

        let entry = QueueEntry::new(profile.clone(), tier);
        let token = entry.token;
        match self.queues.try_join(entry) {
            JoinOutcome::AlreadyQueued => Err(self.reject(player, EngineError::AlreadyQueued)),
            JoinOutcome::Queued { position } => {
                tracing::debug!(%player, %tier, position, "queued");
                self.dispatcher
                    .send(player, Outbound::QueueJoined { tier, position });
                self.spawn_queue_timeout(token);
                Ok(())
            }
            JoinOutcome::Matched(opponent) => self.form_match(profile, opponent, tier).await,
        }
    }

    /// Leave the queue; idempotent if no entry exists
    pub fn leave_queue(&self, player: PlayerId) {
        if self.queues.remove_player(player) {
            tracing::debug!(%player, "left queue");
        }
    }

    /// Submit an answer for the session the player occupies.
    ///
    /// Stale or out-of-order ordinals are silently discarded so duplicate
    /// client retransmits can never double-score or double-notify.
    pub async fn submit_answer(self: &Arc<Self>, player: PlayerId, index: usize, answer: u32) {
        let Some(session) = self.directory.session_for(player) else {
            return;
        };

        let all_exhausted = {
            let mut state = session.lock().await;
            match state.apply_answer(player, index, answer) {
                AnswerApplied::Ignored => return,
                AnswerApplied::Accepted {
                    correct,
                    next_question_index,
                    all_exhausted,
                    ..
                } => {
                    tracing::trace!(%player, index, correct, "answer accepted");
                    self.broadcast(
                        &session,
                        Outbound::ScoreUpdate {
                            snapshot: state.snapshot(),
                        },
                    );
                    match next_question_index {
                        Some(next) => self.dispatcher.send(
                            player,
                            Outbound::NewQuestion {
                                question: state.questions[next].view(),
                            },
                        ),
                        None => self.dispatcher.send(player, Outbound::QuestionsExhausted),
                    }
                    all_exhausted
                }
            }
        };

        // Both players done: settle now, do not wait for the timer.
        if all_exhausted {
            self.settle(&session, SettleReason::Completed, None).await;
        }
    }

    /// Handle a participant disconnect: drop any queue entry, and resolve
    /// the occupied session deterministically (forfeit if active, teardown
    /// with refunds if the match never started).
    pub async fn disconnect(self: &Arc<Self>, player: PlayerId) {
        self.queues.remove_player(player);

        let Some(session) = self.directory.session_for(player) else {
            return;
        };

        let action = {
            let mut state = session.lock().await;
            match state.status {
                SessionStatus::Forming | SessionStatus::Countdown => {
                    state.timers.abort_all();
                    state.status = SessionStatus::Finished;
                    DisconnectAction::Teardown
                }
                SessionStatus::Active => DisconnectAction::Forfeit,
                SessionStatus::Settling | SessionStatus::Finished => DisconnectAction::None,
            }
        };

        match action {
            DisconnectAction::Teardown => {
                // The match was never contested: both reservations go back.
                let wager = session.tier.amount();
                for id in session.player_ids() {
                    if let Err(err) = self.ledger.refund(id, wager).await {
                        tracing::error!(session = %session.id, %id, %err, "teardown refund failed");
                    }
                }
                if let Some(remaining) =
                    session.player_ids().into_iter().find(|&id| id != player)
                {
                    self.dispatcher.send(
                        remaining,
                        Outbound::Error {
                            kind: NoticeKind::MatchAborted,
                        },
                    );
                }
                self.directory.remove(session.id);
                tracing::info!(session = %session.id, %player, "session torn down before start");
            }
            DisconnectAction::Forfeit => {
                let remaining = session.player_ids().into_iter().find(|&id| id != player);
                self.settle(&session, SettleReason::OpponentForfeit, remaining)
                    .await;
            }
            DisconnectAction::None => {}
        }
    }

    /// The session a player currently occupies, if any
    pub fn session_for(&self, player: PlayerId) -> Option<Arc<Session>> {
        self.directory.session_for(player)
    }

    /// Current depth of one tier's waiting list
    pub fn queue_depth(&self, tier: Tier) -> usize {
        self.queues.depth(tier)
    }

    /// Number of sessions currently in the directory
    pub fn active_session_count(&self) -> usize {
        self.directory.active_count()
    }

    // ------------------------------------------------------------------
    // Match formation
    // ------------------------------------------------------------------

    /// Reserve both wagers and instantiate the session. Atomic end to end:
    /// both players are held out of the queues by the registry until this
    /// either confirms or unwinds.
    async fn form_match(
        self: &Arc<Self>,
        incoming: PlayerProfile,
        opponent: QueueEntry,
        tier: Tier,
    ) -> Result<(), EngineError> {
        let wager = tier.amount();
        let incoming_id = incoming.player_id;
        let opponent_id = opponent.profile.player_id;

        // The incoming side was balance-checked at the edge, but that was
        // before now; reserve first so nothing is created on credit.
        if let Err(err) = self.ledger.reserve(incoming_id, wager).await {
            self.log_reserve_failure(incoming_id, &err);
            self.queues.release(incoming_id);
            self.queues.push_front(opponent);
            return Err(self.reject(incoming_id, EngineError::InsufficientFunds));
        }

        // Re-validate the waiting side; its balance may have changed since
        // it queued.
        if let Err(err) = self.ledger.reserve(opponent_id, wager).await {
            self.log_reserve_failure(opponent_id, &err);
            if let Err(refund_err) = self.ledger.refund(incoming_id, wager).await {
                tracing::error!(%incoming_id, %refund_err, "refund after aborted formation failed");
            }
            self.queues.release(opponent_id);
            self.reject(opponent_id, EngineError::InsufficientFunds);

            // The survivor goes to the front of its queue.
            let entry = QueueEntry::new(incoming, tier);
            let token = entry.token;
            self.queues.push_front(entry);
            self.dispatcher
                .send(incoming_id, Outbound::QueueJoined { tier, position: 1 });
            self.spawn_queue_timeout(token);
            return Ok(());
        }

        let question_count = self.config.question_count;
        let question_set = questions::generate(&mut rand::thread_rng(), question_count);

        // Slot 0 is the earlier joiner (the waiting side).
        let profiles = [opponent.profile.clone(), incoming.clone()];
        let session = Arc::new(Session::new(tier, profiles, question_set));
        self.directory
            .insert(Arc::clone(&session), session.player_ids());
        self.queues.confirm(incoming_id, opponent_id);

        tracing::info!(
            session = %session.id,
            %tier,
            waiting = %opponent_id,
            incoming = %incoming_id,
            "match formed"
        );

        self.dispatcher.send(
            opponent_id,
            Outbound::MatchFound {
                session_id: session.id,
                opponent: incoming,
                tier,
                prize_pool: tier.prize_pool(),
            },
        );
        self.dispatcher.send(
            incoming_id,
            Outbound::MatchFound {
                session_id: session.id,
                opponent: opponent.profile,
                tier,
                prize_pool: tier.prize_pool(),
            },
        );

        // Short fixed delay before the countdown, for the client-side
        // match-found animation.
        let engine = Arc::clone(self);
        let delayed = Arc::clone(&session);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(engine.config.match_found_delay).await;
            engine.run_countdown(delayed).await;
        });
        session.lock().await.timers.forming = Some(handle.abort_handle());

        Ok(())
    }

    fn spawn_queue_timeout(self: &Arc<Self>, token: Uuid) {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(engine.config.queue_timeout).await;
            // Only valid if the entry is still in the list at fire time;
            // a concurrently formed match wins the race.
            if let Some(entry) = engine.queues.remove_token(token) {
                tracing::debug!(player = %entry.profile.player_id, "queue wait timed out");
                engine
                    .dispatcher
                    .send(entry.profile.player_id, Outbound::QueueTimedOut);
            }
        });
    }

    // ------------------------------------------------------------------
    // Lifecycle timers
    // ------------------------------------------------------------------

    async fn run_countdown(self: Arc<Self>, session: Arc<Session>) {
        {
            let mut state = session.lock().await;
            if state.status != SessionStatus::Forming {
                return;
            }
            state.status = SessionStatus::Countdown;
            state.timers.countdown = state.timers.forming.take();
        }

        for seconds_remaining in (1..=self.config.countdown_ticks).rev() {
            {
                let state = session.lock().await;
                if state.status != SessionStatus::Countdown {
                    return;
                }
                self.broadcast(&session, Outbound::Countdown { seconds_remaining });
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        self.activate(session).await;
    }

    async fn activate(self: &Arc<Self>, session: Arc<Session>) {
        {
            let mut state = session.lock().await;
            if state.status != SessionStatus::Countdown {
                return;
            }
            state.status = SessionStatus::Active;
            state.timers.countdown = None;
            state.started_at = Some(chrono::Utc::now().timestamp_millis());
            state.deadline = Some(Instant::now() + self.config.match_duration);

            self.broadcast(
                &session,
                Outbound::GameStart {
                    duration_secs: self.config.match_duration.as_secs(),
                    total_questions: state.questions.len(),
                },
            );
            if let Some(first) = state.questions.first() {
                for id in session.player_ids() {
                    self.dispatcher.send(
                        id,
                        Outbound::NewQuestion {
                            question: first.view(),
                        },
                    );
                }
            }
        }

        tracing::info!(session = %session.id, "game started");

        let engine = Arc::clone(self);
        let ticking = Arc::clone(&session);
        let handle = tokio::spawn(engine.run_deadline(ticking));
        session.lock().await.timers.deadline = Some(handle.abort_handle());
    }

    async fn run_deadline(self: Arc<Self>, session: Arc<Session>) {
        loop {
            tokio::time::sleep(Duration::from_secs(1)).await;
            let expired = {
                let mut state = session.lock().await;
                // Liveness guard: the session may have settled or been
                // torn down since the last tick.
                if state.status != SessionStatus::Active {
                    return;
                }
                let Some(deadline) = state.deadline else {
                    return;
                };
                let seconds_remaining = deadline
                    .saturating_duration_since(Instant::now())
                    .as_secs();
                self.broadcast(&session, Outbound::TimeUpdate { seconds_remaining });
                if seconds_remaining == 0 {
                    // This task drives settlement itself now; drop its own
                    // handle so settle's abort cannot cancel it mid-flight.
                    state.timers.deadline = None;
                }
                seconds_remaining == 0
            };
            if expired {
                self.settle(&session, SettleReason::TimeExpired, None).await;
                return;
            }
        }
    }

    // ------------------------------------------------------------------
    // Settlement
    // ------------------------------------------------------------------

    /// Compute and apply the outcome of a session, exactly once.
    ///
    /// Safe to call concurrently from the deadline timer, the completion
    /// path and the forfeit path: the first caller to move the status past
    /// `Active` wins, every later call is a no-op.
    async fn settle(
        self: &Arc<Self>,
        session: &Arc<Session>,
        reason: SettleReason,
        forced_winner: Option<PlayerId>,
    ) {
        let wager = session.tier.amount();

        let (outcome, final_scores, scores, winner_id) = {
            let mut state = session.lock().await;
            if state.status != SessionStatus::Active {
                return;
            }
            state.status = SessionStatus::Settling;
            state.timers.abort_all();

            let scores = state.scores();
            let outcome = match forced_winner.and_then(|w| state.slot_index(w)) {
                Some(slot) => settlement::forfeit_outcome(slot, wager),
                None => settlement::compute_outcome(scores[0], scores[1], wager),
            };
            let winner_id = outcome.winner.map(|i| state.slots[i].profile.player_id);
            state.winner = winner_id;
            state.status = SessionStatus::Finished;
            (outcome, state.snapshot(), scores, winner_id)
        };

        // Ledger effects. A storage hiccup must not hold the game outcome
        // hostage: failures are logged for out-of-band reconciliation, not
        // retried here (a retry of a partially applied write could credit
        // twice).
        for (i, id) in session.player_ids().into_iter().enumerate() {
            let amount = outcome.credits[i];
            if amount == 0 {
                continue;
            }
            let result = if outcome.winner.is_none() {
                self.ledger.refund(id, amount).await
            } else {
                self.ledger.credit(id, amount).await
            };
            if let Err(err) = result {
                tracing::error!(session = %session.id, %id, amount, %err, "settlement credit failed");
            }
        }

        let record = MatchRecord {
            session_id: session.id,
            tier: session.tier,
            players: session.player_ids(),
            scores,
            winner: winner_id,
            ended_at: chrono::Utc::now().timestamp_millis(),
        };
        if let Err(err) = self.ledger.record_match_result(record).await {
            tracing::error!(session = %session.id, %err, "match record persistence failed");
        }

        for (i, id) in session.player_ids().into_iter().enumerate() {
            let result = match outcome.winner {
                None => crate::events::PlayerResult::Draw,
                Some(w) if w == i => crate::events::PlayerResult::Won,
                Some(_) => crate::events::PlayerResult::Lost,
            };
            self.dispatcher.send(
                id,
                Outbound::GameOver {
                    result,
                    final_scores: final_scores.clone(),
                    coins_won: outcome.credits[i],
                    reason: (reason != SettleReason::Completed).then_some(reason),
                },
            );
        }

        tracing::info!(
            session = %session.id,
            ?reason,
            winner = ?winner_id,
            "session settled"
        );

        // Keep the finished session queryable briefly, then clean up.
        let engine = Arc::clone(self);
        let finished = Arc::clone(session);
        tokio::spawn(async move {
            tokio::time::sleep(engine.config.retention_window).await;
            engine.directory.remove(finished.id);
        });
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn broadcast(&self, session: &Arc<Session>, event: Outbound) {
        for id in session.player_ids() {
            self.dispatcher.send(id, event.clone());
        }
    }

    /// Surface a rejection as exactly one notice and return the error
    fn reject(&self, player: PlayerId, err: EngineError) -> EngineError {
        tracing::debug!(%player, %err, "rejected");
        self.dispatcher.send(
            player,
            Outbound::Error {
                kind: err.notice_kind(),
            },
        );
        err
    }

    fn log_reserve_failure(&self, player: PlayerId, err: &LedgerError) {
        match err {
            LedgerError::InsufficientFunds => {
                tracing::debug!(%player, "wager reservation refused")
            }
            LedgerError::Unavailable(reason) => {
                tracing::error!(%player, reason, "ledger unavailable during reservation")
            }
        }
    }
}
